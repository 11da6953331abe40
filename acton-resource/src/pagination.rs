//! Ordinal `[start, stop)` windows over a collection
//!
//! Listings are addressed with two query parameters:
//!
//! - `start`: first ordinal position, default 0
//! - `stop`: one past the last position, default the collection's page size
//!
//! Note that `stop` defaults to the page size itself, not `start + page_size`.
//! A request for `?start=20` alone on a collection with page size 10 therefore
//! asks for a negative width and is rejected.
//!
//! # Example
//!
//! ```rust
//! use acton_resource::pagination::PageWindow;
//!
//! let pairs = vec![("start".to_string(), "10".to_string()), ("stop".to_string(), "20".to_string())];
//! let window = PageWindow::from_query(&pairs, 10, 100).unwrap();
//!
//! assert_eq!(window.width(), 10);
//! assert_eq!(window.next(), PageWindow { start: 20, stop: 30 });
//! assert_eq!(window.prev(), Some(PageWindow { start: 0, stop: 10 }));
//! ```

use serde::Serialize;

use crate::resource::{ResourceError, ResourceResult};

const START: &str = "start";
const STOP: &str = "stop";

/// A validated listing window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub stop: usize,
}

impl PageWindow {
    /// Read and validate the window from decoded query pairs
    ///
    /// Keys other than `start` and `stop` are ignored.
    ///
    /// # Errors
    ///
    /// [`ResourceError::Pagination`] when a key repeats, is not an integer or is
    /// negative, or when the width is negative or above `max_page_size`.
    pub fn from_query(
        pairs: &[(String, String)],
        page_size: usize,
        max_page_size: usize,
    ) -> ResourceResult<Self> {
        let start = single_bound(pairs, START)?.unwrap_or(0);
        let stop = single_bound(pairs, STOP)?.unwrap_or(page_size);

        if stop < start {
            return Err(ResourceError::pagination("Requested page size is negative"));
        }
        if stop - start > max_page_size {
            return Err(ResourceError::pagination("Requested page size too large"));
        }

        Ok(Self { start, stop })
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.stop - self.start
    }

    /// The window immediately after this one, with the same width
    #[must_use]
    pub const fn next(&self) -> Self {
        Self {
            start: self.stop,
            stop: self.stop + self.width(),
        }
    }

    /// The window immediately before this one, clamped at zero
    ///
    /// `None` when that window would be empty.
    #[must_use]
    pub fn prev(&self) -> Option<Self> {
        let start = self.start.saturating_sub(self.width());
        (start < self.start).then_some(Self {
            start,
            stop: self.start,
        })
    }

    /// Build prev/next links against `base_url` (scheme, host and path)
    ///
    /// `returned` is the number of elements the slice produced; a short page
    /// means there is nothing after it.
    pub fn links(&self, base_url: &str, returned: usize) -> ResourceResult<PageLinks> {
        let next = if returned < self.width() {
            None
        } else {
            Some(self.next().url(base_url)?)
        };
        let prev = self.prev().map(|window| window.url(base_url)).transpose()?;

        Ok(PageLinks { prev, next })
    }

    fn url(&self, base_url: &str) -> ResourceResult<String> {
        let query = serde_urlencoded::to_string(&[(START, self.start), (STOP, self.stop)][..])
            .map_err(|e| ResourceError::internal(format!("failed to build page link: {e}")))?;
        Ok(format!("{base_url}?{query}"))
    }
}

/// Neighbouring page URLs for a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub prev: Option<String>,
    pub next: Option<String>,
}

fn single_bound(pairs: &[(String, String)], key: &str) -> ResourceResult<Option<usize>> {
    let mut values = pairs.iter().filter(|(k, _)| k == key).map(|(_, v)| v);

    let Some(raw) = values.next() else {
        return Ok(None);
    };
    if values.next().is_some() {
        return Err(ResourceError::pagination(format!("duplicate key {key} in query")));
    }

    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ResourceError::pagination(format!("key {key} not an integer")))?;

    usize::try_from(value)
        .map(Some)
        .map_err(|_| ResourceError::pagination(format!("key {key} must not be negative")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &str) -> Vec<(String, String)> {
        serde_urlencoded::from_str(query).unwrap()
    }

    #[test]
    fn test_defaults() {
        let window = PageWindow::from_query(&[], 10, 100).unwrap();
        assert_eq!(window, PageWindow { start: 0, stop: 10 });
    }

    #[test]
    fn test_stop_defaults_to_page_size_not_offset() {
        let window = PageWindow::from_query(&pairs("start=4"), 10, 100).unwrap();
        assert_eq!(window, PageWindow { start: 4, stop: 10 });

        let error = PageWindow::from_query(&pairs("start=20"), 10, 100).unwrap_err();
        assert_eq!(error.message(), "Requested page size is negative");
    }

    #[test]
    fn test_duplicate_key() {
        let error = PageWindow::from_query(&pairs("start=0&start=5"), 10, 100).unwrap_err();
        assert_eq!(error, ResourceError::pagination("duplicate key start in query"));
    }

    #[test]
    fn test_non_integer() {
        let error = PageWindow::from_query(&pairs("stop=abc"), 10, 100).unwrap_err();
        assert_eq!(error, ResourceError::pagination("key stop not an integer"));
    }

    #[test]
    fn test_negative_bound() {
        let error = PageWindow::from_query(&pairs("start=-1"), 10, 100).unwrap_err();
        assert_eq!(error, ResourceError::pagination("key start must not be negative"));
    }

    #[test]
    fn test_width_above_maximum() {
        let error = PageWindow::from_query(&pairs("start=0&stop=101"), 10, 100).unwrap_err();
        assert_eq!(error.message(), "Requested page size too large");
        assert!(PageWindow::from_query(&pairs("start=0&stop=100"), 10, 100).is_ok());
    }

    #[test]
    fn test_unrelated_keys_are_ignored() {
        let window = PageWindow::from_query(&pairs("color=red&stop=3"), 10, 100).unwrap();
        assert_eq!(window, PageWindow { start: 0, stop: 3 });
    }

    #[test]
    fn test_prev_is_clamped_and_absent_at_origin() {
        let window = PageWindow { start: 3, stop: 13 };
        assert_eq!(window.prev(), Some(PageWindow { start: 0, stop: 3 }));
        assert_eq!(PageWindow { start: 0, stop: 10 }.prev(), None);
    }

    #[test]
    fn test_links_for_full_page() {
        let window = PageWindow { start: 10, stop: 20 };
        let links = window.links("http://localhost/things", 10).unwrap();

        assert_eq!(
            links.next.as_deref(),
            Some("http://localhost/things?start=20&stop=30")
        );
        assert_eq!(
            links.prev.as_deref(),
            Some("http://localhost/things?start=0&stop=10")
        );
    }

    #[test]
    fn test_short_page_has_no_next() {
        let window = PageWindow { start: 0, stop: 10 };
        let links = window.links("http://localhost/things", 4).unwrap();
        assert_eq!(links, PageLinks::default());
    }
}
