//! Element state mappings and helpers for backing stores

use serde_json::{Map, Value};

use crate::resource::{ResourceError, ResourceResult};

/// Attribute name to value mapping exchanged with elements
pub type State = Map<String, Value>;

/// Which attributes `to_state` should export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AttributeSelection {
    /// Everything the element exposes
    #[default]
    All,
    /// Only the named attributes, in this order
    Only(Vec<String>),
}

impl AttributeSelection {
    pub fn only<I, S>(attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(attrs.into_iter().map(Into::into).collect())
    }

    /// Whether `attribute` is part of the selection
    #[must_use]
    pub fn includes(&self, attribute: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(attrs) => attrs.iter().any(|attr| attr == attribute),
        }
    }

    /// Restrict a full state mapping to this selection
    ///
    /// Selected attributes missing from `state` are skipped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_resource::capability::AttributeSelection;
    /// use serde_json::json;
    ///
    /// let state = json!({"name": "lamp", "price": 12, "secret": true});
    /// let state = state.as_object().unwrap();
    ///
    /// let projected = AttributeSelection::only(["name", "price"]).project(state);
    /// assert_eq!(projected.len(), 2);
    /// assert!(!projected.contains_key("secret"));
    /// ```
    #[must_use]
    pub fn project(&self, state: &State) -> State {
        match self {
            Self::All => state.clone(),
            Self::Only(attrs) => attrs
                .iter()
                .filter_map(|attr| state.get(attr).map(|value| (attr.clone(), value.clone())))
                .collect(),
        }
    }
}

/// Reject updates that would change any of the `immutable` attributes
///
/// Attributes absent from `new` are left alone. An attribute present in `new`
/// but unknown to `current` is rejected without a current value.
///
/// # Errors
///
/// [`ResourceError::AttributeValueUpdate`] naming the first offending attribute.
pub fn ensure_unchanged(current: &State, new: &State, immutable: &[&str]) -> ResourceResult<()> {
    for attribute in immutable {
        let Some(new_value) = new.get(*attribute) else {
            continue;
        };

        match current.get(*attribute) {
            Some(current_value) if current_value == new_value => {}
            current_value => {
                return Err(ResourceError::attribute_value_update(
                    *attribute,
                    new_value.clone(),
                    current_value.cloned(),
                ));
            }
        }
    }
    Ok(())
}

/// Render an identifier value the way it appears in a URL path segment
#[must_use]
pub fn identifier_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether an element's identifier matches the one requested in the path
///
/// Path segments are strings, so `42` matches both `"42"` and the number `42`.
#[must_use]
pub fn identifier_matches(expected: &str, actual: &Value) -> bool {
    identifier_string(actual) == expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(value: Value) -> State {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_all_selection_copies_everything() {
        let full = state(json!({"a": 1, "b": 2}));
        assert_eq!(AttributeSelection::All.project(&full), full);
        assert!(AttributeSelection::All.includes("anything"));
    }

    #[test]
    fn test_only_selection_skips_missing_attributes() {
        let full = state(json!({"a": 1}));
        let projected = AttributeSelection::only(["a", "b"]).project(&full);
        assert_eq!(projected, state(json!({"a": 1})));
        assert!(!AttributeSelection::only(["a"]).includes("b"));
    }

    #[test]
    fn test_ensure_unchanged_allows_equal_and_absent_values() {
        let current = state(json!({"name": "lamp", "price": 10}));
        let new = state(json!({"name": "lamp", "price": 12}));
        assert!(ensure_unchanged(&current, &new, &["name"]).is_ok());

        let new = state(json!({"price": 12}));
        assert!(ensure_unchanged(&current, &new, &["name"]).is_ok());
    }

    #[test]
    fn test_ensure_unchanged_reports_attribute_and_values() {
        let current = state(json!({"name": "lamp"}));
        let new = state(json!({"name": "desk"}));
        let error = ensure_unchanged(&current, &new, &["name"]).unwrap_err();

        assert_eq!(
            error,
            ResourceError::attribute_value_update("name", json!("desk"), Some(json!("lamp")))
        );
    }

    #[test]
    fn test_ensure_unchanged_without_current_value() {
        let current = State::new();
        let new = state(json!({"serial": "x1"}));
        let error = ensure_unchanged(&current, &new, &["serial"]).unwrap_err();
        assert!(error.details().get("currentValue").is_none());
    }

    #[test]
    fn test_identifier_matching() {
        assert!(identifier_matches("42", &json!("42")));
        assert!(identifier_matches("42", &json!(42)));
        assert!(!identifier_matches("42", &json!(7)));
        assert_eq!(identifier_string(&json!("lamp")), "lamp");
        assert_eq!(identifier_string(&json!(7)), "7");
    }
}
