use crate::value::{JsonForm, Value};

/// Structural fingerprint of a value.
///
/// Two snapshots are equal iff the values serialize to the same JSON, so
/// any change that could alter a rendered path is visible. Identity
/// snapshots also record list item ids, which is what repeaters care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Option<String>);

impl Snapshot {
    pub fn of(value: Option<&Value>) -> Self {
        Self::take(value, JsonForm::Fingerprint)
    }

    pub fn with_identity(value: Option<&Value>) -> Self {
        Self::take(value, JsonForm::Identity)
    }

    fn take(value: Option<&Value>, form: JsonForm) -> Self {
        Snapshot(
            value
                .and_then(|value| value.to_json_with(form))
                .map(|json| json.to_string()),
        )
    }

    pub fn is_undefined(&self) -> bool {
        self.0.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structurally_equal_values_match() {
        let a = Value::from(json!({ "c": "y", "d": [1, 2] }));
        let b = Value::from(json!({ "d": [1, 2], "c": "y" }));

        assert_eq!(Snapshot::of(Some(&a)), Snapshot::of(Some(&b)));
    }

    #[test]
    fn test_nested_change_is_visible() {
        let a = Value::from(json!({ "c": "y", "d": { "e": 1 } }));
        let b = Value::from(json!({ "c": "y", "d": { "e": 2 } }));

        assert_ne!(Snapshot::of(Some(&a)), Snapshot::of(Some(&b)));
    }

    #[test]
    fn test_identity_snapshot_sees_replaced_items() {
        let a = Value::list(vec!["x"]);
        let b = Value::list(vec!["x"]);

        assert_eq!(Snapshot::of(Some(&a)), Snapshot::of(Some(&b)));
        assert_ne!(
            Snapshot::with_identity(Some(&a)),
            Snapshot::with_identity(Some(&b))
        );
        assert_eq!(
            Snapshot::with_identity(Some(&a)),
            Snapshot::with_identity(Some(&a.clone()))
        );
    }

    #[test]
    fn test_undefined_differs_from_null() {
        assert!(Snapshot::of(None).is_undefined());
        assert!(Snapshot::of(Some(&Value::Undefined)).is_undefined());
        assert_ne!(Snapshot::of(None), Snapshot::of(Some(&Value::Null)));
    }

    #[test]
    fn test_non_finite_numbers_differ_from_null() {
        let nan = Value::from(json!({ "n": null }));
        let mut changed = nan.clone();
        changed.set_path(&["n".to_string()], Value::from(f64::NAN));

        assert_ne!(Snapshot::of(Some(&nan)), Snapshot::of(Some(&changed)));
        assert_eq!(Snapshot::of(Some(&changed)), Snapshot::of(Some(&changed.clone())));
        assert_eq!(changed.to_json(), Some(json!({ "n": null })));
    }
}
