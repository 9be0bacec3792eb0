use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Field change information for diff tracking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub change_type: ChangeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,     // Field had no previous value
    Modified,  // Field existed but value changed
    Removed,   // Field present before, absent from the proposal
    Unchanged, // Proposal repeats the current value
}

impl FieldChange {
    pub fn is_change(&self) -> bool {
        self.change_type != ChangeType::Unchanged
    }
}

/// Compare a snapshot against a proposal, one entry per field, sorted by name.
///
/// A previous value of `null` counts as absent, so filling an empty column is
/// reported as `Added` rather than `Modified`.
pub fn compute_diff(previous: &Map<String, Value>, proposed: &Map<String, Value>) -> Vec<FieldChange> {
    let fields: BTreeSet<&String> = previous.keys().chain(proposed.keys()).collect();

    fields
        .into_iter()
        .map(|field| {
            let old_value = previous.get(field).filter(|v| !v.is_null()).cloned();
            let new_value = proposed.get(field).cloned();

            let change_type = match (&old_value, &new_value) {
                (None, Some(Value::Null)) | (None, None) => ChangeType::Unchanged,
                (None, Some(_)) => ChangeType::Added,
                (Some(_), None) => ChangeType::Removed,
                (Some(old), Some(new)) if values_equal(old, new) => ChangeType::Unchanged,
                (Some(_), Some(_)) => ChangeType::Modified,
            };

            FieldChange {
                field: field.clone(),
                old_value,
                new_value,
                change_type,
            }
        })
        .collect()
}

/// Loose equality: numbers compare by value and numeric strings match numbers,
/// since MySQL hands DATE and DECIMAL columns back as strings.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            s.parse::<f64>().ok() == n.as_f64()
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn classifies_every_field() {
        let previous = obj(json!({ "name": "Old", "phone": null, "email": "a@b.org", "color": "#fff" }));
        let proposed = obj(json!({ "name": "New", "phone": "0917", "color": "#fff" }));

        let diff = compute_diff(&previous, &proposed);
        let kinds: Vec<(&str, ChangeType)> = diff.iter().map(|c| (c.field.as_str(), c.change_type)).collect();

        assert_eq!(
            kinds,
            vec![
                ("color", ChangeType::Unchanged),
                ("email", ChangeType::Removed),
                ("name", ChangeType::Modified),
                ("phone", ChangeType::Added),
            ]
        );
    }

    #[test]
    fn carries_old_and_new_values() {
        let diff = compute_diff(&obj(json!({ "title": "A" })), &obj(json!({ "title": "B" })));
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].old_value, Some(json!("A")));
        assert_eq!(diff[0].new_value, Some(json!("B")));
        assert!(diff[0].is_change());
    }

    #[test]
    fn numeric_strings_equal_numbers() {
        let diff = compute_diff(&obj(json!({ "capacity": "25" })), &obj(json!({ "capacity": 25 })));
        assert_eq!(diff[0].change_type, ChangeType::Unchanged);
    }

    #[test]
    fn empty_create_snapshot_reports_all_added() {
        let diff = compute_diff(&Map::new(), &obj(json!({ "title": "Outreach", "category": "Health" })));
        assert!(diff.iter().all(|c| c.change_type == ChangeType::Added));
    }

    #[test]
    fn null_over_missing_is_not_a_change() {
        let diff = compute_diff(&obj(json!({ "logo": null })), &obj(json!({ "logo": null })));
        assert!(!diff[0].is_change());
    }
}
