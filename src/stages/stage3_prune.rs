use serde_json::{Map, Value};

/// Whether a value carries no information on its own
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Remove nulls, empty strings, and containers that end up empty
///
/// Post-order, so a container whose children all prune away is itself
/// removed. Returns `None` when nothing is left. Array order is kept.
pub fn prune_value(value: Value) -> Option<Value> {
    let pruned = match value {
        Value::Object(map) => {
            let kept: Map<String, Value> = map
                .into_iter()
                .filter_map(|(key, child)| prune_value(child).map(|child| (key, child)))
                .collect();
            Value::Object(kept)
        }
        Value::Array(items) => Value::Array(items.into_iter().filter_map(prune_value).collect()),
        other => other,
    };

    (!is_empty_value(&pruned)).then_some(pruned)
}

/// Execute Stage 3: prune an extracted record; an empty result is `{}`
pub fn prune_record(record: Value) -> Value {
    prune_value(record).unwrap_or_else(|| Value::Object(Map::new()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_prune_nested_empties() {
        let record = json!({
            "patientInfo": {"name": "", "phone": null, "patient": {}},
            "dispatch": {"symptoms": {"pain": [{"name": "두통", "value": ""}]}}
        });

        assert_eq!(
            prune_record(record),
            json!({"dispatch": {"symptoms": {"pain": [{"name": "두통"}]}}})
        );
    }

    #[test]
    fn test_collapse_propagates_to_root() {
        let record = json!({"a": {"b": {"c": [null, "", {}, []]}}});
        assert_eq!(prune_value(record.clone()), None);
        assert_eq!(prune_record(record), json!({}));
    }

    #[test]
    fn test_scalars_pass_through() {
        let record = json!({"ecg": false, "pulse": 0, "note": " "});
        assert_eq!(prune_record(record.clone()), record);
    }

    #[test]
    fn test_array_order_kept() {
        let record = json!({"methods": ["흡인기", "", "기관삽관", null]});
        assert_eq!(prune_record(record), json!({"methods": ["흡인기", "기관삽관"]}));
    }

    #[test]
    fn test_prune_is_idempotent() {
        let record = json!({
            "incidentType": {"medicalHistory": {"status": "있음", "items": [{}, {"name": "당뇨"}]}},
            "detailReport": {"obstacles": []}
        });

        let once = prune_record(record);
        let twice = prune_record(once.clone());
        assert_eq!(once, twice);
        assert!(!serde_json::to_string(&once).unwrap().contains("[]"));
    }

    #[test]
    fn test_top_level_empty_scalar() {
        assert_eq!(prune_value(json!("")), None);
        assert_eq!(prune_value(json!(3.5)), Some(json!(3.5)));
    }
}
