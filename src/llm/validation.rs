use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{VocabularyField, VOCABULARY};

/// Why a categorical value was flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Not one of the field's allowed values
    OutOfVocabulary,
    /// A choice that needs an elaboration, but the detail key is absent or blank
    MissingDetail,
    /// Categorical fields hold strings
    NotAString,
}

/// A flagged value in an extracted record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyIssue {
    /// Concrete location, e.g. `dispatch.symptoms.pain[0].name`
    pub path: String,
    pub value: String,
    pub kind: IssueKind,
}

/// Outcome of checking a record against the vocabulary table
#[derive(Debug, Clone, Default)]
pub struct RecordValidation {
    pub issues: Vec<VocabularyIssue>,
    /// Number of categorical values inspected
    pub fields_checked: usize,
}

impl RecordValidation {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check every categorical field present in the record
///
/// Absent fields are never reported; the record is not modified.
pub fn validate_record(record: &Value) -> RecordValidation {
    let mut validation = RecordValidation::default();

    for field in VOCABULARY {
        let segments: Vec<&str> = field.path.split('.').collect();
        visit(record, &segments, "", None, field, &mut validation);
    }

    validation
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn visit(
    value: &Value,
    segments: &[&str],
    path: &str,
    parent: Option<&Map<String, Value>>,
    field: &VocabularyField,
    out: &mut RecordValidation,
) {
    let Some((segment, rest)) = segments.split_first() else {
        check_leaf(value, path, parent, field, out);
        return;
    };

    let Some(object) = value.as_object() else {
        return;
    };

    if *segment == "*" {
        for (key, child) in object {
            visit(child, rest, &join(path, key), Some(object), field, out);
        }
        return;
    }

    if let Some(key) = segment.strip_suffix("[]") {
        match object.get(key) {
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", join(path, key), i);
                    visit(item, rest, &item_path, Some(object), field, out);
                }
            }
            // A lone object where a list was expected
            Some(child @ Value::Object(_)) => {
                visit(child, rest, &join(path, key), Some(object), field, out);
            }
            Some(child) if rest.is_empty() => {
                check_leaf(child, &join(path, key), Some(object), field, out);
            }
            _ => {}
        }
        return;
    }

    if let Some(child) = object.get(*segment) {
        visit(child, rest, &join(path, segment), Some(object), field, out);
    }
}

fn check_leaf(
    value: &Value,
    path: &str,
    parent: Option<&Map<String, Value>>,
    field: &VocabularyField,
    out: &mut RecordValidation,
) {
    match value {
        Value::Null => {}
        Value::String(text) => {
            out.fields_checked += 1;
            match field.choice(text) {
                None => out.issues.push(VocabularyIssue {
                    path: path.to_string(),
                    value: text.clone(),
                    kind: IssueKind::OutOfVocabulary,
                }),
                Some(choice) if choice.requires_detail && !has_detail(parent, field) => {
                    out.issues.push(VocabularyIssue {
                        path: path.to_string(),
                        value: text.clone(),
                        kind: IssueKind::MissingDetail,
                    })
                }
                Some(_) => {}
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                check_leaf(item, &format!("{}[{}]", path, i), parent, field, out);
            }
        }
        other => {
            out.fields_checked += 1;
            out.issues.push(VocabularyIssue {
                path: path.to_string(),
                value: other.to_string(),
                kind: IssueKind::NotAString,
            });
        }
    }
}

fn has_detail(parent: Option<&Map<String, Value>>, field: &VocabularyField) -> bool {
    let (Some(parent), Some(key)) = (parent, field.detail_key) else {
        return false;
    };
    match parent.get(key) {
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Number(_)) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_clean_record() {
        let record = json!({
            "dispatch": {
                "dispatchType": "정상",
                "symptoms": {"pain": [{"name": "두통"}]}
            },
            "incidentType": {
                "medicalHistory": {"status": "있음", "items": [{"name": "고혈압"}]},
                "category": "질병"
            }
        });

        let result = validate_record(&record);
        assert!(result.is_clean(), "{:?}", result.issues);
        assert_eq!(result.fields_checked, 5);
    }

    #[test]
    fn test_out_of_vocabulary_in_array_item() {
        let record = json!({
            "dispatch": {"symptoms": {"pain": [{"name": "두통"}, {"name": "치통"}]}}
        });

        let result = validate_record(&record);
        assert_eq!(
            result.issues,
            vec![VocabularyIssue {
                path: "dispatch.symptoms.pain[1].name".to_string(),
                value: "치통".to_string(),
                kind: IssueKind::OutOfVocabulary,
            }]
        );
    }

    #[test]
    fn test_other_requires_detail_in_named_key() {
        let missing = json!({
            "patientTransport": {"firstTransport": {"receiver": "기타"}}
        });
        let result = validate_record(&missing);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].kind, IssueKind::MissingDetail);
        assert_eq!(result.issues[0].path, "patientTransport.firstTransport.receiver");

        let present = json!({
            "patientTransport": {
                "firstTransport": {"receiver": "기타", "receiverValue": "응급실 원무과 직원"}
            }
        });
        assert!(validate_record(&present).is_clean());
    }

    #[test]
    fn test_other_oxygen_device_needs_value() {
        let missing = json!({
            "emergencyTreatment": {"oxygenTherapy": {"flowRateLpm": 4, "device": "기타"}}
        });
        let result = validate_record(&missing);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].kind, IssueKind::MissingDetail);
        assert_eq!(result.issues[0].path, "emergencyTreatment.oxygenTherapy.device");

        let present = json!({
            "emergencyTreatment": {"oxygenTherapy": {"device": "기타", "value": "벤츄리마스크"}}
        });
        assert!(validate_record(&present).is_clean());
    }

    #[test]
    fn test_detail_required_for_cancer_history() {
        let record = json!({
            "incidentType": {"medicalHistory": {"items": [{"name": "암"}]}}
        });

        let result = validate_record(&record);
        assert_eq!(result.issues[0].kind, IssueKind::MissingDetail);
        assert_eq!(result.issues[0].path, "incidentType.medicalHistory.items[0].name");
    }

    #[test]
    fn test_single_object_where_list_expected() {
        let record = json!({
            "detailReport": {"obstacles": {"type": "폭설"}}
        });

        let result = validate_record(&record);
        assert!(result.is_clean());
        assert_eq!(result.fields_checked, 1);
    }

    #[test]
    fn test_string_array_field() {
        let record = json!({
            "emergencyTreatment": {"airwayManagement": {"methods": ["흡인기", "산소"]}}
        });

        let result = validate_record(&record);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(
            result.issues[0].path,
            "emergencyTreatment.airwayManagement.methods[1]"
        );
    }

    #[test]
    fn test_wildcard_and_non_string() {
        let record = json!({
            "patientAssessment": {
                "consciousness": {"first": {"state": "A"}, "second": {"state": 3}}
            },
            "detailReport": {"paramedic1": {"grade": "1급", "rank": "교"}}
        });

        let result = validate_record(&record);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].kind, IssueKind::NotAString);
        assert_eq!(result.issues[0].path, "patientAssessment.consciousness.second.state");
    }

    #[test]
    fn test_issue_serialization() {
        let issue = VocabularyIssue {
            path: "dispatch.dispatchType".to_string(),
            value: "기타".to_string(),
            kind: IssueKind::MissingDetail,
        };
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["kind"], "missing_detail");
    }
}
