//! Closed vocabularies for the categorical fields of the incident record.
//!
//! Values are the exact strings downstream report forms accept; the English
//! gloss is only shown to the extraction model. A choice marked as detailed
//! must be accompanied by a free-text elaboration in the field's detail key.

use super::Category;

/// Reserved "other" sentinel
pub const OTHER: &str = "기타";

/// One allowed value of a categorical field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub gloss: &'static str,
    /// Whether the detail key must carry an elaboration
    pub requires_detail: bool,
}

const fn plain(value: &'static str, gloss: &'static str) -> Choice {
    Choice {
        value,
        gloss,
        requires_detail: false,
    }
}

const fn detailed(value: &'static str, gloss: &'static str) -> Choice {
    Choice {
        value,
        gloss,
        requires_detail: true,
    }
}

/// A categorical field, addressed by a path pattern into the record
///
/// Path segments are separated by `.`; `key[]` visits every item of an array
/// (a lone object is treated as a single item) and `*` visits every key of an
/// object.
#[derive(Debug, Clone, Copy)]
pub struct VocabularyField {
    pub path: &'static str,
    pub label: &'static str,
    pub choices: &'static [Choice],
    /// Sibling key holding the elaboration for detailed choices
    pub detail_key: Option<&'static str>,
    pub note: Option<&'static str>,
}

impl VocabularyField {
    /// Category the field belongs to, from the first path segment
    pub fn category(&self) -> Option<Category> {
        self.path.split('.').next()?.parse().ok()
    }

    pub fn choice(&self, value: &str) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.value == value)
    }

    /// Path pattern without the category prefix
    pub fn relative_path(&self) -> &'static str {
        self.path
            .split_once('.')
            .map(|(_, rest)| rest)
            .unwrap_or(self.path)
    }

    /// One prompt line: label, path, and the allowed values
    pub fn render(&self) -> String {
        let choices: Vec<String> = self
            .choices
            .iter()
            .map(|choice| match (choice.requires_detail, self.detail_key) {
                (true, Some(key)) => {
                    format!("{} ({}; detail in \"{}\")", choice.value, choice.gloss, key)
                }
                _ => format!("{} ({})", choice.value, choice.gloss),
            })
            .collect();

        let mut line = format!("[{}] {}: {}", self.label, self.relative_path(), choices.join(" | "));
        if let Some(note) = self.note {
            line.push_str(&format!("\n  note: {}", note));
        }
        line
    }
}

/// Fields of one category
pub fn fields_for(category: Category) -> impl Iterator<Item = &'static VocabularyField> {
    VOCABULARY
        .iter()
        .filter(move |field| field.category() == Some(category))
}

/// Every categorical field of the record
pub static VOCABULARY: &[VocabularyField] = &[
    // patientInfo
    VocabularyField {
        path: "patientInfo.reporter.reportMethod",
        label: "Report method",
        choices: &[
            plain("일반전화", "landline"),
            plain("휴대전화", "mobile phone"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    VocabularyField {
        path: "patientInfo.patient.gender",
        label: "Gender",
        choices: &[plain("남성", "male"), plain("여성", "female")],
        detail_key: None,
        note: None,
    },
    // dispatch
    VocabularyField {
        path: "dispatch.dispatchType",
        label: "Dispatch type",
        choices: &[
            plain("정상", "normal"),
            plain("오인", "mistaken report"),
            plain("거짓", "false report"),
            plain("취소", "cancelled"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("dispatchTypeValue"),
        note: None,
    },
    VocabularyField {
        path: "dispatch.sceneLocation.name",
        label: "Scene location",
        choices: &[
            plain("집", "home"),
            plain("집단거주시설", "group residential facility"),
            plain("도로", "road"),
            plain("도로외교통지역", "off-road traffic area"),
            plain("오락/문화/공시설", "recreational, cultural or public facility"),
            plain("학교/교육시설", "school or educational facility"),
            plain("운동시설", "sports facility"),
            plain("상업시설", "commercial facility"),
            plain("의료관련시설", "medical facility"),
            plain("공장/산업/건설시설", "factory, industrial or construction site"),
            plain("일차산업장", "farm, fishery or other primary industry site"),
            plain("바다/강/산/논밭", "sea, river, mountain or field"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    VocabularyField {
        path: "dispatch.symptoms.pain[].name",
        label: "Symptoms - pain",
        choices: &[
            plain("두통", "headache"),
            plain("흉통", "chest pain"),
            plain("복통", "abdominal pain"),
            plain("요통", "back pain"),
            plain("분만진통", "labor pain"),
            detailed("그 밖의 통증", "other pain"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    VocabularyField {
        path: "dispatch.symptoms.trauma[].name",
        label: "Symptoms - trauma",
        choices: &[
            plain("골절", "fracture"),
            plain("탈구", "dislocation"),
            plain("삠", "sprain"),
            plain("열상", "laceration"),
            plain("찰과상", "abrasion"),
            plain("타박상", "contusion"),
            plain("절단", "amputation"),
            plain("압궤손상", "crush injury"),
            plain("화상", "burn"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    VocabularyField {
        path: "dispatch.symptoms.otherSymptoms[].name",
        label: "Symptoms - other",
        choices: &[
            plain("의식장애", "altered consciousness"),
            plain("기도이물", "airway foreign body"),
            plain("기침", "cough"),
            plain("호흡곤란", "difficulty breathing"),
            plain("호흡정지", "respiratory arrest"),
            plain("두근거림", "palpitations"),
            plain("가슴불편감", "chest discomfort"),
            plain("심정지", "cardiac arrest"),
            plain("경련/발작", "convulsion or seizure"),
            plain("실신", "fainting"),
            plain("오심", "nausea"),
            plain("구토", "vomiting"),
            plain("설사", "diarrhea"),
            plain("변비", "constipation"),
            plain("배뇨장애", "urination disorder"),
            plain("객혈", "coughing blood"),
            plain("토혈", "vomiting blood"),
            plain("혈변", "bloody stool"),
            plain("비출혈", "nosebleed"),
            plain("질출혈", "vaginal bleeding"),
            plain("그 밖의 출혈", "other bleeding"),
            plain("고열", "high fever"),
            plain("저체온증", "hypothermia"),
            plain("어지러움", "dizziness"),
            plain("마비", "paralysis"),
            plain("전신쇠약", "general weakness"),
            plain("정신장애", "mental disturbance"),
            plain("그 밖의 이물감", "other foreign body sensation"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    // incidentType
    VocabularyField {
        path: "incidentType.medicalHistory.status",
        label: "Medical history status",
        choices: &[
            plain("있음", "present"),
            plain("없음", "none"),
            plain("미상", "unknown"),
        ],
        detail_key: None,
        note: None,
    },
    VocabularyField {
        path: "incidentType.medicalHistory.items[].name",
        label: "Medical history",
        choices: &[
            plain("고혈압", "hypertension"),
            plain("당뇨", "diabetes"),
            plain("뇌혈관질환", "cerebrovascular disease"),
            plain("심장질환", "heart disease"),
            plain("폐질환", "lung disease"),
            plain("결핵", "tuberculosis"),
            plain("간염", "hepatitis"),
            plain("간경화", "liver cirrhosis"),
            plain("알레르기", "allergy"),
            detailed("암", "cancer, with the cancer type"),
            detailed("신부전", "renal failure, with dialysis 예/아니오"),
            detailed("감염병", "infectious disease, with the disease"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    VocabularyField {
        path: "incidentType.category",
        label: "Incident category",
        choices: &[
            plain("질병", "disease"),
            plain("질병외", "non-disease"),
            plain(OTHER, "other"),
        ],
        detail_key: None,
        note: Some(
            "질병 has no subcategory; 질병외 uses exactly one of subCategory_traffic, \
             subCategory_injury or subCategory_nonTrauma; 기타 sets category_other=\"기타\" \
             and uses subCategory_other",
        ),
    },
    VocabularyField {
        path: "incidentType.subCategory_traffic.type",
        label: "Traffic subcategory type",
        choices: &[plain("교통사고", "traffic accident")],
        detail_key: None,
        note: None,
    },
    VocabularyField {
        path: "incidentType.subCategory_traffic.name",
        label: "Traffic accident role",
        choices: &[
            plain("운전자", "driver"),
            plain("동승자", "passenger"),
            plain("보행자", "pedestrian"),
            plain("자전거", "bicycle"),
            plain("오토바이", "motorcycle"),
            plain("개인형 이동장치", "personal mobility device"),
            detailed("그 밖의 탈 것", "other vehicle"),
            plain("미상", "unknown"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    VocabularyField {
        path: "incidentType.subCategory_injury.type",
        label: "Injury subcategory type",
        choices: &[plain("그 외 손상", "other injury")],
        detail_key: None,
        note: None,
    },
    VocabularyField {
        path: "incidentType.subCategory_injury.name",
        label: "Other injury",
        choices: &[
            plain("낙상", "fall on the same level"),
            plain("추락", "fall from height"),
            plain("그 밖의 둔상", "other blunt injury"),
            plain("관통상", "penetrating injury"),
            plain("기계", "machinery"),
            plain("농기계", "farm machinery"),
        ],
        detail_key: None,
        note: None,
    },
    VocabularyField {
        path: "incidentType.subCategory_nonTrauma.type",
        label: "Non-trauma subcategory type",
        choices: &[plain("비외상성 손상", "non-traumatic injury")],
        detail_key: None,
        note: None,
    },
    VocabularyField {
        path: "incidentType.subCategory_nonTrauma.name",
        label: "Non-traumatic injury",
        choices: &[
            detailed("동물/곤충", "animal or insect, with the species"),
            plain("익사", "drowning"),
            plain("중독", "poisoning"),
            plain("화상", "burn"),
            plain("감전", "electric shock"),
            plain("질식", "suffocation"),
            plain("이물", "foreign body"),
            plain("저체온증", "hypothermia"),
            plain("고체온증", "hyperthermia"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    VocabularyField {
        path: "incidentType.subCategory_other.name",
        label: "Other incident",
        choices: &[
            plain("자연재해", "natural disaster"),
            plain("임산부", "pregnancy"),
            plain("신생아", "newborn"),
            plain("단순주취", "simple intoxication"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    VocabularyField {
        path: "incidentType.legalSuspicion.name",
        label: "Suspected crime",
        choices: &[
            plain("경찰통보", "police notified"),
            plain("경찰인계", "handed over to police"),
            plain("긴급이송", "emergency transport"),
            plain("관련기관 통보", "related agency notified"),
        ],
        detail_key: None,
        note: None,
    },
    // patientAssessment
    VocabularyField {
        path: "patientAssessment.consciousness.*.state",
        label: "Consciousness (AVPU)",
        choices: &[
            plain("A", "alert"),
            plain("V", "responds to voice"),
            plain("P", "responds to pain"),
            plain("U", "unresponsive"),
        ],
        detail_key: None,
        note: None,
    },
    VocabularyField {
        path: "patientAssessment.patientLevel",
        label: "Triage level",
        choices: &[
            plain("LEVEL 1", "resuscitation"),
            plain("LEVEL 2", "emergent"),
            plain("LEVEL 3", "urgent"),
            plain("LEVEL 4", "less urgent"),
            plain("LEVEL 5", "non-urgent"),
        ],
        detail_key: None,
        note: None,
    },
    // emergencyTreatment
    VocabularyField {
        path: "emergencyTreatment.airwayManagement.methods[]",
        label: "Airway management",
        choices: &[
            plain("도수조작", "manual maneuver"),
            plain("기도유지기", "airway adjunct"),
            plain("기관삽관", "endotracheal intubation"),
            plain("성문외기도유지기", "supraglottic airway"),
            plain("흡인기", "suction"),
            plain("기도폐쇄처치", "airway obstruction relief"),
        ],
        detail_key: None,
        note: Some("methods is an array; several may apply"),
    },
    VocabularyField {
        path: "emergencyTreatment.oxygenTherapy.device",
        label: "Oxygen device",
        choices: &[
            plain("비관", "nasal cannula"),
            plain("안면마스크", "face mask"),
            plain("비재호흡마스크", "non-rebreather mask"),
            plain("BVM", "bag-valve mask"),
            plain("산소소생기", "oxygen resuscitator"),
            plain("네뷸라이저", "nebulizer"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("value"),
        note: Some("flowRateLpm holds the stated flow in litres per minute"),
    },
    VocabularyField {
        path: "emergencyTreatment.cpr",
        label: "CPR",
        choices: &[
            plain("실시", "performed"),
            plain("거부", "refused"),
            plain("DNR", "do not resuscitate"),
            plain("유보", "withheld"),
        ],
        detail_key: None,
        note: None,
    },
    VocabularyField {
        path: "emergencyTreatment.aed.type",
        label: "AED use",
        choices: &[
            plain("shock", "shock delivered"),
            plain("monitoring", "monitoring only"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    VocabularyField {
        path: "emergencyTreatment.circulation.type",
        label: "Circulation support",
        choices: &[
            plain("정맥로 확보", "IV access"),
            detailed("수액공급 확보", "fluid infusion, volume in cc"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    VocabularyField {
        path: "emergencyTreatment.fixed",
        label: "Immobilization",
        choices: &[
            plain("목뼈", "cervical spine"),
            plain("척추", "spine"),
            plain("부목", "splint"),
            plain("머리", "head"),
        ],
        detail_key: None,
        note: None,
    },
    VocabularyField {
        path: "emergencyTreatment.woundCare",
        label: "Wound care",
        choices: &[plain("지혈", "bleeding control"), plain("상처 소독 처리", "wound disinfection")],
        detail_key: None,
        note: None,
    },
    VocabularyField {
        path: "emergencyTreatment.temperature",
        label: "Temperature control",
        choices: &[plain("온", "warming"), plain("냉", "cooling")],
        detail_key: None,
        note: None,
    },
    // medicalGuidance
    VocabularyField {
        path: "medicalGuidance.contactStatus",
        label: "Medical guidance contact",
        choices: &[plain("연결", "connected"), plain("미연결", "not connected")],
        detail_key: None,
        note: None,
    },
    VocabularyField {
        path: "medicalGuidance.requestMethod.type",
        label: "Guidance request method",
        choices: &[
            plain("일반전화", "landline"),
            plain("휴대전화", "mobile phone"),
            plain("무전기", "radio"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("value"),
        note: Some("for 휴대전화, put 음성 (voice) or 화상 (video) in value when stated"),
    },
    VocabularyField {
        path: "medicalGuidance.guidanceAgency.type",
        label: "Guidance agency",
        choices: &[
            plain("소방", "fire service"),
            plain("병원", "hospital"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    // patientTransport
    VocabularyField {
        path: "patientTransport.*.regionType",
        label: "Transport region",
        choices: &[plain("관할", "within jurisdiction"), plain("타시·도", "another city or province")],
        detail_key: None,
        note: None,
    },
    VocabularyField {
        path: "patientTransport.*.selectedBy",
        label: "Hospital selected by",
        choices: &[
            plain("구급대", "ambulance crew"),
            plain("119상황실", "119 dispatch room"),
            plain("구급상황센터", "EMS coordination center"),
            plain("환자보호자", "patient or guardian"),
            plain("병원수용곤란등", "hospital unable to accept"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("selectedByValue"),
        note: None,
    },
    VocabularyField {
        path: "patientTransport.*.retransportReason[].type",
        label: "Re-transport reason",
        choices: &[
            plain("병상부족", "no beds; list the wards in name"),
            plain("전문의부재", "no specialist"),
            plain("검사불가", "tests unavailable"),
            plain("원내 CPR", "in-hospital CPR"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    VocabularyField {
        path: "patientTransport.*.receiver",
        label: "Patient received by",
        choices: &[
            plain("의사", "doctor"),
            plain("간호사", "nurse"),
            plain("응급구조사", "paramedic"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("receiverValue"),
        note: None,
    },
    // detailReport
    VocabularyField {
        path: "detailReport.doctor.affiliation",
        label: "Doctor affiliation",
        choices: &[
            plain("소방", "fire service"),
            plain("병원", "hospital"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    VocabularyField {
        path: "detailReport.*.grade",
        label: "Crew qualification",
        choices: &[
            plain("1급", "level 1 EMT"),
            plain("2급", "level 2 EMT"),
            plain("간호사", "nurse"),
            plain("구급교육", "EMS training completed"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("value"),
        note: None,
    },
    VocabularyField {
        path: "detailReport.*.rank",
        label: "Fire service rank",
        choices: &[
            plain("사", "firefighter (소방사)"),
            plain("교", "senior firefighter (소방교)"),
            plain("장", "fire sergeant (소방장)"),
            plain("위", "fire lieutenant (소방위)"),
            plain("경", "fire captain (소방경)"),
            plain("령", "fire major (소방령)"),
            plain("정", "fire chief (소방정)"),
        ],
        detail_key: None,
        note: Some("use the single-syllable code, e.g. 소방교 -> 교"),
    },
    VocabularyField {
        path: "detailReport.obstacles[].type",
        label: "Obstacles",
        choices: &[
            plain("없음", "none"),
            plain("장거리 이송", "long-distance transport"),
            plain("보호자 요구", "guardian's demand"),
            plain("원거리 병원", "distant hospital"),
            plain("원거리 출동", "distant dispatch"),
            plain("만취자", "heavily intoxicated person"),
            plain("폭행", "assault"),
            plain("언어폭력", "verbal abuse"),
            plain("환자 과체중", "overweight patient"),
            plain("기관협조 미흡", "poor agency cooperation"),
            plain("환자위치 불명확", "unclear patient location"),
            plain("교통정체", "traffic congestion"),
            plain("폭우", "heavy rain"),
            plain("폭설", "heavy snow"),
            detailed(OTHER, "other"),
        ],
        detail_key: Some("value"),
        note: None,
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_every_field_belongs_to_a_category() {
        for field in VOCABULARY {
            assert!(field.category().is_some(), "no category for {}", field.path);
        }
    }

    #[test]
    fn test_detailed_choices_have_a_detail_key() {
        for field in VOCABULARY {
            if field.choices.iter().any(|c| c.requires_detail) {
                assert!(field.detail_key.is_some(), "{} lacks a detail key", field.path);
            }
        }
    }

    #[test]
    fn test_no_duplicate_values_within_a_field() {
        for field in VOCABULARY {
            let unique: HashSet<&str> = field.choices.iter().map(|c| c.value).collect();
            assert_eq!(unique.len(), field.choices.len(), "duplicate in {}", field.path);
        }
    }

    #[test]
    fn test_render_marks_detail_key() {
        let field = VOCABULARY
            .iter()
            .find(|f| f.path == "patientTransport.*.receiver")
            .unwrap();
        let line = field.render();

        assert!(line.starts_with("[Patient received by] *.receiver:"));
        assert!(line.contains("기타 (other; detail in \"receiverValue\")"));
        assert!(line.contains("의사 (doctor)"));
    }

    #[test]
    fn test_fields_for_category() {
        let paths: Vec<&str> = fields_for(Category::MedicalGuidance).map(|f| f.path).collect();
        assert_eq!(
            paths,
            vec![
                "medicalGuidance.contactStatus",
                "medicalGuidance.requestMethod.type",
                "medicalGuidance.guidanceAgency.type",
            ]
        );
    }
}
