use crate::models::{fields_for, Category, OTHER};

/// System prompt for the correction pass
pub const CORRECTION_SYSTEM_PROMPT: &str = r#"You are a speech recognition specialist for 119 emergency calls and ambulance runs.

The conversation below is Korean speech-to-text output between EMS crew members, patients, and bystanders. Several speakers (A, B, C, D, ...) may appear; usually a crew member asks and the patient answers.

Fix words the recognizer got wrong, using the medical and emergency context:
1. Restore medical and emergency terms (e.g. "두동" -> "두통", "삽형급실" -> "응급실").
2. Repair expressions that make no sense in context (e.g. "아바요" -> "아파요").
3. Correct only clear errors. Do not rephrase, summarize, translate, or add content.
4. Keep every line's "[speaker X]:" tag exactly as given, one line per utterance, in the same order.
5. A line starting with "[emergency call context:" is background for you; do not repeat it.

Example:
input:  [speaker B]: 머리가 두동이 이이나요?
output: [speaker B]: 머리가 두통이 있나요?

Output only the corrected conversation."#;

/// Build the user prompt for the correction pass
pub fn build_correction_prompt(conversation: &str) -> String {
    format!(
        "Conversation to correct:\n\n{}\n\nCorrected conversation:",
        conversation
    )
}

/// System prompt for the extraction pass
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You structure 119 emergency medical information.

Read a conversation between EMS crew and a patient (or bystanders) and extract what it says about the patient and the run as one JSON object.

Principles:
1. Include only what the conversation explicitly states. Never guess or infer.
2. When something is not stated, omit the field. Never emit null, "", {}, or [].
3. Numbers only when an exact value is spoken.
4. Symptoms the patient reports and observations or questions by the crew both count.
5. Every category you emit carries "schema_version": 1. Emit no other content for a category with nothing stated.
6. Never output signature data or anything about signatures.
7. Output pure JSON: no code fences, no commentary."#;

/// A worked conversation-to-record example shown to the extraction model
#[derive(Debug, Clone, Copy)]
pub struct FewShotExample {
    pub title: &'static str,
    pub conversation: &'static str,
    /// Expected record, as compact JSON
    pub record: &'static str,
}

pub const FEW_SHOT_EXAMPLES: &[FewShotExample] = &[
    FewShotExample {
        title: "choices only",
        conversation: "[speaker B]: 어디가 아프세요?\n\
                       [speaker C]: 머리가 아파요.\n\
                       [speaker B]: 고혈압 있으세요?\n\
                       [speaker C]: 네, 있습니다.",
        record: r#"{"dispatch":{"schema_version":1,"symptoms":{"pain":[{"name":"두통"}]}},"incidentType":{"schema_version":1,"medicalHistory":{"status":"있음","items":[{"name":"고혈압"}]}}}"#,
    },
    FewShotExample {
        title: "choice with a required detail",
        conversation: "[speaker B]: 어디가 불편하세요?\n\
                       [speaker C]: 손가락 끝이 찢어졌어요.\n\
                       [speaker B]: 암 병력 있으세요?\n\
                       [speaker C]: 네, 폐암입니다.",
        record: r#"{"dispatch":{"schema_version":1,"symptoms":{"trauma":[{"name":"열상"}]}},"incidentType":{"schema_version":1,"medicalHistory":{"status":"있음","items":[{"name":"암","value":"폐암"}]}}}"#,
    },
    FewShotExample {
        title: "traffic accident",
        conversation: "[speaker B]: 어떤 사고였나요?\n\
                       [speaker C]: 차를 운전하다가 추돌 당했어요.\n\
                       [speaker B]: 고혈압 있으시죠?\n\
                       [speaker C]: 네, 있습니다.",
        record: r#"{"incidentType":{"schema_version":1,"medicalHistory":{"status":"있음","items":[{"name":"고혈압"}]},"category":"질병외","subCategory_traffic":{"type":"교통사고","name":"운전자"}}}"#,
    },
    FewShotExample {
        title: "emergency treatment",
        conversation: "[speaker B]: 기도유지기 넣겠습니다. 비재호흡마스크로 산소 10리터 투여할게요.\n\
                       [speaker B]: AED 쇼크 실시했습니다.\n\
                       [speaker B]: 수액 200cc 투여 완료.",
        record: r#"{"emergencyTreatment":{"schema_version":1,"airwayManagement":{"methods":["기도유지기"]},"oxygenTherapy":{"flowRateLpm":10,"device":"비재호흡마스크"},"aed":{"type":"shock"},"circulation":{"type":"수액공급 확보","value":"200"}}}"#,
    },
    FewShotExample {
        title: "medical guidance",
        conversation: "[speaker B]: 의료지도 연결했습니다. 병원 이의사 선생님이세요.\n\
                       [speaker B]: 일반전화로 요청했고 기관삽관 지시 받았습니다.\n\
                       [speaker B]: 드레싱도 하라고 하네요.\n\
                       [speaker B]: 활성탄 투여하고 병원 선정 진행합니다.",
        record: r#"{"medicalGuidance":{"schema_version":1,"contactStatus":"연결","requestMethod":{"type":"일반전화"},"guidanceAgency":{"type":"병원"},"guidanceDoctor":{"name":"이의사"},"guidanceContent":{"emergencyTreatment":[{"name":"기관삽관"},{"name":"기타","value":"드레싱"}],"medication":[{"name":"기타","value":"활성탄"}],"hospitalRequest":true}}}"#,
    },
    FewShotExample {
        title: "transport with a re-transport",
        conversation: "[speaker B]: 첫 번째로 OO병원 갔는데 응급실, 중환자실 병상이 없다고 해서 재이송했습니다.\n\
                       [speaker B]: 거기는 상황실에서 선정했고 의사 선생님께 인계했어요.\n\
                       [speaker B]: 이후 관할 밖 타 시도의 △△병원으로 가서 간호사에게 인계했습니다.",
        record: r#"{"patientTransport":{"schema_version":1,"firstTransport":{"hospitalName":"OO병원","retransportReason":[{"type":"병상부족","name":["응급실","중환자실"]}],"selectedBy":"119상황실","receiver":"의사"},"secondTransport":{"hospitalName":"△△병원","regionType":"타시·도","receiver":"간호사"}}}"#,
    },
    FewShotExample {
        title: "crew roster",
        conversation: "[speaker B]: 소방 소속 홍길동 의사 선생님께 확인 받았습니다.\n\
                       [speaker B]: 1급 소방교 김철수, 2급 소방사 박영희가 탑승했고 운전은 구급교육 이수한 소방교 이운전이 맡았습니다.\n\
                       [speaker B]: 의무소방 최지원 대원이 함께 했고 보호자 요구 때문에 지체됐습니다.",
        record: r#"{"detailReport":{"schema_version":1,"doctor":{"affiliation":"소방","name":"홍길동"},"paramedic1":{"grade":"1급","rank":"교","name":"김철수"},"paramedic2":{"grade":"2급","rank":"사","name":"박영희"},"driver":{"grade":"구급교육","rank":"교","name":"이운전"},"other":{"grade":"기타","value":"의무소방","name":"최지원"},"obstacles":[{"type":"보호자 요구"}]}}"#,
    },
    FewShotExample {
        title: "identity and vital signs",
        conversation: "[speaker A]: 환자분 성함이 어떻게 되세요?\n\
                       [speaker C]: 김영수요, 예순일곱 살이에요.\n\
                       [speaker A]: 2시 20분, 부르면 반응 있습니다. 혈압 150에 90, 맥박 98, 산소포화도 94.\n\
                       [speaker D]: 제가 딸이에요.",
        record: r#"{"patientInfo":{"schema_version":1,"patient":{"name":"김영수","ageYears":67},"guardian":{"relation":"딸"}},"patientAssessment":{"schema_version":1,"consciousness":{"first":{"time":"14:20","state":"V"}},"vitalSigns":{"first":{"time":"14:20","bloodPressure":"150/90","pulse":98,"spo2":94}}}}"#,
    },
    FewShotExample {
        title: "other with an elaboration",
        conversation: "[speaker B]: 어디서 다치셨어요?\n\
                       [speaker C]: 캠핑장에서 벌에 쏘였어요. 숨쉬기가 힘들어요.",
        record: r#"{"dispatch":{"schema_version":1,"sceneLocation":{"name":"기타","value":"캠핑장"},"symptoms":{"otherSymptoms":[{"name":"호흡곤란"}]}},"incidentType":{"schema_version":1,"category":"질병외","subCategory_nonTrauma":{"type":"비외상성 손상","name":"동물/곤충","value":"벌"}}}"#,
    },
    FewShotExample {
        title: "nothing to extract",
        conversation: "[speaker A]: 119입니다.\n\
                       [speaker B]: 네, 잠시만요.",
        record: "{}",
    },
];

/// Closed vocabulary section of the extraction prompt
pub fn render_vocabulary() -> String {
    let mut text = String::new();
    for category in Category::ALL {
        let lines: Vec<String> = fields_for(category).map(|field| field.render()).collect();
        if lines.is_empty() {
            continue;
        }
        text.push_str(&format!("### {}\n", category.key()));
        for line in lines {
            text.push_str(&line);
            text.push('\n');
        }
        text.push('\n');
    }
    text
}

fn render_examples() -> String {
    FEW_SHOT_EXAMPLES
        .iter()
        .enumerate()
        .map(|(i, example)| {
            format!(
                "Example {} ({}):\ninput:\n{}\noutput:\n{}\n",
                i + 1,
                example.title,
                example.conversation,
                example.record
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the user prompt for the extraction pass
pub fn build_extraction_prompt(corrected_conversation: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("## Categories\n");
    for category in Category::ALL {
        prompt.push_str(&format!(
            "- {} ({}): {}\n",
            category.key(),
            category.title(),
            category.layout()
        ));
    }
    prompt.push('\n');

    prompt.push_str("## Allowed values\n");
    prompt.push_str(
        "Map what is said to the closest listed value and copy it exactly. \
         Values marked \"detail in\" need that key filled with the specifics.\n\n",
    );
    prompt.push_str(&render_vocabulary());

    prompt.push_str("## Rules\n");
    prompt.push_str(&format!(
        "1. A listed value: set only the value, omit the detail key.\n\
         2. Nothing fits: use \"{other}\" and put the specifics in the detail key (usually \"value\"; \
         dispatchTypeValue, selectedByValue and receiverValue where named).\n\
         3. 암, 감염병, 신부전, 동물/곤충 and 그 밖의 탈 것 always need their detail.\n\
         4. incidentType.category 질병외 takes exactly one traffic, injury or non-trauma subcategory; \
         {other} sets category_other to \"{other}\" and uses subCategory_other.\n\
         5. Treatments, medications and instructions only when the conversation says they were done or given.\n\
         6. Times as HH:MM (24h), dates as ISO-8601.\n\n",
        other = OTHER
    ));

    prompt.push_str("## Examples\n");
    prompt.push_str(&render_examples());
    prompt.push('\n');

    prompt.push_str("## Conversation\n");
    prompt.push_str(corrected_conversation);
    prompt.push_str("\n\nRespond with the JSON object only.");

    prompt
}
