use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level sections of the extracted incident record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Reporter, patient identity, guardian, incident location
    PatientInfo,
    /// Dispatch timeline, scene location, presenting symptoms
    Dispatch,
    /// Medical history and incident classification
    IncidentType,
    /// Consciousness, pupils, vital signs, triage level
    PatientAssessment,
    /// Airway, oxygen, CPR, AED, circulation, immobilization
    EmergencyTreatment,
    /// Contact with a medical director and the instructions received
    MedicalGuidance,
    /// Receiving hospitals, re-transport reasons, handover
    PatientTransport,
    /// Crew roster and obstacles encountered
    DetailReport,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::PatientInfo,
        Category::Dispatch,
        Category::IncidentType,
        Category::PatientAssessment,
        Category::EmergencyTreatment,
        Category::MedicalGuidance,
        Category::PatientTransport,
        Category::DetailReport,
    ];

    /// JSON key of the category in the record
    pub fn key(&self) -> &'static str {
        match self {
            Category::PatientInfo => "patientInfo",
            Category::Dispatch => "dispatch",
            Category::IncidentType => "incidentType",
            Category::PatientAssessment => "patientAssessment",
            Category::EmergencyTreatment => "emergencyTreatment",
            Category::MedicalGuidance => "medicalGuidance",
            Category::PatientTransport => "patientTransport",
            Category::DetailReport => "detailReport",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::PatientInfo => "Patient and reporter information",
            Category::Dispatch => "Dispatch",
            Category::IncidentType => "Incident type",
            Category::PatientAssessment => "Patient assessment",
            Category::EmergencyTreatment => "Emergency treatment",
            Category::MedicalGuidance => "Medical guidance",
            Category::PatientTransport => "Patient transport",
            Category::DetailReport => "Detail report",
        }
    }

    /// Field layout shown to the extraction model
    pub fn layout(&self) -> &'static str {
        match self {
            Category::PatientInfo => {
                "reporter {phone, reportMethod, value}, \
                 patient {name, gender, ageYears, birthDate (YYYY-MM-DD), address}, \
                 guardian {name, relation, phone}, incidentLocation {text}"
            }
            Category::Dispatch => {
                "reportDatetime (ISO-8601), departureTime, arrivalSceneTime, contactTime, \
                 departureSceneTime, arrivalHospitalTime, returnTime (all HH:MM), distanceKm, \
                 dispatchType, dispatchTypeValue, sceneLocation {name, value}, \
                 symptoms {pain [{name, value}], trauma [{name, value}], otherSymptoms [{name, value}]}"
            }
            Category::IncidentType => {
                "medicalHistory {status, items [{name, value}]}, category, \
                 subCategory_traffic {type, name, value}, subCategory_injury {type, name}, \
                 subCategory_nonTrauma {type, name, value}, category_other, \
                 subCategory_other {name, value}, legalSuspicion {name}"
            }
            Category::PatientAssessment => {
                "consciousness {first {time, state}, second {time, state}}, \
                 pupilReaction {left {status, reaction}, right {status, reaction}}, \
                 vitalSigns {first {time, bloodPressure (\"SYS/DIA\"), pulse, respiration, \
                 temperature, spo2, bloodSugar}, second {same fields}}, patientLevel, \
                 notes {chiefComplaint, onset, note}"
            }
            Category::EmergencyTreatment => {
                "airwayManagement {methods []}, oxygenTherapy {flowRateLpm, device, value}, cpr, \
                 ecg (boolean), aed {type, value}, circulation {type, value}, \
                 drug {name, dosage, time}, fixed, woundCare, deliverytime (HH:MM), \
                 temperature, notes"
            }
            Category::MedicalGuidance => {
                "contactStatus, requestTime (HH:MM), requestMethod {type, value}, \
                 guidanceAgency {type, value}, guidanceDoctor {name}, \
                 guidanceContent {emergencyTreatment [{name, value}], medication [{name, value}], \
                 hospitalRequest, patientEvaluation, cprTransfer, transferRefusal, \
                 transferRejection (all boolean), notes}"
            }
            Category::PatientTransport => {
                "firstTransport and secondTransport, each {hospitalName, regionType, \
                 arrivalTime (HH:MM), distanceKm, selectedBy, selectedByValue, \
                 retransportReason [{type, name [], value}], receiver, receiverValue}"
            }
            Category::DetailReport => {
                "doctor {affiliation, value, name}, paramedic1, paramedic2, driver and other, \
                 each {grade, value, rank, name}, obstacles [{type, value}]"
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.key() == s)
            .ok_or_else(|| format!("unknown record category: {}", s))
    }
}
