//! The encounter form record.
//!
//! Every field mirrors one input on the documentation form. All fields default
//! so a partially filled form still deserializes; `validate` enforces the same
//! numeric ranges the form's inputs allow.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{ClinicalSignals, ConditionSeverity};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncounterType {
    #[default]
    Er,
    Inpatient,
    Outpatient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Unspecified,
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrivalMode {
    #[default]
    #[serde(rename = "self")]
    SelfPresented,
    Ambulance,
    Transfer,
    Referral,
}

/// Section D of the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vitals {
    /// Free text as typed, e.g. `"118/76"`.
    pub blood_pressure: String,
    pub heart_rate: u32,
    pub respiratory_rate: u32,
    pub temperature_c: f64,
    pub spo2: u32,
    pub pain: u8,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            blood_pressure: String::new(),
            heart_rate: 80,
            respiratory_rate: 16,
            temperature_c: 37.0,
            spo2: 98,
            pain: 0,
        }
    }
}

/// A full patient encounter as captured by the form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Encounter {
    // Encounter context.
    pub patient_id: String,
    pub mrn: String,
    pub encounter_type: EncounterType,
    pub encounter_date: Option<NaiveDate>,
    pub provider: String,

    // A. Demographics.
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub sex: Sex,
    pub phone: String,
    pub address: String,

    // B. Admission.
    pub chief_complaint: String,
    pub mode_of_arrival: ArrivalMode,
    pub admission_dx: String,

    // C. History & screening.
    pub hpi: String,
    pub past_medical_history: String,
    pub medications: String,
    pub allergies: String,
    pub family_history: String,
    pub social_history: String,

    // D. Vitals.
    pub vitals: Vitals,

    // E. Physical examination.
    pub exam_general: String,
    pub exam_systems: String,

    // F. Assessment & plan.
    pub assessment: String,
    pub plan: String,
    pub condition: ConditionSeverity,
}

impl Encounter {
    /// Check vitals against the ranges the form inputs accept.
    pub fn validate(&self) -> Result<(), AppError> {
        let v = &self.vitals;
        check_range("heart_rate", v.heart_rate, 0, 300)?;
        check_range("respiratory_rate", v.respiratory_rate, 0, 80)?;
        check_range("spo2", v.spo2, 0, 100)?;
        check_range("pain", v.pain, 0, 10)?;
        if !(v.temperature_c.is_finite() && (30.0..=45.0).contains(&v.temperature_c)) {
            return Err(AppError::invalid_input(format!(
                "Invalid `temperature_c` {} (expected 30.0..=45.0).",
                v.temperature_c
            )));
        }
        Ok(())
    }

    /// Age in whole years on the encounter date.
    ///
    /// Falls back to `today` when the encounter date is blank.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let dob = self.dob?;
        let at = self.encounter_date.unwrap_or(today);
        age_in_years(dob, at)
    }

    /// Number of non-empty entries in the medication history text.
    pub fn medication_count(&self) -> u32 {
        count_entries(&self.medications)
    }

    /// Derive the risk-heuristic inputs from the form.
    pub fn signals(&self, today: NaiveDate) -> ClinicalSignals {
        let bp = self.vitals.blood_pressure.trim();
        ClinicalSignals {
            age: self.age_on(today),
            medication_count: self.medication_count(),
            condition_severity: self.condition,
            blood_pressure: (!bp.is_empty()).then(|| bp.to_string()),
            oxygen_saturation_percent: Some(self.vitals.spo2),
        }
    }
}

fn check_range<T>(name: &str, value: T, min: T, max: T) -> Result<(), AppError>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        return Err(AppError::invalid_input(format!(
            "Invalid `{name}` {value} (expected {min}..={max})."
        )));
    }
    Ok(())
}

fn age_in_years(dob: NaiveDate, at: NaiveDate) -> Option<u32> {
    if dob > at {
        return None;
    }
    let mut years = at.year() - dob.year();
    if (at.month(), at.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

fn count_entries(text: &str) -> u32 {
    let n = text
        .split(['\n', ',', ';'])
        .filter(|s| !s.trim().is_empty())
        .count();
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_completed_years_only() {
        assert_eq!(age_in_years(date(1960, 6, 15), date(2025, 6, 14)), Some(64));
        assert_eq!(age_in_years(date(1960, 6, 15), date(2025, 6, 15)), Some(65));
        assert_eq!(age_in_years(date(2026, 1, 1), date(2025, 1, 1)), None);
    }

    #[test]
    fn medication_count_splits_on_common_separators() {
        let enc = Encounter {
            medications: "metformin 500mg, lisinopril\natorvastatin; aspirin\n\n , ".to_string(),
            ..Encounter::default()
        };
        assert_eq!(enc.medication_count(), 4);
        assert_eq!(Encounter::default().medication_count(), 0);
    }

    #[test]
    fn signals_follow_form_fields() {
        let enc = Encounter {
            dob: Some(date(1950, 3, 1)),
            encounter_date: Some(date(2025, 2, 28)),
            medications: "a,b,c,d,e".to_string(),
            condition: ConditionSeverity::Guarded,
            vitals: Vitals {
                blood_pressure: "  ".to_string(),
                spo2: 90,
                ..Vitals::default()
            },
            ..Encounter::default()
        };
        let s = enc.signals(date(2030, 1, 1));
        assert_eq!(s.age, Some(74));
        assert_eq!(s.medication_count, 5);
        assert_eq!(s.condition_severity, ConditionSeverity::Guarded);
        assert_eq!(s.blood_pressure, None);
        assert_eq!(s.oxygen_saturation_percent, Some(90));
    }

    #[test]
    fn validate_rejects_out_of_range_vitals() {
        assert!(Encounter::default().validate().is_ok());

        let mut enc = Encounter::default();
        enc.vitals.heart_rate = 301;
        assert!(enc.validate().is_err());

        let mut enc = Encounter::default();
        enc.vitals.temperature_c = 29.5;
        assert!(enc.validate().is_err());

        let mut enc = Encounter::default();
        enc.vitals.pain = 11;
        assert!(enc.validate().is_err());
    }

    #[test]
    fn deserializes_partial_form() {
        let json = r#"{
            "patient_id": "P-1",
            "encounter_type": "er",
            "mode_of_arrival": "self",
            "condition": "critical",
            "vitals": {"spo2": 88}
        }"#;
        let enc: Encounter = serde_json::from_str(json).unwrap();
        assert_eq!(enc.patient_id, "P-1");
        assert_eq!(enc.encounter_type, EncounterType::Er);
        assert_eq!(enc.mode_of_arrival, ArrivalMode::SelfPresented);
        assert_eq!(enc.condition, ConditionSeverity::Critical);
        assert_eq!(enc.vitals.spo2, 88);
        assert_eq!(enc.vitals.heart_rate, 80);
    }

    #[test]
    fn choice_fields_share_lowercase_casing() {
        let enc = Encounter {
            encounter_type: EncounterType::Outpatient,
            sex: Sex::Female,
            mode_of_arrival: ArrivalMode::SelfPresented,
            condition: ConditionSeverity::Guarded,
            ..Encounter::default()
        };
        let value = serde_json::to_value(&enc).unwrap();
        assert_eq!(value["encounter_type"], "outpatient");
        assert_eq!(value["sex"], "female");
        assert_eq!(value["mode_of_arrival"], "self");
        assert_eq!(value["condition"], "guarded");

        let er: EncounterType = serde_json::from_str(r#""er""#).unwrap();
        assert_eq!(er, EncounterType::Er);
        assert!(serde_json::from_str::<EncounterType>(r#""ER""#).is_err());
    }
}
