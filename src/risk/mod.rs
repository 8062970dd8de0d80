//! Heuristic risk scoring.
//!
//! Five independent rules each add one point; the total maps to a tier through
//! a fixed threshold table (`RiskTier::from_score`). Malformed inputs never
//! fail: a rule that cannot read its input simply does not fire.

use crate::domain::{ClinicalSignals, ConditionSeverity, RiskAssessment, RiskRule, RiskTier};

const AGE_THRESHOLD: u32 = 65;
const POLYPHARMACY_THRESHOLD: u32 = 5;
const SYSTOLIC_FLOOR: i64 = 100;
const DIASTOLIC_FLOOR: i64 = 60;
const SPO2_FLOOR: u32 = 92;

/// Score the signals and map the total to a tier.
pub fn score(signals: &ClinicalSignals) -> RiskAssessment {
    let fired: Vec<RiskRule> = RiskRule::ALL
        .into_iter()
        .filter(|rule| rule_fires(*rule, signals))
        .collect();

    let score = fired.len() as u32;
    let tier = RiskTier::from_score(score);
    tracing::debug!(score, tier = tier.display_name(), ?fired, "risk scored");

    RiskAssessment { tier, score, fired }
}

/// Whether a single rule contributes its point.
pub fn rule_fires(rule: RiskRule, signals: &ClinicalSignals) -> bool {
    match rule {
        RiskRule::AdvancedAge => signals.age.is_some_and(|a| a >= AGE_THRESHOLD),
        RiskRule::Polypharmacy => signals.medication_count >= POLYPHARMACY_THRESHOLD,
        RiskRule::UnstableCondition => matches!(
            signals.condition_severity,
            ConditionSeverity::Guarded | ConditionSeverity::Critical
        ),
        RiskRule::Hypotension => signals
            .blood_pressure
            .as_deref()
            .and_then(parse_blood_pressure)
            .is_some_and(|(s, d)| s < SYSTOLIC_FLOOR || d < DIASTOLIC_FLOOR),
        RiskRule::Hypoxemia => signals
            .oxygen_saturation_percent
            .is_some_and(|v| v < SPO2_FLOOR),
    }
}

/// Parse `"systolic/diastolic"`; anything other than exactly two integers is `None`.
///
/// Integers wider than `i64` saturate, so an absurd systolic value does not
/// hide a low diastolic one.
pub fn parse_blood_pressure(raw: &str) -> Option<(i64, i64)> {
    let mut parts = raw.split('/');
    let systolic = parse_reading(parts.next()?)?;
    let diastolic = parse_reading(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((systolic, diastolic))
}

fn parse_reading(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Only overflow can fail past the digit check.
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(
        age: Option<u32>,
        meds: u32,
        severity: ConditionSeverity,
        bp: Option<&str>,
        spo2: Option<u32>,
    ) -> ClinicalSignals {
        ClinicalSignals {
            age,
            medication_count: meds,
            condition_severity: severity,
            blood_pressure: bp.map(str::to_string),
            oxygen_saturation_percent: spo2,
        }
    }

    #[test]
    fn all_rules_firing_is_high() {
        let s = signals(Some(70), 6, ConditionSeverity::Critical, Some("90/55"), Some(88));
        let a = score(&s);
        assert_eq!(a.score, 5);
        assert_eq!(a.tier, RiskTier::High);
        assert_eq!(a.fired, RiskRule::ALL.to_vec());
    }

    #[test]
    fn healthy_adult_is_low() {
        let s = signals(Some(40), 1, ConditionSeverity::Stable, Some("120/80"), Some(98));
        let a = score(&s);
        assert_eq!(a.score, 0);
        assert_eq!(a.tier, RiskTier::Low);
        assert!(a.fired.is_empty());
    }

    #[test]
    fn absent_signals_do_not_fire() {
        let s = signals(None, 5, ConditionSeverity::Guarded, None, None);
        let a = score(&s);
        assert_eq!(a.score, 2);
        assert_eq!(a.tier, RiskTier::Moderate);
        assert_eq!(a.fired, vec![RiskRule::Polypharmacy, RiskRule::UnstableCondition]);
    }

    #[test]
    fn malformed_blood_pressure_contributes_nothing() {
        let malformed = ["abc", "120", "120/", "", "/80", "90/55/40", "ninety/55", "90 / x"];
        for bp in malformed {
            let s = signals(Some(30), 0, ConditionSeverity::Stable, Some(bp), Some(97));
            assert_eq!(score(&s).score, 0, "bp {bp:?}");
        }
    }

    #[test]
    fn blood_pressure_rule_checks_either_side() {
        let base = |bp: &str| signals(None, 0, ConditionSeverity::Unknown, Some(bp), None);
        assert_eq!(score(&base("99/80")).score, 1);
        assert_eq!(score(&base("120/59")).score, 1);
        assert_eq!(score(&base("100/60")).score, 0);
        assert_eq!(score(&base(" 95 / 70 ")).score, 1);
    }

    #[test]
    fn oversized_readings_saturate_instead_of_failing() {
        let base = |bp: &str| signals(None, 0, ConditionSeverity::Unknown, Some(bp), None);
        assert_eq!(score(&base("99999999999/55")).score, 1);
        assert_eq!(score(&base("99999999999999999999999/55")).score, 1);
        assert_eq!(score(&base("120/99999999999")).score, 0);
        assert_eq!(score(&base("-99999999999999999999/80")).score, 1);
        assert_eq!(parse_blood_pressure("+120/80"), Some((120, 80)));
        assert_eq!(parse_blood_pressure("99999999999/55"), Some((99_999_999_999, 55)));
        assert_eq!(parse_blood_pressure("12a/80"), None);
        assert_eq!(parse_blood_pressure("-/80"), None);
    }

    #[test]
    fn thresholds_are_inclusive_where_stated() {
        let s = |age, meds, spo2| {
            signals(Some(age), meds, ConditionSeverity::Stable, None, Some(spo2))
        };
        assert_eq!(score(&s(64, 4, 92)).score, 0);
        assert_eq!(score(&s(65, 4, 92)).score, 1);
        assert_eq!(score(&s(64, 5, 92)).score, 1);
        assert_eq!(score(&s(64, 4, 91)).score, 1);
    }

    #[test]
    fn unknown_and_stable_severity_do_not_fire() {
        for sev in [ConditionSeverity::Stable, ConditionSeverity::Unknown] {
            assert!(!rule_fires(RiskRule::UnstableCondition, &signals(None, 0, sev, None, None)));
        }
    }

    #[test]
    fn score_equals_count_of_independent_rules() {
        let cases = [
            signals(Some(80), 0, ConditionSeverity::Stable, Some("85/50"), None),
            signals(None, 9, ConditionSeverity::Critical, Some("bad"), Some(85)),
            signals(Some(66), 5, ConditionSeverity::Guarded, Some("140/90"), Some(93)),
        ];
        for s in &cases {
            let expected = RiskRule::ALL.iter().filter(|r| rule_fires(**r, s)).count() as u32;
            let a = score(s);
            assert_eq!(a.score, expected);
            assert_eq!(a.tier, RiskTier::from_score(expected));
        }
        assert_eq!(score(&cases[0]).tier, RiskTier::Moderate);
        assert_eq!(score(&cases[1]).tier, RiskTier::High);
        assert_eq!(score(&cases[2]).tier, RiskTier::High);
    }
}
