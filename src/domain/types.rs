//! Shared domain types.
//!
//! These types are intentionally small value objects: rows are immutable once
//! loaded and assessments are derived fresh for every request.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which slice of the code table a query runs against.
///
/// The slice is decided by the claims-validity exclusion column (`NF EXCL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    /// Codes without an exclusion mark.
    Included,
    /// Codes carrying an exclusion mark.
    Excluded,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::All, Scope::Included, Scope::Excluded];

    pub fn display_name(self) -> &'static str {
        match self {
            Scope::All => "All",
            Scope::Included => "Included",
            Scope::Excluded => "Excluded",
        }
    }

    /// Cycle to the next scope (All -> Included -> Excluded -> All).
    pub fn next(self) -> Self {
        match self {
            Scope::All => Scope::Included,
            Scope::Included => Scope::Excluded,
            Scope::Excluded => Scope::All,
        }
    }

    pub fn admits(self, record: &CodeRecord) -> bool {
        match self {
            Scope::All => true,
            Scope::Included => !record.excluded,
            Scope::Excluded => record.excluded,
        }
    }
}

/// One row of the diagnosis-code reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRecord {
    pub code: String,
    pub short_label: String,
    pub long_label: String,
    /// True when the source row carries any value in the exclusion column.
    pub excluded: bool,
}

impl CodeRecord {
    /// Label used when a caller picks a diagnosis from search results.
    pub fn display_label(&self) -> String {
        format!("{} – {}", self.code, self.short_label)
    }
}

/// Overall patient condition as recorded in the assessment section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConditionSeverity {
    Stable,
    Guarded,
    Critical,
    #[default]
    Unknown,
}

impl ConditionSeverity {
    pub fn display_name(self) -> &'static str {
        match self {
            ConditionSeverity::Stable => "Stable",
            ConditionSeverity::Guarded => "Guarded",
            ConditionSeverity::Critical => "Critical",
            ConditionSeverity::Unknown => "Unknown",
        }
    }
}

/// Inputs to the risk heuristic, assembled per request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalSignals {
    pub age: Option<u32>,
    pub medication_count: u32,
    pub condition_severity: ConditionSeverity,
    /// Free text as typed, expected as `systolic/diastolic`.
    pub blood_pressure: Option<String>,
    pub oxygen_saturation_percent: Option<u32>,
}

/// Discrete risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// Fixed threshold table: 0 -> Low, 1..=2 -> Moderate, 3+ -> High.
    pub fn from_score(score: u32) -> Self {
        match score {
            0 => RiskTier::Low,
            1 | 2 => RiskTier::Moderate,
            _ => RiskTier::High,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
        }
    }
}

/// One of the five point-scoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskRule {
    AdvancedAge,
    Polypharmacy,
    UnstableCondition,
    Hypotension,
    Hypoxemia,
}

impl RiskRule {
    pub const ALL: [RiskRule; 5] = [
        RiskRule::AdvancedAge,
        RiskRule::Polypharmacy,
        RiskRule::UnstableCondition,
        RiskRule::Hypotension,
        RiskRule::Hypoxemia,
    ];

    pub fn description(self) -> &'static str {
        match self {
            RiskRule::AdvancedAge => "age 65 or older",
            RiskRule::Polypharmacy => "5 or more medications",
            RiskRule::UnstableCondition => "condition guarded or critical",
            RiskRule::Hypotension => "systolic < 100 or diastolic < 60",
            RiskRule::Hypoxemia => "SpO2 below 92%",
        }
    }
}

/// Output of the risk heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    pub score: u32,
    /// Rules that contributed a point, in evaluation order.
    pub fired: Vec<RiskRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_exact() {
        assert_eq!(RiskTier::from_score(0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(1), RiskTier::Moderate);
        assert_eq!(RiskTier::from_score(2), RiskTier::Moderate);
        for s in 3..=5 {
            assert_eq!(RiskTier::from_score(s), RiskTier::High);
        }
    }

    #[test]
    fn scope_cycles_through_all_values() {
        let mut scope = Scope::All;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(scope);
            scope = scope.next();
        }
        assert_eq!(seen, Scope::ALL.to_vec());
        assert_eq!(scope, Scope::All);
    }

    #[test]
    fn display_label_joins_code_and_short_label() {
        let record = CodeRecord {
            code: "E119".to_string(),
            short_label: "Type 2 diabetes mellitus without complications".to_string(),
            long_label: String::new(),
            excluded: false,
        };
        assert_eq!(
            record.display_label(),
            "E119 – Type 2 diabetes mellitus without complications"
        );
    }
}
