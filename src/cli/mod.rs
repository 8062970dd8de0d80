//! Command-line parsing for the encounter documentation helper.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! lookup/scoring code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ConditionSeverity, Scope};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ehr", version, about = "ICD-10 lookup and encounter risk helper")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the ICD-10 reference table by code or description text.
    Search(SearchArgs),
    /// Score risk from individual clinical signals.
    Score(ScoreArgs),
    /// Score risk from an encounter JSON file.
    Assess(AssessArgs),
    /// Ask the form help assistant a question.
    Ask(AskArgs),
    /// Launch the interactive code explorer.
    Tui(TuiArgs),
}

/// Reference table location.
#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    /// ICD-10 reference CSV (defaults to $EHR_ICD10_TABLE or data/icd10_codes.csv).
    #[arg(long, value_name = "CSV")]
    pub table: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SearchArgs {
    /// Code or diagnosis text; empty lists the whole scope.
    #[arg(default_value = "")]
    pub query: String,

    /// Code set to search.
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = Scope::All)]
    pub scope: Scope,

    /// Maximum rows to display.
    #[arg(short = 'n', long, default_value_t = 50)]
    pub limit: usize,

    #[command(flatten)]
    pub table: TableArgs,
}

/// Opt-in flag for the external explanation call.
#[derive(Debug, Args, Clone, Default)]
pub struct ExplainArgs {
    /// Ask the external service to explain the result.
    #[arg(long)]
    pub explain: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    /// Age in years.
    #[arg(long)]
    pub age: Option<u32>,

    /// Number of current medications.
    #[arg(long = "meds", default_value_t = 0)]
    pub medication_count: u32,

    /// Patient condition.
    #[arg(long, value_enum, ignore_case = true, default_value_t = ConditionSeverity::Unknown)]
    pub severity: ConditionSeverity,

    /// Blood pressure as systolic/diastolic (e.g. 118/76).
    #[arg(long)]
    pub bp: Option<String>,

    /// Oxygen saturation in percent.
    #[arg(long)]
    pub spo2: Option<u32>,

    /// Medication list (explanation context).
    #[arg(long, default_value = "")]
    pub medications: String,

    /// Allergies (explanation context).
    #[arg(long, default_value = "")]
    pub allergies: String,

    /// Past medical history (explanation context).
    #[arg(long, default_value = "")]
    pub history: String,

    /// Working diagnosis (explanation context).
    #[arg(long, default_value = "")]
    pub diagnosis: String,

    #[command(flatten)]
    pub explain: ExplainArgs,
}

#[derive(Debug, Args, Clone)]
pub struct AssessArgs {
    /// Encounter JSON file.
    #[arg(value_name = "JSON")]
    pub encounter: PathBuf,

    /// Set the admission diagnosis from an ICD-10 code in the reference table.
    #[arg(long = "dx", value_name = "CODE")]
    pub dx_code: Option<String>,

    /// Save the validated encounter (with any resolved diagnosis) to JSON.
    #[arg(long, value_name = "JSON")]
    pub save: Option<PathBuf>,

    #[command(flatten)]
    pub explain: ExplainArgs,

    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(Debug, Args, Clone)]
pub struct AskArgs {
    /// The question, e.g. "where do I enter allergies?"
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    /// Initial code set.
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = Scope::All)]
    pub scope: Scope,

    /// Maximum rows to display.
    #[arg(short = 'n', long, default_value_t = 50)]
    pub limit: usize,

    #[command(flatten)]
    pub table: TableArgs,
}
