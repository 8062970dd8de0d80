//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging and settings
//! - parses CLI arguments
//! - runs lookups, scoring, and optional explanations
//! - prints reports

use chrono::Local;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{AskArgs, AssessArgs, Command, ScoreArgs, SearchArgs, TableArgs};
use crate::config::Settings;
use crate::domain::ClinicalSignals;
use crate::error::AppError;
use crate::explain::{Explainer, ExplanationRequest};
use crate::lookup::ReferenceTable;

/// Entry point for the `ehr` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    // Bare `ehr` (or `ehr --scope excluded`) opens the code explorer; see
    // `rewrite_args`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let settings = Settings::from_env();

    match cli.command {
        Command::Search(args) => handle_search(args, settings),
        Command::Score(args) => handle_score(args, &settings),
        Command::Assess(args) => handle_assess(args, settings),
        Command::Ask(args) => handle_ask(args),
        Command::Tui(args) => {
            let table = reference_table(&args.table, settings);
            crate::tui::run(&table, args.scope, args.limit)
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ehr_assist=warn"));
    // A subscriber may already be installed (e.g. when embedded); that's fine.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn reference_table(args: &TableArgs, settings: Settings) -> ReferenceTable {
    let settings = settings.with_table_path(args.table.clone());
    ReferenceTable::new(settings.table_path)
}

fn handle_search(args: SearchArgs, settings: Settings) -> Result<(), AppError> {
    let table = reference_table(&args.table, settings);
    let index = table.load()?;
    let rows = index.query(&args.query, args.scope);

    println!(
        "{}",
        crate::report::format_search_results(&rows, args.scope, &args.query, args.limit)
    );
    Ok(())
}

fn handle_score(args: ScoreArgs, settings: &Settings) -> Result<(), AppError> {
    let signals = ClinicalSignals {
        age: args.age,
        medication_count: args.medication_count,
        condition_severity: args.severity,
        blood_pressure: args.bp,
        oxygen_saturation_percent: args.spo2,
    };
    let assessment = crate::risk::score(&signals);
    println!("{}", crate::report::format_assessment(&assessment));

    if args.explain.explain {
        let req = ExplanationRequest {
            signals,
            tier: assessment.tier,
            medications: args.medications,
            allergies: args.allergies,
            history: args.history,
            diagnosis: args.diagnosis,
        };
        print_explanation(settings, &req)?;
    }
    Ok(())
}

fn handle_assess(args: AssessArgs, settings: Settings) -> Result<(), AppError> {
    let mut encounter = crate::io::read_encounter_json(&args.encounter)?;
    encounter.validate()?;

    if let Some(code) = &args.dx_code {
        let table = reference_table(&args.table, settings.clone());
        let index = table.load()?;
        let record = index.find_code(code).ok_or_else(|| {
            AppError::invalid_input(format!("Unknown ICD-10 code '{code}' in reference table."))
        })?;
        encounter.admission_dx = record.display_label();
    }

    let signals = encounter.signals(Local::now().date_naive());
    let assessment = crate::risk::score(&signals);

    println!(
        "Patient: {} | MRN: {} | Provider: {}",
        or_dash(&encounter.patient_id),
        or_dash(&encounter.mrn),
        or_dash(&encounter.provider)
    );
    println!("Admission diagnosis: {}", or_dash(&encounter.admission_dx));
    println!("{}", crate::report::format_assessment(&assessment));

    if let Some(path) = &args.save {
        crate::io::write_encounter_json(path, &encounter)?;
        println!("Encounter saved to {}.", path.display());
    }

    if args.explain.explain {
        let req = ExplanationRequest::from_encounter(&encounter, signals, assessment.tier);
        print_explanation(&settings, &req)?;
    }
    Ok(())
}

fn handle_ask(args: AskArgs) -> Result<(), AppError> {
    let question = args.question.join(" ");
    println!("{}", crate::assistant::answer(&question));
    Ok(())
}

fn print_explanation(settings: &Settings, req: &ExplanationRequest) -> Result<(), AppError> {
    let explainer = Explainer::from_settings(settings)?;
    let text = explainer.request_explanation(req)?;
    println!("AI explanation:\n{text}");
    Ok(())
}

fn or_dash(s: &str) -> &str {
    let s = s.trim();
    if s.is_empty() { "—" } else { s }
}

/// Rewrite argv so `ehr` defaults to `ehr tui`.
///
/// Rules:
/// - `ehr`                      -> `ehr tui`
/// - `ehr --scope excluded ...` -> `ehr tui --scope excluded ...`
/// - `ehr --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }

    argv
}
