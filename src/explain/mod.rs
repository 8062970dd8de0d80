//! Natural-language elaboration of a risk assessment.
//!
//! The prompt embeds every clinical field; the service is reached through the
//! `TextGenerator` trait so the HTTP client can be swapped out in tests.

use crate::domain::{ClinicalSignals, Encounter, RiskTier};
use crate::error::AppError;

pub mod client;

pub use client::ChatClient;

/// Fixed instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "You are a clinical documentation assistant. \
You do not diagnose, prescribe, or replace clinical judgement. \
Explain the provided heuristic risk tier in plain language, point out which inputs \
drive it and what a clinician may want to double-check (including possible adverse \
drug reactions). Always end with a short disclaimer that this is educational output \
and must be reviewed by a licensed clinician.";

/// Returned instead of calling the service when no credential is configured.
pub const NOT_CONFIGURED_MESSAGE: &str = "AI explanation is not configured. \
Set OPENAI_API_KEY (environment or .env) to enable it.";

/// Anything that turns a system instruction plus a prompt into text.
pub trait TextGenerator {
    fn generate(&self, api_key: &str, system: &str, prompt: &str) -> Result<String, AppError>;
}

/// Everything embedded in the explanation prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationRequest {
    pub signals: ClinicalSignals,
    pub tier: RiskTier,
    pub medications: String,
    pub allergies: String,
    pub history: String,
    pub diagnosis: String,
}

impl ExplanationRequest {
    /// Collect the free-text fields the prompt needs from an encounter.
    pub fn from_encounter(encounter: &Encounter, signals: ClinicalSignals, tier: RiskTier) -> Self {
        Self {
            signals,
            tier,
            medications: encounter.medications.clone(),
            allergies: encounter.allergies.clone(),
            history: encounter.past_medical_history.clone(),
            diagnosis: encounter.admission_dx.clone(),
        }
    }
}

/// Build the user prompt for the service.
pub fn build_prompt(req: &ExplanationRequest) -> String {
    let s = &req.signals;
    let mut out = String::new();

    out.push_str("Patient summary for risk explanation\n");
    out.push_str(&format!("- Age: {}\n", opt_or_unknown(s.age)));
    out.push_str(&format!("- Number of medications: {}\n", s.medication_count));
    out.push_str(&format!("- Condition: {}\n", s.condition_severity.display_name()));
    out.push_str(&format!(
        "- Blood pressure: {}\n",
        s.blood_pressure
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("not recorded")
    ));
    out.push_str(&format!(
        "- SpO2: {}\n",
        s.oxygen_saturation_percent
            .map(|v| format!("{v}%"))
            .unwrap_or_else(|| "not recorded".to_string())
    ));
    out.push_str(&format!("- Heuristic risk tier: {}\n", req.tier.display_name()));
    out.push_str(&format!("- Medications: {}\n", text_or_none(&req.medications)));
    out.push_str(&format!("- Allergies: {}\n", text_or_none(&req.allergies)));
    out.push_str(&format!("- Past medical history: {}\n", text_or_none(&req.history)));
    out.push_str(&format!("- Working diagnosis: {}\n", text_or_none(&req.diagnosis)));
    out.push_str(
        "\nExplain why this tier was assigned, which factors matter most, and which \
adverse drug reaction risks deserve review. Do not give a diagnosis.",
    );

    out
}

fn opt_or_unknown(v: Option<u32>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "unknown".to_string())
}

fn text_or_none(v: &str) -> &str {
    let v = v.trim();
    if v.is_empty() { "none recorded" } else { v }
}

/// Sends explanation requests through a generator when a credential exists.
pub struct Explainer<G> {
    generator: G,
    api_key: Option<String>,
}

impl<G: TextGenerator> Explainer<G> {
    pub fn new(generator: G, api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        Self { generator, api_key }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Ask the service to explain the assessment.
    ///
    /// Without a credential this returns [`NOT_CONFIGURED_MESSAGE`] and makes
    /// no call. Service failures are returned as-is; there is no retry.
    pub fn request_explanation(&self, req: &ExplanationRequest) -> Result<String, AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::info!("explanation requested without a configured credential");
            return Ok(NOT_CONFIGURED_MESSAGE.to_string());
        };

        let prompt = build_prompt(req);
        tracing::info!(tier = req.tier.display_name(), "requesting explanation");
        let text = self.generator.generate(api_key, SYSTEM_INSTRUCTION, &prompt)?;
        Ok(text.trim().to_string())
    }
}

impl Explainer<ChatClient> {
    /// Resolve credential and endpoint from the environment for this attempt.
    pub fn from_settings(settings: &crate::config::Settings) -> Result<Self, AppError> {
        let client = ChatClient::new(&settings.service_base_url, &settings.service_model)?;
        Ok(Self::new(client, settings.api_key.clone()))
    }
}
