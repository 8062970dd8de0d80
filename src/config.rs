//! Environment-backed settings.
//!
//! Values come from the process environment after loading an optional `.env`
//! file. CLI flags override the table path.

use std::path::PathBuf;

pub const DEFAULT_TABLE_PATH: &str = "data/icd10_codes.csv";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub table_path: PathBuf,
    pub api_key: Option<String>,
    pub service_base_url: String,
    pub service_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            table_path: PathBuf::from(DEFAULT_TABLE_PATH),
            api_key: None,
            service_base_url: DEFAULT_BASE_URL.to_string(),
            service_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Settings {
    /// Read settings from the environment (and `.env`, if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            table_path: get("EHR_ICD10_TABLE")
                .map(PathBuf::from)
                .unwrap_or(defaults.table_path),
            api_key: get("OPENAI_API_KEY"),
            service_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.service_base_url),
            service_model: get("OPENAI_MODEL").unwrap_or(defaults.service_model),
        }
    }

    pub fn with_table_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.table_path = path;
        }
        self
    }
}
