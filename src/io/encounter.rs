//! Read/write encounter JSON files.
//!
//! The schema is defined by `domain::Encounter`.

use std::fs::File;
use std::path::Path;

use crate::domain::Encounter;
use crate::error::AppError;

/// Read an encounter JSON file.
pub fn read_encounter_json(path: &Path) -> Result<Encounter, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::invalid_input(format!("Failed to open encounter JSON '{}': {e}", path.display()))
    })?;
    let encounter: Encounter = serde_json::from_reader(file)
        .map_err(|e| AppError::invalid_input(format!("Invalid encounter JSON: {e}")))?;
    Ok(encounter)
}

/// Write an encounter JSON file.
pub fn write_encounter_json(path: &Path, encounter: &Encounter) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::invalid_input(format!(
            "Failed to create encounter JSON '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, encounter)
        .map_err(|e| AppError::invalid_input(format!("Failed to write encounter JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConditionSeverity;

    #[test]
    fn written_encounter_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encounter.json");

        let mut enc = Encounter {
            patient_id: "P-42".to_string(),
            condition: ConditionSeverity::Stable,
            ..Encounter::default()
        };
        enc.vitals.blood_pressure = "130/85".to_string();

        write_encounter_json(&path, &enc).unwrap();
        let back = read_encounter_json(&path).unwrap();
        assert_eq!(back, enc);
    }

    #[test]
    fn missing_file_is_invalid_input() {
        let err = read_encounter_json(Path::new("/nonexistent/encounter.json")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }
}
