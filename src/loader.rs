use crate::error::LoaderError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One row of the control inventory. Field names match the original
/// spreadsheet headers; immutable once loaded.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ControlRecord {
    #[serde(rename = "Risk")]
    pub risk: String,

    #[serde(rename = "Risk Description")]
    pub risk_description: String,

    #[serde(rename = "Control")]
    pub control: String,

    #[serde(rename = "Control Description")]
    pub control_description: String,

    /// Manual, Automated, or Semi-Auto
    #[serde(rename = "Automation")]
    pub automation: String,

    /// Detective or Preventive
    #[serde(rename = "Detective/ Preventive")]
    pub control_type: String,

    #[serde(rename = "Operation Frequency")]
    pub frequency: String,
}

/// Load the control inventory and check every required field is populated.
/// Downstream code relies on this and does not re-validate.
pub fn load_records(path: &Path) -> Result<Vec<ControlRecord>, LoaderError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| LoaderError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<ControlRecord>().enumerate() {
        // Header is row 1; data starts at row 2
        let row_number = idx + 2;
        let record = row.map_err(|e| LoaderError::ParseRow {
            row: row_number,
            source: e,
        })?;
        validate_record(&record, row_number)?;
        records.push(record);
    }

    info!("Loaded {} controls from {}", records.len(), path.display());
    Ok(records)
}

fn validate_record(record: &ControlRecord, row: usize) -> Result<(), LoaderError> {
    let required: [(&'static str, &str); 7] = [
        ("Risk", &record.risk),
        ("Risk Description", &record.risk_description),
        ("Control", &record.control),
        ("Control Description", &record.control_description),
        ("Automation", &record.automation),
        ("Detective/ Preventive", &record.control_type),
        ("Operation Frequency", &record.frequency),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(LoaderError::EmptyField { row, field });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Risk,Risk Description,Control,Control Description,Automation,Detective/ Preventive,Operation Frequency";

    fn write_csv(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    #[test]
    fn test_load_valid_rows() {
        let file = write_csv(&[
            "R1,Fraud risk,C1,Manager reviews reports,Manual,Detective,Monthly",
            "R2,Access risk,C2,System locks stale accounts,Automated,Preventive,Daily",
        ]);

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].control, "C1");
        assert_eq!(records[1].automation, "Automated");
    }

    #[test]
    fn test_empty_field_rejected() {
        let file = write_csv(&["R1,Fraud risk,C1,,Manual,Detective,Monthly"]);

        let err = load_records(file.path()).unwrap_err();
        match err {
            LoaderError::EmptyField { row, field } => {
                assert_eq!(row, 2);
                assert_eq!(field, "Control Description");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_column_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Risk,Control").unwrap();
        writeln!(file, "R1,C1").unwrap();

        assert!(load_records(file.path()).is_err());
    }

    #[test]
    fn test_empty_inventory() {
        let file = write_csv(&[]);
        let records = load_records(file.path()).unwrap();
        assert!(records.is_empty());
    }
}
