use crate::error::OutputError;
use crate::processor::ResultTable;
use std::path::Path;
use tracing::info;

/// Input columns, in order, as they appear in the inventory.
pub const INPUT_COLUMNS: [&str; 7] = [
    "Risk",
    "Risk Description",
    "Control",
    "Control Description",
    "Automation",
    "Detective/ Preventive",
    "Operation Frequency",
];

/// Output columns, in order, matching `RecordOutcome::output_fields`.
/// This set is fixed; it never varies by record content.
pub const OUTPUT_COLUMNS: [&str; 16] = [
    "Has the control been formally documented? (When, Why, Who, What, Where and How)",
    "Suggestions",
    "Control objective: Is the control designed able to mitigate the risk ?",
    "Control objective: Explanation",
    "Is the control execution appropriate for the risk being addressed?",
    "Execution appropriateness: Explanation",
    "Is the control type adequate for the risk it addresses",
    "Type adequacy: Explanation",
    "Is the control frequency appropriate for the associated risk?",
    "Frequency appropriateness: Explanation",
    "System/data dependencies: Are the systems/data sources used reliable and secure?",
    "Segregation of duties: Does the control avoid end-to-end single-owner responsibility?",
    "Segregation of duties: Explanation",
    "Overall Rating",
    "Overall Rating: Explanation",
    "Potential Evidences Expected Based on Control Description",
];

/// Render the result table to CSV: input columns first, then the fixed
/// output columns. Rich spreadsheet styling is a downstream concern.
pub fn write_result_table(path: &Path, table: &ResultTable) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(OutputError::CreateDir)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;

    let header: Vec<&str> = INPUT_COLUMNS
        .iter()
        .chain(OUTPUT_COLUMNS.iter())
        .copied()
        .collect();
    writer.write_record(&header)?;

    for outcome in table {
        let r = &outcome.record;
        let input = [
            r.risk.as_str(),
            r.risk_description.as_str(),
            r.control.as_str(),
            r.control_description.as_str(),
            r.automation.as_str(),
            r.control_type.as_str(),
            r.frequency.as_str(),
        ];
        let row: Vec<&str> = input
            .iter()
            .chain(outcome.output_fields().iter())
            .copied()
            .collect();
        writer.write_record(&row)?;
    }

    writer.flush()?;
    info!("Wrote {} result rows to {}", table.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PROCESSING_ERROR;
    use crate::loader::ControlRecord;
    use crate::processor::RecordOutcome;

    fn sample_record() -> ControlRecord {
        ControlRecord {
            risk: "R1".to_string(),
            risk_description: "Reports may go unreviewed".to_string(),
            control: "C1".to_string(),
            control_description: "Manager reviews reports".to_string(),
            automation: "Manual".to_string(),
            control_type: "Detective".to_string(),
            frequency: "Monthly".to_string(),
        }
    }

    #[test]
    fn test_header_and_row_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = vec![RecordOutcome::failed(sample_record(), PROCESSING_ERROR)];

        write_result_table(&path, &table).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header = reader.headers().unwrap().clone();
        assert_eq!(header.len(), 23);
        assert_eq!(&header[0], "Risk");
        assert_eq!(&header[7], OUTPUT_COLUMNS[0]);
        assert_eq!(&header[22], OUTPUT_COLUMNS[15]);

        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][2], "C1");
        // Every output cell carries the marker, never an absent field
        for i in 7..23 {
            assert_eq!(&rows[0][i], PROCESSING_ERROR);
        }
    }

    #[test]
    fn test_empty_table_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_result_table(&path, &Vec::new()).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap().len(), 23);
        assert_eq!(reader.records().count(), 0);
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/reports/out.csv");

        write_result_table(&path, &Vec::new()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_multiline_cells_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut outcome = RecordOutcome::failed(sample_record(), PROCESSING_ERROR);
        outcome.documentation = "Present:\n• Who: manager\n\nMissing:\n• When: none".to_string();
        write_result_table(&path, &vec![outcome]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert!(rows[0][7].contains("• Who: manager"));
        assert!(rows[0][7].contains('\n'));
    }
}
