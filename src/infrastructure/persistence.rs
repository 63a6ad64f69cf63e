use crate::domain::SubmissionReceipt;
use std::fs;

pub struct ReceiptRepository;

impl ReceiptRepository {
    pub fn save_receipt(receipt: &SubmissionReceipt, filename: &str) -> Result<String, String> {
        match serde_json::to_string_pretty(receipt) {
            Ok(json) => match fs::write(filename, &json) {
                Ok(_) => Ok(filename.to_string()),
                Err(e) => Err(e.to_string()),
            },
            Err(e) => Err(format!("Serialization failed: {}", e)),
        }
    }
}

pub struct ReceiptCsvExporter;

impl ReceiptCsvExporter {
    pub fn export_to_csv(receipt: &SubmissionReceipt, filename: &str) -> Result<String, String> {
        let mut writer = csv::Writer::from_path(filename).map_err(|e| e.to_string())?;
        writer
            .write_record(["Field", "Value"])
            .map_err(|e| e.to_string())?;
        for (field, value) in receipt.rows() {
            writer
                .write_record([field, value.as_str()])
                .map_err(|e| e.to_string())?;
        }
        writer.flush().map_err(|e| e.to_string())?;
        Ok(filename.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApplicationRecord, FieldId, RecordPatch};

    fn sample_receipt() -> SubmissionReceipt {
        let mut record = ApplicationRecord::default();
        record.apply(RecordPatch::single(FieldId::OwnerName, "Juan Dela Cruz"));
        record.apply(RecordPatch::single(FieldId::BusinessDocument, "dti.pdf"));
        record.apply(RecordPatch::consent(true));
        SubmissionReceipt::new("BP-12345678", &record)
    }

    #[test]
    fn test_save_receipt_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.json");
        let path = path.to_str().unwrap();

        let receipt = sample_receipt();
        let saved = ReceiptRepository::save_receipt(&receipt, path).unwrap();
        assert_eq!(saved, path);

        let content = fs::read_to_string(path).unwrap();
        let loaded: SubmissionReceipt = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded, receipt);
    }

    #[test]
    fn test_save_receipt_bad_path_reports_error() {
        let receipt = sample_receipt();
        let result = ReceiptRepository::save_receipt(&receipt, "/nonexistent/dir/receipt.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_csv_export_contains_all_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.csv");
        let path = path.to_str().unwrap();

        let receipt = sample_receipt();
        ReceiptCsvExporter::export_to_csv(&receipt, path).unwrap();

        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Field,Value");
        // Header plus one line per receipt row.
        assert_eq!(lines.len(), receipt.rows().len() + 1);
        assert!(content.contains("Application Number,BP-12345678"));
        assert!(content.contains("Name of Business Owner,Juan Dela Cruz"));
    }
}
