use chrono::Local;
use serde::{Deserialize, Serialize};

/// Opaque handle to an uploaded document. The system never inspects the
/// file contents, only keeps the name the applicant supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub file_name: String,
}

impl DocumentRef {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

/// The single mutable application record. Lives for one program run; fields
/// are only ever overwritten through [`RecordPatch`], never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub owner_name: String,
    pub owner_email: String,
    pub contact_number: String,
    pub birthdate: String,
    pub transaction_type: String,
    pub date_of_application: String,
    pub sss_number: String,
    pub tin_number: String,
    pub dti_number: String,
    pub date_of_issue: String,
    pub block_number: String,
    pub lot_number: String,
    pub street: String,
    pub subdivision: String,
    pub barangay: String,
    pub zip_code: String,
    pub business_document: Option<DocumentRef>,
    pub id_document: Option<DocumentRef>,
    pub selfie_document: Option<DocumentRef>,
    pub consent_agreed: bool,
}

impl Default for ApplicationRecord {
    fn default() -> Self {
        Self {
            owner_name: String::new(),
            owner_email: String::new(),
            contact_number: String::new(),
            birthdate: String::new(),
            transaction_type: "NEW".to_string(),
            date_of_application: Local::now().format("%Y-%m-%d").to_string(),
            sss_number: String::new(),
            tin_number: String::new(),
            dti_number: String::new(),
            date_of_issue: String::new(),
            block_number: String::new(),
            lot_number: String::new(),
            street: String::new(),
            subdivision: String::new(),
            barangay: String::new(),
            zip_code: String::new(),
            business_document: None,
            id_document: None,
            selfie_document: None,
            consent_agreed: false,
        }
    }
}

impl ApplicationRecord {
    /// Shallow-merges the patch into the record. Only fields the patch sets
    /// are touched; everything else keeps its prior value. Never fails.
    pub fn apply(&mut self, patch: RecordPatch) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(value) = patch.$field {
                    self.$field = value;
                })*
            };
        }
        merge!(
            owner_name,
            owner_email,
            contact_number,
            birthdate,
            transaction_type,
            date_of_application,
            sss_number,
            tin_number,
            dti_number,
            date_of_issue,
            block_number,
            lot_number,
            street,
            subdivision,
            barangay,
            zip_code,
            business_document,
            id_document,
            selfie_document,
            consent_agreed
        );
    }

    /// Current display value of a field: the text itself, or the attached
    /// document's file name (empty when absent).
    pub fn field_value(&self, field: FieldId) -> String {
        match field {
            FieldId::OwnerName => self.owner_name.clone(),
            FieldId::OwnerEmail => self.owner_email.clone(),
            FieldId::ContactNumber => self.contact_number.clone(),
            FieldId::Birthdate => self.birthdate.clone(),
            FieldId::TransactionType => self.transaction_type.clone(),
            FieldId::DateOfApplication => self.date_of_application.clone(),
            FieldId::SssNumber => self.sss_number.clone(),
            FieldId::TinNumber => self.tin_number.clone(),
            FieldId::DtiNumber => self.dti_number.clone(),
            FieldId::DateOfIssue => self.date_of_issue.clone(),
            FieldId::BlockNumber => self.block_number.clone(),
            FieldId::LotNumber => self.lot_number.clone(),
            FieldId::Street => self.street.clone(),
            FieldId::Subdivision => self.subdivision.clone(),
            FieldId::Barangay => self.barangay.clone(),
            FieldId::ZipCode => self.zip_code.clone(),
            FieldId::BusinessDocument => self
                .business_document
                .as_ref()
                .map(|d| d.file_name.clone())
                .unwrap_or_default(),
            FieldId::IdDocument => self
                .id_document
                .as_ref()
                .map(|d| d.file_name.clone())
                .unwrap_or_default(),
            FieldId::SelfieDocument => self
                .selfie_document
                .as_ref()
                .map(|d| d.file_name.clone())
                .unwrap_or_default(),
        }
    }
}

/// All-optional mirror of [`ApplicationRecord`] used for merge updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub contact_number: Option<String>,
    pub birthdate: Option<String>,
    pub transaction_type: Option<String>,
    pub date_of_application: Option<String>,
    pub sss_number: Option<String>,
    pub tin_number: Option<String>,
    pub dti_number: Option<String>,
    pub date_of_issue: Option<String>,
    pub block_number: Option<String>,
    pub lot_number: Option<String>,
    pub street: Option<String>,
    pub subdivision: Option<String>,
    pub barangay: Option<String>,
    pub zip_code: Option<String>,
    pub business_document: Option<Option<DocumentRef>>,
    pub id_document: Option<Option<DocumentRef>>,
    pub selfie_document: Option<Option<DocumentRef>>,
    pub consent_agreed: Option<bool>,
}

impl RecordPatch {
    /// Patch setting a single field from raw user input. For document
    /// fields an empty input overwrites the reference with "absent".
    pub fn single(field: FieldId, raw: &str) -> Self {
        let mut patch = Self::default();
        let text = || Some(raw.to_string());
        let doc = || {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Some(None)
            } else {
                Some(Some(DocumentRef::new(trimmed)))
            }
        };
        match field {
            FieldId::OwnerName => patch.owner_name = text(),
            FieldId::OwnerEmail => patch.owner_email = text(),
            FieldId::ContactNumber => patch.contact_number = text(),
            FieldId::Birthdate => patch.birthdate = text(),
            FieldId::TransactionType => patch.transaction_type = text(),
            FieldId::DateOfApplication => patch.date_of_application = text(),
            FieldId::SssNumber => patch.sss_number = text(),
            FieldId::TinNumber => patch.tin_number = text(),
            FieldId::DtiNumber => patch.dti_number = text(),
            FieldId::DateOfIssue => patch.date_of_issue = text(),
            FieldId::BlockNumber => patch.block_number = text(),
            FieldId::LotNumber => patch.lot_number = text(),
            FieldId::Street => patch.street = text(),
            FieldId::Subdivision => patch.subdivision = text(),
            FieldId::Barangay => patch.barangay = text(),
            FieldId::ZipCode => patch.zip_code = text(),
            FieldId::BusinessDocument => patch.business_document = doc(),
            FieldId::IdDocument => patch.id_document = doc(),
            FieldId::SelfieDocument => patch.selfie_document = doc(),
        }
        patch
    }

    pub fn consent(agreed: bool) -> Self {
        Self {
            consent_agreed: Some(agreed),
            ..Self::default()
        }
    }
}

/// Identity of every editable form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    OwnerName,
    OwnerEmail,
    ContactNumber,
    Birthdate,
    TransactionType,
    DateOfApplication,
    SssNumber,
    TinNumber,
    DtiNumber,
    DateOfIssue,
    BlockNumber,
    LotNumber,
    Street,
    Subdivision,
    Barangay,
    ZipCode,
    BusinessDocument,
    IdDocument,
    SelfieDocument,
}

impl FieldId {
    pub fn all() -> [FieldId; 19] {
        [
            FieldId::OwnerName,
            FieldId::OwnerEmail,
            FieldId::ContactNumber,
            FieldId::Birthdate,
            FieldId::TransactionType,
            FieldId::DateOfApplication,
            FieldId::SssNumber,
            FieldId::TinNumber,
            FieldId::DtiNumber,
            FieldId::DateOfIssue,
            FieldId::BlockNumber,
            FieldId::LotNumber,
            FieldId::Street,
            FieldId::Subdivision,
            FieldId::Barangay,
            FieldId::ZipCode,
            FieldId::BusinessDocument,
            FieldId::IdDocument,
            FieldId::SelfieDocument,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldId::OwnerName => "Name of Business Owner",
            FieldId::OwnerEmail => "Email Address",
            FieldId::ContactNumber => "Contact Number",
            FieldId::Birthdate => "Birthdate",
            FieldId::TransactionType => "Transaction Type",
            FieldId::DateOfApplication => "Date of Application",
            FieldId::SssNumber => "SSS No.",
            FieldId::TinNumber => "Tax Identification No. (TIN)",
            FieldId::DtiNumber => "DTI / SEC / CDC Registration No.",
            FieldId::DateOfIssue => "Date of Issue",
            FieldId::BlockNumber => "Block Number",
            FieldId::LotNumber => "Lot Number",
            FieldId::Street => "Street / Road",
            FieldId::Subdivision => "Subdivision",
            FieldId::Barangay => "Barangay",
            FieldId::ZipCode => "Zip Code",
            FieldId::BusinessDocument => "Business Document",
            FieldId::IdDocument => "Government ID",
            FieldId::SelfieDocument => "Selfie Photo",
        }
    }

    /// Block, lot and subdivision are the only optional inputs; everything
    /// else blocks step submission while empty. Any non-empty string passes.
    pub fn is_required(self) -> bool {
        !matches!(
            self,
            FieldId::BlockNumber | FieldId::LotNumber | FieldId::Subdivision
        )
    }
}

/// Fixed fees shown on the mock payment step, in Philippine pesos.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    pub permit_fee: f64,
    pub processing_fee: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            permit_fee: 1500.00,
            processing_fee: 100.00,
        }
    }
}

impl FeeSchedule {
    pub fn total(&self) -> f64 {
        self.permit_fee + self.processing_fee
    }
}

/// Snapshot of a submitted application, exportable as JSON or CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub application_number: String,
    pub submitted_at: String,
    pub application: ApplicationRecord,
}

impl SubmissionReceipt {
    pub fn new(application_number: impl Into<String>, record: &ApplicationRecord) -> Self {
        Self {
            application_number: application_number.into(),
            submitted_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            application: record.clone(),
        }
    }

    /// Flat field/value rows for tabular export.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Application Number", self.application_number.clone()),
            ("Submitted At", self.submitted_at.clone()),
        ];
        for field in FieldId::all() {
            rows.push((field.label(), self.application.field_value(field)));
        }
        rows.push((
            "Consent Agreed",
            if self.application.consent_agreed {
                "yes".to_string()
            } else {
                "no".to_string()
            },
        ));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record() {
        let record = ApplicationRecord::default();
        assert_eq!(record.transaction_type, "NEW");
        assert_eq!(record.date_of_application.len(), 10); // YYYY-MM-DD
        assert!(record.owner_name.is_empty());
        assert!(record.business_document.is_none());
        assert!(!record.consent_agreed);
    }

    #[test]
    fn test_apply_merges_only_set_fields() {
        let mut record = ApplicationRecord::default();
        record.apply(RecordPatch::single(FieldId::OwnerName, "Juan Dela Cruz"));

        assert_eq!(record.owner_name, "Juan Dela Cruz");
        assert_eq!(record.transaction_type, "NEW"); // untouched
        assert!(record.owner_email.is_empty());
        assert!(!record.date_of_application.is_empty());
    }

    #[test]
    fn test_apply_overwrites_without_clearing_others() {
        let mut record = ApplicationRecord::default();
        record.apply(RecordPatch::single(FieldId::Street, "Mabini St"));
        record.apply(RecordPatch::single(FieldId::Barangay, "San Agustin"));
        record.apply(RecordPatch::single(FieldId::Street, "Rizal Ave"));

        assert_eq!(record.street, "Rizal Ave");
        assert_eq!(record.barangay, "San Agustin");
    }

    #[test]
    fn test_document_patch_sets_and_clears() {
        let mut record = ApplicationRecord::default();
        record.apply(RecordPatch::single(FieldId::IdDocument, "passport.jpg"));
        assert_eq!(
            record.id_document,
            Some(DocumentRef::new("passport.jpg"))
        );
        assert_eq!(record.field_value(FieldId::IdDocument), "passport.jpg");

        record.apply(RecordPatch::single(FieldId::IdDocument, "   "));
        assert!(record.id_document.is_none());
        assert!(record.field_value(FieldId::IdDocument).is_empty());
    }

    #[test]
    fn test_consent_patch() {
        let mut record = ApplicationRecord::default();
        record.apply(RecordPatch::consent(true));
        assert!(record.consent_agreed);
        record.apply(RecordPatch::single(FieldId::OwnerName, "Ana"));
        assert!(record.consent_agreed); // unrelated patch leaves it alone
    }

    #[test]
    fn test_required_fields() {
        assert!(FieldId::Street.is_required());
        assert!(FieldId::Barangay.is_required());
        assert!(FieldId::ZipCode.is_required());
        assert!(FieldId::BusinessDocument.is_required());
        assert!(!FieldId::BlockNumber.is_required());
        assert!(!FieldId::LotNumber.is_required());
        assert!(!FieldId::Subdivision.is_required());
    }

    #[test]
    fn test_fee_schedule_total() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.permit_fee, 1500.00);
        assert_eq!(fees.processing_fee, 100.00);
        assert_eq!(fees.total(), 1600.00);
    }

    #[test]
    fn test_receipt_rows() {
        let mut record = ApplicationRecord::default();
        record.apply(RecordPatch::single(FieldId::OwnerName, "Juan Dela Cruz"));
        record.apply(RecordPatch::consent(true));

        let receipt = SubmissionReceipt::new("BP-12345678", &record);
        let rows = receipt.rows();

        assert_eq!(rows[0], ("Application Number", "BP-12345678".to_string()));
        assert!(rows
            .iter()
            .any(|(label, value)| *label == "Name of Business Owner" && value == "Juan Dela Cruz"));
        assert_eq!(rows.last().unwrap().1, "yes");
    }

    #[test]
    fn test_receipt_round_trips_through_json() {
        let record = ApplicationRecord::default();
        let receipt = SubmissionReceipt::new("BP-00000001", &record);
        let json = serde_json::to_string(&receipt).unwrap();
        let back: SubmissionReceipt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, receipt);
    }
}
