//! Linear wizard state machine.
//!
//! Steps are numbered 1..=N. Forward and backward transitions saturate at
//! the ends instead of failing, and the step indicator may jump anywhere,
//! including forward past unvisited steps.

use super::errors::{DomainError, DomainResult};
use super::models::{ApplicationRecord, FieldId};

/// The canonical wizard sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    BusinessDetails,
    DocumentUpload,
    Verification,
    Payment,
    Consent,
}

impl Step {
    pub const COUNT: usize = 5;

    pub fn all() -> [Step; Step::COUNT] {
        [
            Step::BusinessDetails,
            Step::DocumentUpload,
            Step::Verification,
            Step::Payment,
            Step::Consent,
        ]
    }

    /// One-based step number, matching the indicator display.
    pub fn number(self) -> usize {
        match self {
            Step::BusinessDetails => 1,
            Step::DocumentUpload => 2,
            Step::Verification => 3,
            Step::Payment => 4,
            Step::Consent => 5,
        }
    }

    pub fn from_number(number: usize) -> Option<Step> {
        Step::all().into_iter().find(|s| s.number() == number)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::BusinessDetails => "Business Details",
            Step::DocumentUpload => "Document Upload",
            Step::Verification => "Verification",
            Step::Payment => "Payment",
            Step::Consent => "Consent",
        }
    }

    /// Editable fields shown on this step, in focus order.
    pub fn fields(self) -> &'static [FieldId] {
        match self {
            Step::BusinessDetails => &[
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
            ],
            Step::DocumentUpload => &[
                FieldId::BusinessDocument,
                FieldId::IdDocument,
                FieldId::SelfieDocument,
            ],
            Step::Verification | Step::Payment | Step::Consent => &[],
        }
    }

    /// Required-field check performed on submit-intent. Any non-empty value
    /// passes; there is no format validation.
    pub fn validate(self, record: &ApplicationRecord) -> DomainResult<()> {
        match self.first_missing_required(record) {
            Some(field) => Err(DomainError::MissingRequiredField(field.label().to_string())),
            None => Ok(()),
        }
    }

    pub fn first_missing_required(self, record: &ApplicationRecord) -> Option<FieldId> {
        self.fields()
            .iter()
            .copied()
            .find(|field| field.is_required() && record.field_value(*field).trim().is_empty())
    }
}

/// Finite, linear sequencer over steps 1..=len. All transition requests
/// succeed; out-of-range requests are clamped, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSequencer {
    current: usize,
    len: usize,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new(Step::COUNT)
    }
}

impl StepSequencer {
    pub fn new(len: usize) -> Self {
        Self {
            current: 1,
            len: len.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_first(&self) -> bool {
        self.current == 1
    }

    pub fn is_last(&self) -> bool {
        self.current == self.len
    }

    /// Move forward one step; no-op at the last step.
    pub fn advance(&mut self) {
        if self.current < self.len {
            self.current += 1;
        }
    }

    /// Move back one step; no-op at the first step.
    pub fn retreat(&mut self) {
        if self.current > 1 {
            self.current -= 1;
        }
    }

    /// Direct jump to any step, forward or backward, without validation.
    pub fn jump_to(&mut self, step: usize) {
        self.current = step.clamp(1, self.len);
    }
}
