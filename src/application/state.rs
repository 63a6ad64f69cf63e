//! Application state management for the permit wizard.
//!
//! This module owns the application record, the step sequencer, the
//! document verifier and all terminal UI state, and coordinates the
//! transitions between them.

use crate::domain::{
    ApplicationRecord, DocumentVerifier, DomainError, DomainResult, FieldId, RecordPatch,
    SimulatedVerifier, Step, StepSequencer, SubmissionReceipt, VerificationEvent,
    generate_application_number,
};
use chrono::Utc;
use std::time::Instant;

/// Represents the current mode of the application.
///
/// The mode determines how keyboard input is interpreted and which UI
/// elements are displayed.
#[derive(Debug)]
pub enum AppMode {
    /// Field navigation and step transitions
    Normal,
    /// User is typing into the focused form field
    Editing,
    /// Help screen is displayed
    Help,
    /// Filename prompt for saving the JSON receipt
    SaveReceipt,
    /// Filename prompt for the CSV receipt export
    ExportCsv,
}

/// Main application state: the form record, wizard position, verification
/// run and terminal UI bookkeeping.
///
/// # Examples
///
/// ```
/// use bpwiz::application::App;
///
/// let app = App::default();
/// assert_eq!(app.sequencer.current(), 1);
/// assert!(!app.submitted);
/// ```
pub struct App {
    /// The single mutable application record
    pub record: ApplicationRecord,
    /// Wizard position over steps 1..=5
    pub sequencer: StepSequencer,
    /// Active verification run; present only while the verification step
    /// is showing
    pub verifier: Option<Box<dyn DocumentVerifier>>,
    /// Terminal submitted flag, set exactly once by `finalize`
    pub submitted: bool,
    /// Generated application number, set together with `submitted`
    pub application_number: Option<String>,
    /// Current application mode
    pub mode: AppMode,
    /// Focused field index within the current step's field list
    pub field_focus: usize,
    /// Input buffer for field editing
    pub input: String,
    /// Cursor position within the active input buffer, in characters
    pub cursor_position: usize,
    /// Input buffer for filename entry
    pub filename_input: String,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Scroll position in help text
    pub help_scroll: usize,
}

impl Default for App {
    fn default() -> Self {
        Self {
            record: ApplicationRecord::default(),
            sequencer: StepSequencer::default(),
            verifier: None,
            submitted: false,
            application_number: None,
            mode: AppMode::Normal,
            field_focus: 0,
            input: String::new(),
            cursor_position: 0,
            filename_input: String::new(),
            status_message: None,
            help_scroll: 0,
        }
    }
}

impl App {
    /// The step currently showing.
    pub fn step(&self) -> Step {
        Step::from_number(self.sequencer.current()).unwrap_or(Step::BusinessDetails)
    }

    /// Merges a partial update into the record. This is the only mutation
    /// path for record data and it never fails.
    pub fn merge_update(&mut self, patch: RecordPatch) {
        self.record.apply(patch);
    }

    pub fn focused_field(&self) -> Option<FieldId> {
        self.step().fields().get(self.field_focus).copied()
    }

    pub fn focus_next_field(&mut self) {
        let count = self.step().fields().len();
        if count > 0 {
            self.field_focus = (self.field_focus + 1) % count;
        }
    }

    pub fn focus_prev_field(&mut self) {
        let count = self.step().fields().len();
        if count > 0 {
            self.field_focus = (self.field_focus + count - 1) % count;
        }
    }

    /// Switches to editing mode for the focused field, loading its current
    /// value into the input buffer with the cursor at the end.
    pub fn start_editing(&mut self) {
        let Some(field) = self.focused_field() else {
            return;
        };
        self.mode = AppMode::Editing;
        self.input = self.record.field_value(field);
        self.cursor_position = self.input.chars().count();
        self.status_message = None;
    }

    /// Commits the input buffer to the record via a merge update and
    /// returns to normal mode, moving focus to the next field.
    pub fn finish_editing(&mut self) {
        if let Some(field) = self.focused_field() {
            self.merge_update(RecordPatch::single(field, &self.input));
            let count = self.step().fields().len();
            if self.field_focus + 1 < count {
                self.field_focus += 1;
            }
        }
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    /// Cancels editing without touching the record.
    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    /// Submit-intent for the current step. Form steps check required
    /// fields (focus jumps to the first gap), the verification step is
    /// gated on the run having completed, and the consent step finalizes
    /// the application.
    pub fn submit_step(&mut self, now: Instant) {
        let step = self.step();
        match step {
            Step::BusinessDetails | Step::DocumentUpload => match step.validate(&self.record) {
                Ok(()) => self.go_forward(now),
                Err(err) => {
                    if let Some(field) = step.first_missing_required(&self.record) {
                        if let Some(pos) = step.fields().iter().position(|f| *f == field) {
                            self.field_focus = pos;
                        }
                    }
                    self.status_message = Some(err.to_string());
                }
            },
            Step::Verification => {
                if self.verification_complete() {
                    self.go_forward(now);
                } else {
                    self.status_message =
                        Some("Please wait for the document analysis to finish".to_string());
                }
            }
            Step::Payment => self.go_forward(now),
            Step::Consent => {
                if let Err(err) = self.finalize() {
                    self.status_message = Some(err.to_string());
                }
            }
        }
    }

    /// Back-navigation request. Refused while a verification run is in
    /// flight, matching the disabled Back control during analysis.
    pub fn retreat_step(&mut self, now: Instant) {
        if self.verification_in_progress() {
            self.status_message =
                Some("Analysis in progress - please wait before going back".to_string());
            return;
        }
        self.sequencer.retreat();
        self.enter_step(now);
    }

    /// Step-indicator jump: any step, forward or backward, without
    /// validation. An in-flight verification run is discarded.
    pub fn jump_to_step(&mut self, step: usize, now: Instant) {
        self.sequencer.jump_to(step);
        self.enter_step(now);
    }

    fn go_forward(&mut self, now: Instant) {
        self.sequencer.advance();
        self.enter_step(now);
    }

    /// Hook run on every step change. Entering the verification step
    /// starts a fresh run; leaving it drops the run, discarding any
    /// pending timers along with their output.
    fn enter_step(&mut self, now: Instant) {
        self.field_focus = 0;
        self.status_message = None;
        if self.step() == Step::Verification {
            self.begin_verification(Box::new(SimulatedVerifier::new()), now);
        } else {
            self.verifier = None;
        }
    }

    /// Starts a verification run with the given backend. Split out from
    /// `enter_step` so a different [`DocumentVerifier`] can be injected.
    pub fn begin_verification(&mut self, mut verifier: Box<dyn DocumentVerifier>, now: Instant) {
        verifier.start(now);
        self.verifier = Some(verifier);
        self.status_message = Some("AI document analysis started".to_string());
    }

    /// Advances the verification timer queue. Called from the event loop
    /// on every tick; a no-op unless a run is active.
    pub fn tick(&mut self, now: Instant) {
        let Some(verifier) = self.verifier.as_mut() else {
            return;
        };
        for event in verifier.poll(now) {
            match event {
                VerificationEvent::LaneAnalyzing(lane) => {
                    self.status_message = Some(format!("Analyzing {}...", lane.label()));
                }
                VerificationEvent::LaneResolved(lane, status) => {
                    self.status_message = Some(format!("{}: {}", lane.label(), status.label()));
                }
                VerificationEvent::Completed(report) => {
                    self.status_message = Some(format!(
                        "AI analysis complete - overall score {}%",
                        report.overall_score
                    ));
                }
            }
        }
    }

    /// Whether the Continue control on the verification step is enabled.
    /// Gated solely on completion; lane failures never block progression.
    pub fn verification_complete(&self) -> bool {
        self.verifier.as_ref().is_some_and(|v| v.is_complete())
    }

    pub fn verification_in_progress(&self) -> bool {
        self.verifier.as_ref().is_some_and(|v| !v.is_complete())
    }

    /// Finalizes the application: requires consent, generates the
    /// application number from the current timestamp and enters the
    /// terminal submitted state. The success view is a dead end; starting
    /// over requires a program restart.
    pub fn finalize(&mut self) -> DomainResult<()> {
        self.finalize_at(Utc::now().timestamp_millis())
    }

    pub fn finalize_at(&mut self, timestamp_millis: i64) -> DomainResult<()> {
        if !self.record.consent_agreed {
            return Err(DomainError::ConsentRequired);
        }
        self.application_number = Some(generate_application_number(timestamp_millis));
        self.submitted = true;
        self.status_message = None;
        Ok(())
    }

    pub fn toggle_consent(&mut self) {
        let agreed = !self.record.consent_agreed;
        self.merge_update(RecordPatch::consent(agreed));
    }

    /// Receipt snapshot of the submitted application, if any.
    pub fn receipt(&self) -> Option<SubmissionReceipt> {
        self.application_number
            .as_ref()
            .map(|number| SubmissionReceipt::new(number.clone(), &self.record))
    }

    /// Switches to the receipt-save prompt. Only reachable from the
    /// success view.
    pub fn start_save_receipt(&mut self) {
        if !self.submitted {
            return;
        }
        self.mode = AppMode::SaveReceipt;
        self.filename_input = "permit-receipt.json".to_string();
        self.cursor_position = self.filename_input.chars().count();
        self.status_message = None;
    }

    pub fn start_csv_export(&mut self) {
        if !self.submitted {
            return;
        }
        self.mode = AppMode::ExportCsv;
        self.filename_input = "permit-receipt.csv".to_string();
        self.cursor_position = self.filename_input.chars().count();
        self.status_message = None;
    }

    pub fn get_receipt_filename(&self) -> String {
        if self.filename_input.is_empty() {
            "permit-receipt.json".to_string()
        } else {
            self.filename_input.clone()
        }
    }

    pub fn get_csv_export_filename(&self) -> String {
        if self.filename_input.is_empty() {
            "permit-receipt.csv".to_string()
        } else {
            self.filename_input.clone()
        }
    }

    /// Processes the result of a receipt save or export operation.
    pub fn set_export_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Saved to {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Save failed: {}", error));
            }
        }
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }
}
