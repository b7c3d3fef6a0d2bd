//! Consumer-side auto-fill state machine.
//!
//! Drives a form screen through idle → extracting → review →
//! submitted/error using the pipeline's result envelope. Extraction failure
//! never blocks the form: the error state still carries the (all-null)
//! record so the technician fills it in manually.

use crate::pipeline::types::PipelineResult;

/// Where the form screen currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum AutofillState {
    /// Nothing in flight; form is blank or untouched.
    Idle,
    /// An extraction request is in flight.
    Extracting,
    /// Extraction succeeded; fields are populated pending review.
    Review(PipelineResult),
    /// Extraction failed; envelope kept so the empty form still renders.
    Error(PipelineResult),
    /// The technician accepted and submitted the record.
    Submitted,
}

// The UI layer keys screens off the state name alone.
impl PartialEq<&str> for AutofillState {
    fn eq(&self, other: &&str) -> bool {
        self.name() == *other
    }
}

impl AutofillState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Review(_) => "review",
            Self::Error(_) => "error",
            Self::Submitted => "submitted",
        }
    }
}

/// One form screen's auto-fill lifecycle. Transitions that do not apply to
/// the current state are ignored — in particular, a result arriving after
/// cancellation is discarded without side effects.
#[derive(Debug)]
pub struct AutofillSession {
    state: AutofillState,
}

impl Default for AutofillSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AutofillSession {
    pub fn new() -> Self {
        Self {
            state: AutofillState::Idle,
        }
    }

    pub fn state(&self) -> &AutofillState {
        &self.state
    }

    /// The technician took a photo and extraction began.
    pub fn start_extraction(&mut self) {
        if matches!(self.state, AutofillState::Idle | AutofillState::Error(_)) {
            self.state = AutofillState::Extracting;
        }
    }

    /// The pipeline produced its envelope. Ignored unless an extraction is
    /// actually in flight (a cancelled request's result is stale).
    pub fn complete(&mut self, result: PipelineResult) {
        if self.state != AutofillState::Extracting {
            return;
        }
        self.state = if result.success {
            AutofillState::Review(result)
        } else {
            AutofillState::Error(result)
        };
    }

    /// Navigation-away while extracting: drop the in-flight result and
    /// return to idle. No partial writes exist to undo.
    pub fn cancel(&mut self) {
        if self.state == AutofillState::Extracting {
            self.state = AutofillState::Idle;
        }
    }

    /// The technician reviewed (or manually completed) the form and
    /// submitted it. Valid from review and from the manual-entry error path.
    pub fn submit(&mut self) {
        if matches!(self.state, AutofillState::Review(_) | AutofillState::Error(_)) {
            self.state = AutofillState::Submitted;
        }
    }

    /// Start over on a fresh form.
    pub fn reset(&mut self) {
        self.state = AutofillState::Idle;
    }
}
