//! Purpose: Explicit UI state for the ask/answer loop and its event transitions.
//! Exports: `Session`, `SessionEvent`, `Phase`.
//! Role: Owns question text, last result, and last error; renderer stays stateless.
//! Invariants: The error is cleared when a submit starts.
//! Invariants: A failed submit keeps the previously displayed result (last write wins).
use crate::core::error::Error;
use crate::core::value::Fields;
use crate::render::{DisplayNode, present};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    DisplayingResult,
    DisplayingError,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    QuestionEdited(String),
    SubmitStarted,
    SubmitSucceeded(Fields),
    SubmitFailed(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    question: String,
    result: Option<Fields>,
    error: Option<String>,
    phase: Phase,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn result(&self) -> Option<&Fields> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn apply(self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::QuestionEdited(question) => Self { question, ..self },
            SessionEvent::SubmitStarted => Self {
                error: None,
                phase: Phase::Submitting,
                ..self
            },
            SessionEvent::SubmitSucceeded(fields) => Self {
                result: Some(fields),
                phase: Phase::DisplayingResult,
                ..self
            },
            SessionEvent::SubmitFailed(message) => Self {
                error: Some(message),
                phase: Phase::DisplayingError,
                ..self
            },
        }
    }

    /// Runs one submit cycle with `ask` as the request collaborator.
    pub fn submit<F>(self, ask: F) -> Self
    where
        F: FnOnce(&str) -> Result<Fields, Error>,
    {
        let session = self.apply(SessionEvent::SubmitStarted);
        let outcome = ask(&session.question);
        match outcome {
            Ok(fields) => session.apply(SessionEvent::SubmitSucceeded(fields)),
            Err(err) => {
                tracing::debug!(kind = ?err.kind(), "submit failed");
                session.apply(SessionEvent::SubmitFailed(err.display_message()))
            }
        }
    }

    pub fn view(&self) -> DisplayNode {
        let mut blocks = Vec::new();
        if let Some(error) = &self.error {
            blocks.push(DisplayNode::Error(error.clone()));
        }
        if let Some(result) = &self.result {
            blocks.push(present(result));
        }
        match blocks.len() {
            0 => DisplayNode::Empty,
            1 => blocks.remove(0),
            _ => DisplayNode::Group(blocks),
        }
    }
}
