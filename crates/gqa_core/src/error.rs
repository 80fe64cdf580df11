use serde::{Deserialize, Serialize};
use std::fmt;

/// Single structured error shape used across the pipeline layers and the CLI.
///
/// Error codes are namespaced by pipeline stage; the orchestrator's recovery
/// policy keys on the prefix (see the `is_*` helpers below).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl QaError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Retrieval-stage errors (including an unready index) are recovered by
    /// substituting an empty evidence bundle; the run continues.
    pub fn is_retrieval(&self) -> bool {
        self.code.starts_with("RETRIEVAL_") || self.code.starts_with("INDEX_")
    }

    /// Synthesis-stage errors abort the run.
    pub fn is_synthesis(&self) -> bool {
        self.code.starts_with("SYNTHESIS_")
    }

    /// Grading-stage errors abort the run.
    pub fn is_grading(&self) -> bool {
        self.code.starts_with("GRADING_")
    }
}

impl fmt::Display for QaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for QaError {}
