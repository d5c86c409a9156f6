use thiserror::Error;

/// Errors raised by the scoring engine.
///
/// `Configuration` is raised when a `JobProfile`, `ScoringConfig` or policy value
/// is built, never while scoring. `InvalidInput` aborts a single scoring call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ScoringError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        ScoringError::Configuration(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ScoringError::InvalidInput(msg.into())
    }

    /// Stable machine-readable code, shared by the HTTP layer and batch reports.
    pub fn code(&self) -> &'static str {
        match self {
            ScoringError::Configuration(_) => "CONFIGURATION_ERROR",
            ScoringError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}
