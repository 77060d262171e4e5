// Error Taxonomy
// Caller-correctable input errors, collaborator bootstrap errors, and opaque processing faults

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Input text cannot be empty")]
    TextTooShort { min: usize },
    #[error("Input text exceeds maximum length of {max} characters")]
    TextTooLong { max: usize, actual: usize },
    #[error("Invalid optimization level: {0}")]
    InvalidOptimizationLevel(String),
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("Style guide type must be specified")]
    MissingStyleGuide,
    #[error("Invalid style guide type: {0}")]
    InvalidStyleGuide(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Required language model '{0}' not found")]
    ModelNotFound(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("{0}")]
    Processing(String),
}

impl AnalysisError {
    /// True for faults that are neither input nor engine errors.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Processing(_))
    }

    pub fn processing(context: &str, cause: impl std::fmt::Display) -> Self {
        Self::Processing(format!("{}: {}", context, cause))
    }
}
