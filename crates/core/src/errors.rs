use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid option `{option}`: {reason}")]
    InvalidOption { option: &'static str, reason: String },
}

impl DomainError {
    pub fn invalid_option(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption { option, reason: reason.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("input failure: {0}")]
    Input(String),
}

impl ApplicationError {
    /// Stable tag used by operator surfaces to classify failures.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::InvalidOption { .. }) => "invalid_option",
            Self::Configuration(_) => "config_validation",
            Self::Input(_) => "invalid_input",
        }
    }
}
