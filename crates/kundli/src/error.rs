//! Error taxonomy shared by every stage of the chart and prediction pipeline.

use thiserror::Error;

/// Errors that can occur while building charts, periods and predictions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KundliError {
    /// Malformed or out-of-range birth data. The caller should correct and resubmit.
    #[error("Invalid input: {0}")]
    Input(String),
    /// An external collaborator (ephemeris, geocoder) failed or timed out.
    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable { service: String, message: String },
    /// Internally inconsistent intermediate data. Usually logged and absorbed.
    #[error("Computation inconsistency: {0}")]
    ComputationInconsistency(String),
    /// Rule or settings material could not be loaded.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl KundliError {
    pub fn input(message: impl Into<String>) -> Self {
        KundliError::Input(message.into())
    }

    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        KundliError::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Only collaborator failures are worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, KundliError::UpstreamUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, KundliError>;
