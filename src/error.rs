use std::io;
use thiserror::Error;

/// Fatal errors from design or simulation setup.
///
/// These abort the current call before any trajectory is produced, in
/// contrast to [`IntegrationError`] which is absorbed per step by the
/// simulation engine.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Riccati solve failed: {0}")]
    RiccatiSolve(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_yaml::Error),
}

impl SimError {
    /// Stable identifier used by the wire layer's error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            SimError::InvalidParameter(_) => "invalid_parameter",
            SimError::RiccatiSolve(_) => "riccati_solve_failure",
            SimError::Io(_) => "io_error",
            SimError::SerializationError(_) => "serialization_error",
        }
    }
}

/// Recoverable per-step failures of the adaptive integrator.
///
/// The simulation engine reports these through its observer and falls back
/// to one explicit-Euler step of the linear model; a run never aborts
/// because of them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("Step size underflow at t = {t}")]
    StepSizeUnderflow { t: f64 },

    #[error("Step budget exhausted at t = {t}")]
    MaxStepsExceeded { t: f64 },

    #[error("Non-finite state encountered at t = {t}")]
    NonFinite { t: f64 },
}
