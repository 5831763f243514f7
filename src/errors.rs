use num_dual::LinAlgErr;
use thiserror::Error;

/// Error type for invalid phase states and failed kinetics updates.
#[derive(Error, Debug)]
pub enum GasError {
    #[error("`{0}` was called before the phase was fully initialized.")]
    NotReady(String),
    #[error("Reaction {0}: {1}.")]
    InvalidKind(usize, String),
    #[error("Reaction `{0}`: third-body efficiency refers to undeclared species `{1}`.")]
    UndeclaredSpecies(String, String),
    #[error("Non-finite value in `{0}` at index {1}.")]
    NonFinite(String, usize),
    #[error("`{0}` is not defined for this parameterization.")]
    Unsupported(String),
    #[error(transparent)]
    LinAlgError(#[from] LinAlgErr),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Convenience type for `Result<T, GasError>`.
pub type GasResult<T> = Result<T, GasError>;
