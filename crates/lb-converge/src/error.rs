use netlb_client::NetworkApiError;
use netlb_shared_types::SpecError;
use thiserror::Error;

/// Engine-level failures. These are converted to `Answer` values at
/// the command boundary and never propagate past it.
#[derive(Debug, Error)]
pub enum ConvergeError {
    #[error(transparent)]
    Remote(#[from] NetworkApiError),

    /// Equipment or IP resolution failed. Fatal for the real being
    /// processed; fatal for the whole converge only at VIP level.
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error(transparent)]
    MalformedInput(#[from] SpecError),

    #[error("precondition violated: {message}")]
    Precondition { message: String },
}
