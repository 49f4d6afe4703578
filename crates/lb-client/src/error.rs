use thiserror::Error;

/// Errors surfaced by the remote controller client.
#[derive(Debug, Error)]
pub enum NetworkApiError {
    /// The controller answered with an application error; code and
    /// description pass through verbatim. Never retried locally.
    #[error("controller error {code}: {description}")]
    ErrorCode { code: i32, description: String },

    #[error("controller API error: {message}")]
    Api { message: String },

    #[error("network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}
