use thiserror::Error;

/// Parse-level input errors. These are detected before any remote call
/// is issued; no partial work is attempted after one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("malformed port pair '{value}': {reason}")]
    MalformedPortPair { value: String, reason: String },

    #[error("invalid IPv4 address: {value}")]
    InvalidIpv4 { value: String },
}
