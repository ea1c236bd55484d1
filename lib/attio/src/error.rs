use thiserror::Error;

/// Failure talking to the CRM.
///
/// `Api` carries Attio's own HTTP status so the boundary layer can pass
/// it through where the endpoint contract calls for that.
#[derive(Debug, Error)]
pub enum AttioError {
    /// Request never completed (DNS, connect, timeout, ...).
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    /// Attio answered with a non-success status.
    #[error("attio returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("decode: {0}")]
    Decode(String),
}

impl AttioError {
    /// The upstream HTTP status, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AttioError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
