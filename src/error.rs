//! Error taxonomy for calls made against the remote catalog and player servers.

use thiserror::Error;

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Failure of a single collaborator call.
///
/// Every variant carries the endpoint path (`/search`, `/playlist/state`, ...)
/// so log lines point at the request that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("{endpoint} request failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("{endpoint} response decode failed: {message}")]
    Decode { endpoint: String, message: String },
}

impl BackendError {
    pub fn decode(endpoint: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }

    /// Maps a `ureq` call error onto the taxonomy.
    pub fn from_ureq(endpoint: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => Self::Status {
                endpoint: endpoint.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => Self::Transport {
                endpoint: endpoint.to_string(),
                message: transport.to_string(),
            },
        }
    }
}
