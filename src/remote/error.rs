use std::fmt;

/// Failure of a call to the remote record service.
///
/// The coordinator treats every variant the same way (notify, and roll back
/// for updates); the split exists for logging and for programmatic callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request did not complete (connection refused, reset, timed out).
    Transport(String),
    /// The service answered with a non-success status.
    Status { status: u16, message: String },
    /// The response body could not be decoded.
    Decode(String),
    /// The service refused the call without a status (in-process services).
    Unavailable(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Transport(msg) => write!(f, "transport error: {}", msg),
            RemoteError::Status { status, message } => {
                write!(f, "service returned status {}: {}", status, message)
            }
            RemoteError::Decode(msg) => write!(f, "decode error: {}", msg),
            RemoteError::Unavailable(msg) => write!(f, "service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            RemoteError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}
