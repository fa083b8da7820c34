use thiserror::Error;

/// Failures surfaced by a single remote call against a git-hosting or
/// code-review instance (§4.A, §7).
///
/// `NotFound` only ever comes back from `fetch_file` — a missing ref or path
/// is a distinct, recoverable outcome from a broken transport. Every other
/// failure, including a timeout or a cancelled call, is `Transport`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{path:?} not found in {repo:?} at {committish:?}")]
    NotFound {
        repo: String,
        committish: String,
        path: String,
    },

    #[error("remote call to {host} failed: {message}")]
    Transport { host: String, message: String },

    #[error("malformed response from {host}: {message}")]
    MalformedResponse { host: String, message: String },
}

impl ClientError {
    pub fn transport(host: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ClientError::Transport {
            host: host.into(),
            message: message.to_string(),
        }
    }

    pub fn malformed(host: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ClientError::MalformedResponse {
            host: host.into(),
            message: message.to_string(),
        }
    }
}
