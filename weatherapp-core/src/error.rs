use thiserror::Error;

/// Why a single outbound request produced no usable payload.
///
/// All three kinds are terminal: they end up as `ResultState::Error` and are never retried.
/// `Display` is the bare reason with no prefix; the session adds one per flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Failure below the HTTP response level: DNS, connect, timeout, body read, JSON decode.
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response. `message` is whatever the server told us.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 2xx response without a usable body.
    #[error("Empty response")]
    EmptyBody,
}

impl FetchError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        FetchError::Transport(err.to_string())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    /// The request URL carries the API key in its query, so it never reaches the message.
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let mut message = err.to_string();

        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        FetchError::Transport(message)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Transport(format!("invalid response body: {err}"))
    }
}
