use thiserror::Error;

/// Failures talking to the Ollama server.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("cannot reach the server: {0}")]
    Connection(String),

    #[error("the server did not answer in time")]
    Timeout,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("malformed response: {0}")]
    ParseError(String),

    /// The server reported a problem mid-stream, or the body broke off.
    #[error("stream interrupted: {0}")]
    StreamError(String),

    #[error("invalid server address: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// The server never answered, as opposed to answering with an error.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }

    /// Maps a non-success response. Ollama reports failures as
    /// `{"error": "..."}`; anything else falls back to the status line.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            error: String,
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("HTTP {status}"));

        match status {
            404 => Self::ModelNotFound(message),
            500..=599 => Self::Server { status, message },
            _ => Self::Rejected { status, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::StreamError(err.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for ProviderError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            // Retries exhausted; the middleware only gives up on transport failures.
            reqwest_middleware::Error::Middleware(e) => Self::Connection(e.to_string()),
        }
    }
}
