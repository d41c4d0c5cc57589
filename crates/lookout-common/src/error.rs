//! Failures of a single moderation request

use bytes::Bytes;

/// Why the moderation server could not give a verdict for an item
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum RequestError {
    /// The request never got a response
    #[error("could not reach moderation server: {0}")]
    #[diagnostic(
        code(lookout::request::transport),
        help("check that the moderation server is running and reachable")
    )]
    Transport(
        #[from]
        #[diagnostic_source]
        TransportError,
    ),

    /// The query could not be serialized
    #[error("{0}")]
    Encode(
        #[from]
        #[diagnostic_source]
        EncodeError,
    ),

    /// The server's answer was not a verdict
    #[error("{0}")]
    Decode(
        #[from]
        #[diagnostic_source]
        DecodeError,
    ),

    /// The server answered with something other than `200 OK`
    #[error("HTTP {0}")]
    Http(
        #[from]
        #[diagnostic_source]
        HttpError,
    ),
}

impl RequestError {
    /// Status code of the server's answer, if it sent one.
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::Http(err) => Some(err.status),
            _ => None,
        }
    }
}

/// Failures below the HTTP layer
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TransportError {
    /// No connection could be made
    #[error("connection failed: {0}")]
    Connect(String),

    /// The client gave up waiting
    #[error("request timed out")]
    Timeout,

    /// The request could not be built (bad endpoint, link or header)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Anything else the client reported
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Query serialization failures
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum EncodeError {
    /// JSON serialization failed
    #[error("failed to serialize query: {0}")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
}

/// Verdict deserialization failures
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DecodeError {
    /// The body was not a verdict document
    #[error("failed to parse verdict: {0}")]
    #[diagnostic(
        code(lookout::response::json),
        help("the server should answer with a JSON object holding `unrecoverable` and `images`")
    )]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
}

/// A non-`200` answer from the moderation server
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub struct HttpError {
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response body, if the server sent one
    pub body: Option<Bytes>,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.status)?;
        if let Some(text) = self.body.as_deref().and_then(|b| std::str::from_utf8(b).ok()) {
            write!(f, ":\n{text}")?;
        }
        Ok(())
    }
}

/// Result of one moderation request
pub type RequestResult<T> = std::result::Result<T, RequestError>;

#[cfg(feature = "reqwest-client")]
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() || e.is_request() {
            Self::InvalidRequest(e.to_string())
        } else {
            Self::Other(Box::new(e))
        }
    }
}
