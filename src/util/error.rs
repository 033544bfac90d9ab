// Web2Text Console - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation. A 401 is its own variant so callers
// branch on the error kind, never on message text.

use std::fmt;

// ---------------------------------------------------------------------------
// API errors
// ---------------------------------------------------------------------------

/// Errors raised by REST calls against the backend.
#[derive(Debug)]
pub enum ApiError {
    /// The session cookie is missing or expired. The GUI gate resets the
    /// session and shows the login form when it sees this variant.
    Unauthorized,

    /// The backend answered with a non-success status other than 401.
    Http { status: u16, detail: String },

    /// The request could not be sent or the response not received.
    Network { source: reqwest::Error },

    /// The response body did not match the expected schema.
    Decode {
        context: &'static str,
        source: reqwest::Error,
    },

    /// The configured base URL (or a path joined onto it) is not a valid URL.
    InvalidUrl { url: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "Not authenticated (401)"),
            Self::Http { status, detail } => {
                if detail.is_empty() {
                    write!(f, "Backend returned HTTP {status}")
                } else {
                    write!(f, "Backend returned HTTP {status}: {detail}")
                }
            }
            Self::Network { source } => write!(f, "Request failed: {source}"),
            Self::Decode { context, source } => {
                write!(f, "Cannot decode {context} response: {source}")
            }
            Self::InvalidUrl { url } => write!(f, "Invalid URL '{url}'"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Network { source } | Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Frame errors
// ---------------------------------------------------------------------------

/// Errors raised while decoding a single log stream frame.
///
/// Frames follow one strict schema. The only tolerated deviation is the
/// legacy double-encoding, where the top level is a JSON string holding
/// the encoded object; one extra decode is applied, never more.
#[derive(Debug)]
pub enum FrameError {
    /// The frame (or its inner payload) is not valid JSON.
    Syntax { source: serde_json::Error },

    /// The frame is valid JSON but does not match the log event schema.
    Schema { detail: String },

    /// The inner payload of a double-encoded frame was itself a string.
    DepthExceeded,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { source } => write!(f, "Invalid JSON: {source}"),
            Self::Schema { detail } => write!(f, "Schema mismatch: {detail}"),
            Self::DepthExceeded => {
                write!(f, "Frame encoded deeper than the tolerated double-encoding")
            }
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Syntax { source } => Some(source),
            _ => None,
        }
    }
}
