use thiserror::Error;

/// Failure of a configuration API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 404 for the object or collection.
    #[error("configuration object not found: {path}")]
    NotFound { path: String },

    /// Any other non-2xx answer. The body usually carries the server's
    /// explanation, so it is kept verbatim.
    #[error("{method} {path} failed with HTTP {status}: {body}")]
    Status {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("request to the configuration API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode configuration API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid configuration API URL: {0}")]
    InvalidUrl(String),

    /// A polymorphic response did not name exactly one known subtype.
    #[error("response for {object_kind} does not carry a recognized subtype schema")]
    UnknownSubtype { object_kind: String },

    #[error("response for {object_kind} carries more than one subtype schema: {tags:?}")]
    AmbiguousSubtype {
        object_kind: String,
        tags: Vec<String>,
    },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

/// A string did not match any of the server's values for an enumerated
/// property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{value:?} is not a valid {kind}; expected one of: {}", .expected.join(", "))]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static [&'static str],
}

impl EnumParseError {
    pub fn new(kind: &'static str, value: &str, expected: &'static [&'static str]) -> Self {
        EnumParseError {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}
