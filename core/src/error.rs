//! Error types for the Influitive API client.
//!
//! # Design
//! Every failure is terminal for the call that produced it; nothing here is
//! retried. Each variant names the operation that failed so a caller holding
//! only the error can tell a failed member listing from a failed invitation.
//! There is no dedicated "not found" variant: every unexpected status lands in
//! `Status` with the raw code and body for diagnostics.

use thiserror::Error;

/// Errors returned by `InfluitiveClient` parse methods, the paginator and the
/// `Influitive` facade.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("{operation}: transport failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: TransportError,
    },

    /// The server answered with a status other than the one the endpoint
    /// promises on success.
    #[error("{operation}: influitive returned HTTP {status}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The response body is not JSON or does not have the expected shape.
    #[error("{operation}: unable to decode response body: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A page pointed at a continuation link that cannot be requested.
    #[error("{operation}: invalid continuation link {link:?}: {source}")]
    MalformedContinuation {
        operation: &'static str,
        link: String,
        #[source]
        source: ContinuationError,
    },

    /// The request payload could not be serialized to JSON.
    #[error("unable to encode request payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// The operation this error was raised from, if it carries one.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            ApiError::Transport { operation, .. }
            | ApiError::Status { operation, .. }
            | ApiError::Decode { operation, .. }
            | ApiError::MalformedContinuation { operation, .. } => Some(operation),
            ApiError::Serialization(_) => None,
        }
    }

    /// The HTTP status code, for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Why a continuation link cannot be followed.
#[derive(Debug, Error)]
pub enum ContinuationError {
    /// Not an absolute URL.
    #[error(transparent)]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),
}

/// A failure below HTTP: connection refused, DNS, TLS, timeout.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    timed_out: bool,
    #[source]
    source: Option<ureq::Error>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
            source: None,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
            source: None,
        }
    }

    /// Whether the transport gave up waiting for the server.
    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        Self {
            message: err.to_string(),
            timed_out: matches!(err, ureq::Error::Timeout(_)),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_omits_body() {
        let err = ApiError::Status {
            operation: "list contacts",
            status: 500,
            body: "secret stack trace".to_string(),
        };
        let shown = err.to_string();
        assert_eq!(shown, "list contacts: influitive returned HTTP 500");
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.operation(), Some("list contacts"));
    }

    #[test]
    fn transport_error_keeps_timeout_flag() {
        assert!(TransportError::timeout("took too long").is_timeout());
        assert!(!TransportError::new("refused").is_timeout());
    }

    #[test]
    fn malformed_continuation_keeps_parse_error() {
        let parse = url::Url::parse("not a url").unwrap_err();
        let err = ApiError::MalformedContinuation {
            operation: "list contacts",
            link: "not a url".to_string(),
            source: ContinuationError::from(parse),
        };
        let source = std::error::Error::source(&err).unwrap();
        let inner = source.downcast_ref::<ContinuationError>().unwrap();
        assert!(matches!(inner, ContinuationError::Parse(e) if *e == parse));
    }

    #[test]
    fn hand_built_transport_error_has_no_source() {
        assert!(std::error::Error::source(&TransportError::new("refused")).is_none());
    }

    #[test]
    fn serialization_error_has_no_operation() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let err = ApiError::from(source);
        assert!(err.operation().is_none());
        assert!(err.status().is_none());
    }
}
