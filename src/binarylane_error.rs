//! Error type shared by every `BinaryLane` operation.
//!
//! The variants fall into three groups callers usually branch on:
//! - transport / decode failures (we could not talk to the API or read its answer),
//! - `ActionFailed` (the remote operation itself ended in `errored`),
//! - `WaitCanceled` / `WaitTimedOut` (we stopped watching before a terminal status).

use std::time::Duration;

use thiserror::Error;

/// Error type for `BinaryLane` client operations.
#[derive(Debug, Error)]
pub enum BinaryLaneError {
    /// Missing required environment variable.
    #[error("missing required env var: {0}")]
    MissingEnv(&'static str),

    /// Invalid environment variable value.
    #[error("invalid env var {key}={value:?}: {reason}")]
    InvalidEnv {
        /// The environment variable key.
        key: &'static str,
        /// The environment variable value.
        value: String,
        /// The reason for invalidity.
        reason: &'static str,
    },

    /// HTTP client error (connect, timeout, TLS, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// API error response.
    #[error("binarylane api error: status={status}, body={body}")]
    Api {
        /// HTTP status code.
        status: reqwest::StatusCode,
        /// Response body.
        body: String,
    },

    /// JSON decoding error.
    #[error("json decode error: {source}")]
    Json {
        /// The JSON parsing error.
        source: serde_json::Error,
        /// The response body that failed to decode.
        body: String,
    },

    /// A request URL could not be built.
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// The parse error.
        source: url::ParseError,
    },

    /// A pagination link could not be followed.
    #[error("invalid page link {link:?}: {reason}")]
    InvalidPageLink {
        /// The link as returned by the server.
        link: String,
        /// Why the link was rejected.
        reason: &'static str,
    },

    /// An action reference cannot be polled.
    #[error("invalid action reference: {0}")]
    InvalidActionReference(&'static str),

    /// The action reached the `errored` status.
    #[error("action failed")]
    ActionFailed,

    /// The caller canceled the wait before the action finished.
    #[error("wait for action canceled")]
    WaitCanceled,

    /// The wait deadline elapsed before the action finished.
    #[error("wait for action timed out after {0:?}")]
    WaitTimedOut(Duration),
}

impl BinaryLaneError {
    /// True when the remote operation itself ended in failure.
    #[must_use]
    pub const fn is_action_failure(&self) -> bool {
        matches!(self, Self::ActionFailed)
    }

    /// True when a wait stopped because of cancellation or deadline,
    /// i.e. the action outcome is unknown.
    #[must_use]
    pub const fn is_wait_interrupted(&self) -> bool {
        matches!(self, Self::WaitCanceled | Self::WaitTimedOut(_))
    }

    /// HTTP status of an API error, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_failure_is_not_a_wait_interruption() {
        let err = BinaryLaneError::ActionFailed;
        assert!(err.is_action_failure());
        assert!(!err.is_wait_interrupted());
    }

    #[test]
    fn cancel_and_timeout_are_wait_interruptions() {
        assert!(BinaryLaneError::WaitCanceled.is_wait_interrupted());
        assert!(BinaryLaneError::WaitTimedOut(Duration::from_secs(1)).is_wait_interrupted());
        assert!(!BinaryLaneError::WaitCanceled.is_action_failure());
    }

    #[test]
    fn status_is_exposed_for_api_errors_only() {
        let err = BinaryLaneError::Api {
            status: reqwest::StatusCode::NOT_FOUND,
            body: "{}".to_string(),
        };
        assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
        assert_eq!(BinaryLaneError::ActionFailed.status(), None);
    }

    #[test]
    fn display_includes_env_details() {
        let err = BinaryLaneError::InvalidEnv {
            key: "BINARYLANE_HTTP_TIMEOUT_MS",
            value: "soon".to_string(),
            reason: "expected an unsigned integer",
        };
        assert_eq!(
            err.to_string(),
            "invalid env var BINARYLANE_HTTP_TIMEOUT_MS=\"soon\": expected an unsigned integer"
        );
    }
}
