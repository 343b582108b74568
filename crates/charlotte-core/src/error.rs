//! Stable error kinds returned across the tool-handler boundary.

use thiserror::Error;

/// The engine's stable error surface.
///
/// Every failure that reaches a tool handler is translated into one of these six kinds.
/// Unknown/unexpected failures become [`EngineError::SessionError`] with the original message
/// preserved, per the propagation policy.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Navigation (goto, back, forward, reload) failed or had no effect.
    #[error("navigation failed: {message}")]
    NavigationFailed {
        /// Human-readable description of the failure.
        message: String,
        /// Optional actionable hint for the caller.
        recommendation: Option<String>,
    },

    /// An operation exceeded its deadline.
    #[error("timed out: {message}")]
    Timeout {
        /// Human-readable description of the failure.
        message: String,
        /// Optional actionable hint for the caller.
        recommendation: Option<String>,
    },

    /// An element id could not be resolved to a live node.
    #[error("element not found: {message}")]
    ElementNotFound {
        /// Human-readable description of the failure.
        message: String,
        /// Optional actionable hint for the caller (a "did you mean" suggestion).
        recommendation: Option<String>,
    },

    /// JavaScript evaluation threw or could not be serialized.
    #[error("evaluation error: {message}")]
    EvaluationError {
        /// Human-readable description of the failure.
        message: String,
        /// Optional actionable hint for the caller.
        recommendation: Option<String>,
    },

    /// A referenced snapshot id has been evicted from the ring buffer.
    #[error("snapshot expired: {message}")]
    SnapshotExpired {
        /// Human-readable description of the failure.
        message: String,
        /// Optional actionable hint for the caller.
        recommendation: Option<String>,
    },

    /// Catch-all for browser/session/transport failures and anything unclassified.
    #[error("session error: {message}")]
    SessionError {
        /// Human-readable description of the failure.
        message: String,
        /// Optional actionable hint for the caller.
        recommendation: Option<String>,
    },
}

impl EngineError {
    /// Build a [`EngineError::NavigationFailed`] with no recommendation.
    pub fn navigation_failed(message: impl Into<String>) -> Self {
        Self::NavigationFailed {
            message: message.into(),
            recommendation: None,
        }
    }

    /// Build a [`EngineError::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            recommendation: None,
        }
    }

    /// Build a [`EngineError::ElementNotFound`], optionally with a did-you-mean hint.
    pub fn element_not_found(message: impl Into<String>, recommendation: Option<String>) -> Self {
        Self::ElementNotFound {
            message: message.into(),
            recommendation,
        }
    }

    /// Build a [`EngineError::EvaluationError`].
    pub fn evaluation_error(message: impl Into<String>) -> Self {
        Self::EvaluationError {
            message: message.into(),
            recommendation: None,
        }
    }

    /// Build a [`EngineError::SnapshotExpired`] citing the current oldest id.
    pub fn snapshot_expired(requested: u64, oldest: u64) -> Self {
        Self::SnapshotExpired {
            message: format!("snapshot {requested} has been evicted"),
            recommendation: Some(format!("the oldest retained snapshot id is {oldest}")),
        }
    }

    /// Build a [`EngineError::SessionError`] from an arbitrary underlying error message.
    pub fn session_error(message: impl Into<String>) -> Self {
        Self::SessionError {
            message: message.into(),
            recommendation: None,
        }
    }

    /// The human-readable message, independent of variant.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NavigationFailed { message, .. }
            | Self::Timeout { message, .. }
            | Self::ElementNotFound { message, .. }
            | Self::EvaluationError { message, .. }
            | Self::SnapshotExpired { message, .. }
            | Self::SessionError { message, .. } => message,
        }
    }

    /// The stable wire name of this error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NavigationFailed { .. } => "NAVIGATION_FAILED",
            Self::Timeout { .. } => "TIMEOUT",
            Self::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            Self::EvaluationError { .. } => "EVALUATION_ERROR",
            Self::SnapshotExpired { .. } => "SNAPSHOT_EXPIRED",
            Self::SessionError { .. } => "SESSION_ERROR",
        }
    }
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_stable_per_variant() {
        assert_eq!(EngineError::navigation_failed("x").kind(), "NAVIGATION_FAILED");
        assert_eq!(EngineError::timeout("x").kind(), "TIMEOUT");
        assert_eq!(
            EngineError::element_not_found("x", None).kind(),
            "ELEMENT_NOT_FOUND"
        );
        assert_eq!(EngineError::evaluation_error("x").kind(), "EVALUATION_ERROR");
        assert_eq!(EngineError::snapshot_expired(3, 4).kind(), "SNAPSHOT_EXPIRED");
        assert_eq!(EngineError::session_error("x").kind(), "SESSION_ERROR");
    }

    #[test]
    fn snapshot_expired_cites_oldest() {
        let err = EngineError::snapshot_expired(3, 4);
        assert!(err.to_string().contains('3'));
        match err {
            EngineError::SnapshotExpired { recommendation, .. } => {
                assert!(recommendation.unwrap().contains('4'));
            }
            _ => panic!("wrong variant"),
        }
    }
}
