//! `evaluate` tool (§6): run JS in page context with a typed result envelope.
//!
//! Grounded on `tools/browser_evaluate.rs`'s page-level branch (`page.evaluate(expr)`); this
//! crate's `Page::evaluate` already returns a deserialized `serde_json::Value`, so no string
//! round-trip is needed the way the teacher's MCP-facing formatting does.

use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;

use crate::error::{EngineError, Result};
use crate::Engine;

/// Default JS evaluation timeout (§6 `evaluate`).
const DEFAULT_EVALUATE_TIMEOUT: Duration = Duration::from_secs(5);

/// The typed envelope `evaluate` wraps its result in (§6: `{value, type}`).
#[derive(Debug, Clone, Serialize)]
pub struct EvaluateResult {
    /// The JS expression's result, already deserialized.
    pub value: serde_json::Value,
    /// A coarse JS-facing type tag for `value`.
    #[serde(rename = "type")]
    pub value_type: &'static str,
}

impl Engine {
    /// Evaluate `expression` in the active tab's page context (§6 `evaluate`). `await_promise`
    /// has no effect beyond documentation here: the confirmed `Page::evaluate` in this crate
    /// already awaits a returned promise before resolving.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EvaluationError`] if the expression throws or cannot be serialized,
    /// or [`EngineError::Timeout`] if it exceeds `timeout_duration`.
    pub async fn evaluate(
        &mut self,
        expression: &str,
        timeout_duration: Option<Duration>,
        _await_promise: bool,
    ) -> Result<EvaluateResult> {
        let (page, _target_id) = self.active_page().await?;
        let deadline = timeout_duration.unwrap_or(DEFAULT_EVALUATE_TIMEOUT);

        let value = match timeout(deadline, page.evaluate(expression)).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => return Err(EngineError::evaluation_error(format!("{expression}: {e}"))),
            Err(_) => return Err(EngineError::timeout(format!("evaluate timed out after {:.1}s", deadline.as_secs_f64()))),
        };

        let value_type = type_tag(&value);
        Ok(EvaluateResult { value, value_type })
    }
}

fn type_tag(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tag_matches_json_value_kind() {
        assert_eq!(type_tag(&serde_json::json!(null)), "null");
        assert_eq!(type_tag(&serde_json::json!(42)), "number");
        assert_eq!(type_tag(&serde_json::json!("s")), "string");
        assert_eq!(type_tag(&serde_json::json!([1, 2])), "array");
        assert_eq!(type_tag(&serde_json::json!({"a": 1})), "object");
    }
}
