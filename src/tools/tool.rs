//! Tool trait and the types shared by all tools.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::context::CallContext;
use crate::error::ExecutionError;

/// Errors returned from tool execution.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl From<ExecutionError> for ToolError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::Timeout { timeout, .. } => ToolError::Timeout(timeout),
            other => ToolError::ExecutionFailed(other.to_string()),
        }
    }
}

/// Output of a successful tool call.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub result: serde_json::Value,
    pub duration: Duration,
}

impl ToolOutput {
    /// Plain text result.
    pub fn text(text: impl Into<String>, duration: Duration) -> Self {
        Self {
            result: serde_json::Value::String(text.into()),
            duration,
        }
    }

    /// The result as text. Structured results are rendered as JSON.
    pub fn as_text(&self) -> String {
        match &self.result {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// MCP-style content envelope the host expects.
    pub fn to_mcp_content(&self) -> serde_json::Value {
        serde_json::json!({
            "content": [{ "type": "text", "text": self.as_text() }]
        })
    }
}

/// Tool definition advertised to the host.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub label: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A callable tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name.
    fn name(&self) -> &str;

    /// Human-readable label.
    fn label(&self) -> &str {
        self.name()
    }

    fn description(&self) -> &str;

    /// JSON schema of the parameters object.
    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            label: self.label().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Extract a required string parameter.
pub fn require_str<'a>(params: &'a serde_json::Value, name: &str) -> Result<&'a str, ToolError> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParameters(format!("missing '{}' parameter", name)))
}

/// Extract an optional string parameter. `null` counts as absent; any other
/// non-string value is rejected.
pub fn optional_str<'a>(
    params: &'a serde_json::Value,
    name: &str,
) -> Result<Option<&'a str>, ToolError> {
    match params.get(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| ToolError::InvalidParameters(format!("'{}' must be a string", name))),
    }
}

/// Extract a required finite number.
pub fn require_f64(params: &serde_json::Value, name: &str) -> Result<f64, ToolError> {
    params
        .get(name)
        .and_then(|v| v.as_f64())
        .filter(|n| n.is_finite())
        .ok_or_else(|| ToolError::InvalidParameters(format!("missing numeric '{}' parameter", name)))
}
