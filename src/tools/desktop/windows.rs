//! Window listing and focus.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::context::CallContext;
use crate::dispatch::{CommandRunner, shell_quote};
use crate::error::ExecutionError;
use crate::tools::desktop::{FOCUS_STEP_TIMEOUT, LIST_WINDOWS_TIMEOUT};
use crate::tools::tool::{Tool, ToolError, ToolOutput, require_str};

/// Result of a focus-by-title attempt.
///
/// Every variant is a normal tool result; focus never fails the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    /// A window matched and was activated.
    Focused { name: String, id: String },
    /// The search returned no window id.
    NotFound { term: String },
    /// One of the xdotool steps failed.
    Failed { message: String },
}

impl fmt::Display for FocusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Focused { name, id } => write!(f, "Focused: {} (id: {})", name, id),
            Self::NotFound { term } => write!(f, "No window matching '{}' found", term),
            Self::Failed { message } => write!(f, "Error: {}", message),
        }
    }
}

/// Search, activate, then look up the window name.
///
/// Dispatcher errors are turned into [`FocusOutcome::Failed`] here rather than
/// propagated.
pub async fn focus_window(runner: &dyn CommandRunner, term: &str) -> FocusOutcome {
    match try_focus(runner, term).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(term, error = %e, "Window focus failed");
            FocusOutcome::Failed {
                message: e.to_string(),
            }
        }
    }
}

async fn try_focus(runner: &dyn CommandRunner, term: &str) -> Result<FocusOutcome, ExecutionError> {
    let search = format!(
        "xdotool search --name {} 2>/dev/null | head -1",
        shell_quote(term)
    );
    let id = runner.run_shell(&search, FOCUS_STEP_TIMEOUT).await?;

    if id.is_empty() {
        return Ok(FocusOutcome::NotFound {
            term: term.to_string(),
        });
    }
    if !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ExecutionError::MissingOutput {
            command: search,
            reason: format!("unexpected window id '{}'", id),
        });
    }

    runner
        .run_shell(&format!("xdotool windowactivate {}", id), FOCUS_STEP_TIMEOUT)
        .await?;
    let name = runner
        .run_shell(&format!("xdotool getwindowname {}", id), FOCUS_STEP_TIMEOUT)
        .await?;

    tracing::debug!(%id, %name, "Window focused");
    Ok(FocusOutcome::Focused { name, id })
}

// ── WindowsTool ─────────────────────────────────────────────────────

/// List open windows via the listing script.
pub struct WindowsTool {
    runner: Arc<dyn CommandRunner>,
    script: PathBuf,
}

impl WindowsTool {
    pub fn new(runner: Arc<dyn CommandRunner>, script: PathBuf) -> Self {
        Self { runner, script }
    }
}

#[async_trait]
impl Tool for WindowsTool {
    fn name(&self) -> &str {
        "desktop_windows"
    }

    fn label(&self) -> &str {
        "Desktop Windows"
    }

    fn description(&self) -> &str {
        "List all open windows (titles + IDs via xdotool)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let listing = self
            .runner
            .run(
                "bash",
                vec![self.script.display().to_string()],
                LIST_WINDOWS_TIMEOUT,
            )
            .await?;
        Ok(ToolOutput::text(listing, start.elapsed()))
    }
}

// ── FocusTool ───────────────────────────────────────────────────────

/// Bring a window to the front by title substring.
pub struct FocusTool {
    runner: Arc<dyn CommandRunner>,
}

impl FocusTool {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Tool for FocusTool {
    fn name(&self) -> &str {
        "desktop_focus"
    }

    fn label(&self) -> &str {
        "Desktop Focus"
    }

    fn description(&self) -> &str {
        "Bring a window to focus by title (fuzzy match via xdotool)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "window": {
                    "type": "string",
                    "description": "Window title search term"
                }
            },
            "required": ["window"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let term = require_str(&params, "window")?;
        let start = Instant::now();
        let outcome = focus_window(self.runner.as_ref(), term).await;
        Ok(ToolOutput::text(outcome.to_string(), start.elapsed()))
    }
}
