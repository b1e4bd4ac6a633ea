//! Pointer and keyboard input tools.
//!
//! All of these go through the Python control script, run under `sudo`
//! because input injection needs access to the uinput device. Capture and
//! listing tools do not elevate.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::context::CallContext;
use crate::dispatch::CommandRunner;
use crate::error::ExecutionError;
use crate::tools::desktop::{POINTER_TIMEOUT, TYPE_TIMEOUT};
use crate::tools::tool::{Tool, ToolError, ToolOutput, optional_str, require_f64, require_str};

const ELEVATE: &str = "sudo";
const INTERPRETER: &str = "python3";

/// Mouse button accepted by `desktop_click`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Middle => "middle",
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MouseButton {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "middle" => Ok(Self::Middle),
            other => Err(ToolError::InvalidParameters(format!(
                "button must be one of left, right, middle (got '{}')",
                other
            ))),
        }
    }
}

/// Run a control-script sub-action with elevated privilege.
async fn control(
    runner: &dyn CommandRunner,
    script: &Path,
    action: &str,
    args: Vec<String>,
    timeout: Duration,
) -> Result<String, ExecutionError> {
    let mut argv = vec![
        INTERPRETER.to_string(),
        script.display().to_string(),
        action.to_string(),
    ];
    argv.extend(args);
    runner.run(ELEVATE, argv, timeout).await
}

fn coordinates(params: &serde_json::Value) -> Result<(f64, f64), ToolError> {
    Ok((require_f64(params, "x")?, require_f64(params, "y")?))
}

fn coordinate_schema() -> serde_json::Value {
    serde_json::json!({
        "x": { "type": "number", "description": "X coordinate" },
        "y": { "type": "number", "description": "Y coordinate" }
    })
}

// ── ClickTool ───────────────────────────────────────────────────────

pub struct ClickTool {
    runner: Arc<dyn CommandRunner>,
    script: PathBuf,
}

impl ClickTool {
    pub fn new(runner: Arc<dyn CommandRunner>, script: PathBuf) -> Self {
        Self { runner, script }
    }
}

#[async_trait]
impl Tool for ClickTool {
    fn name(&self) -> &str {
        "desktop_click"
    }

    fn label(&self) -> &str {
        "Desktop Click"
    }

    fn description(&self) -> &str {
        "Click at a position on screen."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let mut properties = coordinate_schema();
        properties["button"] = serde_json::json!({
            "type": "string",
            "enum": ["left", "right", "middle"],
            "description": "Mouse button (default: left)"
        });
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": ["x", "y"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let (x, y) = coordinates(&params)?;
        let button = optional_str(&params, "button")?
            .map(MouseButton::from_str)
            .transpose()?
            .unwrap_or_default();

        let start = Instant::now();
        // The script positions the pointer itself; absolute coordinates are
        // required for evdev on Wayland.
        control(
            self.runner.as_ref(),
            &self.script,
            "click",
            vec![button.to_string(), x.to_string(), y.to_string()],
            POINTER_TIMEOUT,
        )
        .await?;

        Ok(ToolOutput::text(
            format!("Clicked {} at ({}, {})", button, x, y),
            start.elapsed(),
        ))
    }
}

// ── MoveTool ────────────────────────────────────────────────────────

pub struct MoveTool {
    runner: Arc<dyn CommandRunner>,
    script: PathBuf,
}

impl MoveTool {
    pub fn new(runner: Arc<dyn CommandRunner>, script: PathBuf) -> Self {
        Self { runner, script }
    }
}

#[async_trait]
impl Tool for MoveTool {
    fn name(&self) -> &str {
        "desktop_move"
    }

    fn label(&self) -> &str {
        "Desktop Move"
    }

    fn description(&self) -> &str {
        "Move mouse to position (no click)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": coordinate_schema(),
            "required": ["x", "y"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let (x, y) = coordinates(&params)?;
        let start = Instant::now();
        control(
            self.runner.as_ref(),
            &self.script,
            "move",
            vec![x.to_string(), y.to_string()],
            POINTER_TIMEOUT,
        )
        .await?;

        Ok(ToolOutput::text(
            format!("Mouse moved to ({}, {})", x, y),
            start.elapsed(),
        ))
    }
}

// ── TypeTool ────────────────────────────────────────────────────────

pub struct TypeTool {
    runner: Arc<dyn CommandRunner>,
    script: PathBuf,
}

impl TypeTool {
    pub fn new(runner: Arc<dyn CommandRunner>, script: PathBuf) -> Self {
        Self { runner, script }
    }
}

#[async_trait]
impl Tool for TypeTool {
    fn name(&self) -> &str {
        "desktop_type"
    }

    fn label(&self) -> &str {
        "Desktop Type"
    }

    fn description(&self) -> &str {
        "Type text via keyboard."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": { "type": "string", "description": "Text to type" }
            },
            "required": ["text"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let text = require_str(&params, "text")?;
        let start = Instant::now();
        control(
            self.runner.as_ref(),
            &self.script,
            "type",
            vec![text.to_string()],
            TYPE_TIMEOUT,
        )
        .await?;

        Ok(ToolOutput::text(format!("Typed: {}", text), start.elapsed()))
    }
}

// ── KeyTool ─────────────────────────────────────────────────────────

pub struct KeyTool {
    runner: Arc<dyn CommandRunner>,
    script: PathBuf,
}

impl KeyTool {
    pub fn new(runner: Arc<dyn CommandRunner>, script: PathBuf) -> Self {
        Self { runner, script }
    }
}

#[async_trait]
impl Tool for KeyTool {
    fn name(&self) -> &str {
        "desktop_key"
    }

    fn label(&self) -> &str {
        "Desktop Key"
    }

    fn description(&self) -> &str {
        "Press a key combination (e.g. ctrl+c, alt+Tab, Return)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "combo": { "type": "string", "description": "Key combo string" }
            },
            "required": ["combo"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let combo = require_str(&params, "combo")?;
        let start = Instant::now();
        control(
            self.runner.as_ref(),
            &self.script,
            "key",
            vec![combo.to_string()],
            POINTER_TIMEOUT,
        )
        .await?;

        Ok(ToolOutput::text(format!("Pressed: {}", combo), start.elapsed()))
    }
}
