//! Screen capture tools: screenshot, look and OCR.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::context::CallContext;
use crate::dispatch::CommandRunner;
use crate::error::ExecutionError;
use crate::tools::desktop::{CAPTURE_TIMEOUT, OCR_TIMEOUT};
use crate::tools::tool::{Tool, ToolError, ToolOutput, optional_str};

/// Question used by `desktop_look` when none is given.
const DEFAULT_QUESTION: &str = "Describe the current screen.";

/// The last non-empty line of script output.
///
/// Capture scripts may print diagnostics before the path; the final line is
/// the file that was written.
pub fn last_non_empty_line(output: &str) -> Option<&str> {
    output
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
}

/// Run the capture script and return the screenshot path.
async fn capture(
    runner: &dyn CommandRunner,
    script: &Path,
    screenshot_dir: &Path,
) -> Result<String, ExecutionError> {
    let script = script.display().to_string();
    let out = runner
        .run(
            "bash",
            vec![script.clone(), screenshot_dir.display().to_string()],
            CAPTURE_TIMEOUT,
        )
        .await?;

    last_non_empty_line(&out)
        .map(str::to_string)
        .ok_or_else(|| ExecutionError::MissingOutput {
            command: format!("bash {}", script),
            reason: "capture script printed no path".to_string(),
        })
}

// ── ScreenshotTool ──────────────────────────────────────────────────

/// Take a screenshot and report where it was saved.
pub struct ScreenshotTool {
    runner: Arc<dyn CommandRunner>,
    script: PathBuf,
    screenshot_dir: PathBuf,
}

impl ScreenshotTool {
    pub fn new(runner: Arc<dyn CommandRunner>, script: PathBuf, screenshot_dir: PathBuf) -> Self {
        Self {
            runner,
            script,
            screenshot_dir,
        }
    }
}

#[async_trait]
impl Tool for ScreenshotTool {
    fn name(&self) -> &str {
        "desktop_screenshot"
    }

    fn label(&self) -> &str {
        "Desktop Screenshot"
    }

    fn description(&self) -> &str {
        "Take a screenshot of the desktop. Returns the file path. \
         Uses KMS grab on GNOME Wayland. Use `image` tool to analyze visually."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "region": {
                    "type": "string",
                    "description": "reserved for future use"
                }
            }
        })
    }

    async fn execute(
        &self,
        _params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let path = capture(self.runner.as_ref(), &self.script, &self.screenshot_dir).await?;
        Ok(ToolOutput::text(
            format!("Screenshot saved to: {}", path),
            start.elapsed(),
        ))
    }
}

// ── LookTool ────────────────────────────────────────────────────────

/// Take a screenshot for vision analysis and echo the question back.
pub struct LookTool {
    runner: Arc<dyn CommandRunner>,
    script: PathBuf,
    screenshot_dir: PathBuf,
}

impl LookTool {
    pub fn new(runner: Arc<dyn CommandRunner>, script: PathBuf, screenshot_dir: PathBuf) -> Self {
        Self {
            runner,
            script,
            screenshot_dir,
        }
    }
}

#[async_trait]
impl Tool for LookTool {
    fn name(&self) -> &str {
        "desktop_look"
    }

    fn label(&self) -> &str {
        "Desktop Look"
    }

    fn description(&self) -> &str {
        "Take a screenshot for vision analysis. Returns the file path. \
         Use the `image` tool on the returned path to see the screen."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "What to look for on screen"
                }
            }
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &CallContext,
    ) -> Result<ToolOutput, ToolError> {
        let question = optional_str(&params, "question")?.unwrap_or(DEFAULT_QUESTION);
        let start = Instant::now();
        let path = capture(self.runner.as_ref(), &self.script, &self.screenshot_dir).await?;
        Ok(ToolOutput::text(
            format!(
                "Screenshot: {} | Question: {} | Use image tool to analyze.",
                path, question
            ),
            start.elapsed(),
        ))
    }
}

// ── OcrTool ─────────────────────────────────────────────────────────

/// Capture the screen and return the recognized text.
pub struct OcrTool {
    runner: Arc<dyn CommandRunner>,
    script: PathBuf,
    screenshot_dir: PathBuf,
}

impl OcrTool {
    pub fn new(runner: Arc<dyn CommandRunner>, script: PathBuf, screenshot_dir: PathBuf) -> Self {
        Self {
            runner,
            script,
            screenshot_dir,
        }
    }
}

#[async_trait]
impl Tool for OcrTool {
    fn name(&self) -> &str {
        "desktop_ocr"
    }

    fn label(&self) -> &str {
        "Desktop OCR"
    }

    fn description(&self) -> &str {
        "Take a screenshot and run Tesseract OCR. Returns text on screen."
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
        let text = self
            .runner
            .run(
                "bash",
                vec![
                    self.script.display().to_string(),
                    self.screenshot_dir.display().to_string(),
                ],
                OCR_TIMEOUT,
            )
            .await?;
        Ok(ToolOutput::text(text, start.elapsed()))
    }
}
