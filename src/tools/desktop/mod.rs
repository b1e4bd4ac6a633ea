//! Desktop automation tools.
//!
//! Each tool is a named configuration of the dispatcher: which script or
//! binary to run, with which arguments, under which timeout.

pub mod capture;
pub mod input;
pub mod windows;

pub use capture::{LookTool, OcrTool, ScreenshotTool, last_non_empty_line};
pub use input::{ClickTool, KeyTool, MouseButton, MoveTool, TypeTool};
pub use windows::{FocusOutcome, FocusTool, WindowsTool, focus_window};

use std::sync::Arc;
use std::time::Duration;

use crate::config::DesktopConfig;
use crate::dispatch::CommandRunner;
use crate::tools::tool::Tool;

/// Screenshot capture (`desktop_screenshot`, `desktop_look`).
pub const CAPTURE_TIMEOUT: Duration = Duration::from_millis(30_000);
/// Capture plus OCR.
pub const OCR_TIMEOUT: Duration = Duration::from_millis(60_000);
/// Window listing script.
pub const LIST_WINDOWS_TIMEOUT: Duration = Duration::from_millis(15_000);
/// Click, move and key presses.
pub const POINTER_TIMEOUT: Duration = Duration::from_millis(10_000);
/// Typing text, which scales with its length.
pub const TYPE_TIMEOUT: Duration = Duration::from_millis(15_000);
/// Each xdotool step of the focus sequence.
pub const FOCUS_STEP_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Build all desktop tools for a configuration.
pub fn desktop_tools(config: &DesktopConfig, runner: Arc<dyn CommandRunner>) -> Vec<Arc<dyn Tool>> {
    let scripts = config.scripts();
    let shots = config.screenshot_dir.clone();

    vec![
        Arc::new(ScreenshotTool::new(
            Arc::clone(&runner),
            scripts.capture_screen.clone(),
            shots.clone(),
        )),
        Arc::new(LookTool::new(
            Arc::clone(&runner),
            scripts.capture_screen.clone(),
            shots.clone(),
        )),
        Arc::new(WindowsTool::new(
            Arc::clone(&runner),
            scripts.list_windows.clone(),
        )),
        Arc::new(ClickTool::new(Arc::clone(&runner), scripts.control.clone())),
        Arc::new(MoveTool::new(Arc::clone(&runner), scripts.control.clone())),
        Arc::new(TypeTool::new(Arc::clone(&runner), scripts.control.clone())),
        Arc::new(KeyTool::new(Arc::clone(&runner), scripts.control.clone())),
        Arc::new(OcrTool::new(
            Arc::clone(&runner),
            scripts.capture_ocr.clone(),
            shots,
        )),
        Arc::new(FocusTool::new(runner)),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording runner for tool tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::dispatch::{CommandRunner, Invocation};
    use crate::error::ExecutionError;

    /// Records every invocation and replies from a script of canned results.
    /// When the script runs out, replies with an empty string.
    #[derive(Default)]
    pub struct RecordingRunner {
        pub calls: Mutex<Vec<Invocation>>,
        replies: Mutex<VecDeque<Result<String, ExecutionError>>>,
    }

    impl RecordingRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, reply: Result<String, ExecutionError>) -> Self {
            self.replies.lock().unwrap().push_back(reply);
            self
        }

        pub fn ok(self, text: &str) -> Self {
            self.reply(Ok(text.to_string()))
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }

        /// Rendered command lines, in call order.
        pub fn commands(&self) -> Vec<String> {
            self.calls()
                .iter()
                .map(|c| c.command().to_string())
                .collect()
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn dispatch(&self, invocation: Invocation) -> Result<String, ExecutionError> {
            self.calls.lock().unwrap().push(invocation);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }
}
