//! Plugin manifest and registration.

use std::sync::Arc;

use serde::Serialize;
use tokio::fs;

use crate::config::DesktopConfig;
use crate::dispatch::{CommandRunner, Dispatcher};
use crate::error::Error;
use crate::tools::ToolRegistry;
use crate::tools::desktop::desktop_tools;

/// Static plugin metadata reported to the host.
#[derive(Debug, Clone, Serialize)]
pub struct PluginManifest {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub static MANIFEST: PluginManifest = PluginManifest {
    id: "q-desktop",
    name: "Q Desktop Automation",
    description: "Desktop automation tools (screenshot, vision look, OCR, input, window listing)",
};

/// The desktop automation plugin.
pub struct DesktopPlugin {
    config: DesktopConfig,
    tools: Arc<ToolRegistry>,
}

impl DesktopPlugin {
    /// Register from the host's raw plugin config object.
    pub async fn register_from_host(plugin_config: &serde_json::Value) -> Result<Self, Error> {
        let config = DesktopConfig::from_plugin_config(plugin_config)?;
        Self::register(config).await
    }

    /// Register with the process-spawning dispatcher.
    pub async fn register(config: DesktopConfig) -> Result<Self, Error> {
        Self::register_with_runner(config, Arc::new(Dispatcher::new())).await
    }

    /// Register with a caller-supplied runner.
    ///
    /// Creates the screenshot directory if it does not exist yet.
    pub async fn register_with_runner(
        config: DesktopConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, Error> {
        fs::create_dir_all(&config.screenshot_dir).await?;

        let tools = Arc::new(ToolRegistry::new());
        for tool in desktop_tools(&config, runner) {
            tools.register(tool);
        }

        tracing::info!(
            "{}: registered (workspace: {})",
            MANIFEST.id,
            config.workspace_path.display()
        );
        tracing::debug!(
            screenshot_dir = %config.screenshot_dir.display(),
            tools = tools.count(),
            "Desktop tools ready"
        );

        Ok(Self { config, tools })
    }

    pub fn manifest(&self) -> &'static PluginManifest {
        &MANIFEST
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    /// Registry holding the desktop tools.
    pub fn tools(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.tools)
    }
}
