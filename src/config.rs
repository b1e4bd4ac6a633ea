//! Configuration types.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Workspace used when the host does not configure one.
pub const DEFAULT_WORKSPACE: &str = "/home/leo/Schreibtisch";

/// Environment variable read by the CLI for the workspace root.
pub const WORKSPACE_ENV: &str = "Q_DESKTOP_WORKSPACE";

/// Environment variable read by the CLI for the screenshot directory.
pub const SCREENSHOT_DIR_ENV: &str = "Q_DESKTOP_SCREENSHOT_DIR";

/// Subpath under the workspace holding the automation scripts.
const SCRIPTS_SUBPATH: &str = "desktop-automation/scripts";

/// Raw plugin configuration as supplied by the host (camelCase JSON).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPluginConfig {
    workspace_path: Option<String>,
    screenshot_dir: Option<String>,
}

/// Desktop plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopConfig {
    /// Workspace root.
    pub workspace_path: PathBuf,
    /// Where capture scripts write their images.
    pub screenshot_dir: PathBuf,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self::resolve(None, None)
    }
}

impl DesktopConfig {
    /// Build a config from optional settings. Empty strings count as unset.
    pub fn resolve(workspace: Option<&str>, screenshot_dir: Option<&str>) -> Self {
        let workspace_path = PathBuf::from(non_empty(workspace).unwrap_or(DEFAULT_WORKSPACE));
        let screenshot_dir = non_empty(screenshot_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| workspace_path.join("screenshots"));
        Self {
            workspace_path,
            screenshot_dir,
        }
    }

    /// Parse the host's plugin config object. `null` means all defaults.
    pub fn from_plugin_config(value: &serde_json::Value) -> Result<Self, ConfigError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        if !value.is_object() {
            return Err(ConfigError::InvalidValue {
                key: "pluginConfig".to_string(),
                message: "expected an object".to_string(),
            });
        }
        let raw: RawPluginConfig =
            serde_json::from_value(value.clone()).map_err(|e| ConfigError::InvalidValue {
                key: "pluginConfig".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::resolve(
            raw.workspace_path.as_deref(),
            raw.screenshot_dir.as_deref(),
        ))
    }

    /// Resolved script locations.
    pub fn scripts(&self) -> ScriptPaths {
        ScriptPaths::under(&self.workspace_path.join(SCRIPTS_SUBPATH))
    }
}

/// Locations of the external automation scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPaths {
    pub capture_screen: PathBuf,
    pub capture_ocr: PathBuf,
    pub control: PathBuf,
    pub list_windows: PathBuf,
}

impl ScriptPaths {
    /// Standard script names inside `dir`.
    pub fn under(dir: &Path) -> Self {
        Self {
            capture_screen: dir.join("capture_screen.sh"),
            capture_ocr: dir.join("capture_and_ocr.sh"),
            control: dir.join("desktop_control.py"),
            list_windows: dir.join("list_windows.sh"),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DesktopConfig::default();
        assert_eq!(config.workspace_path, PathBuf::from(DEFAULT_WORKSPACE));
        assert_eq!(
            config.screenshot_dir,
            PathBuf::from(DEFAULT_WORKSPACE).join("screenshots")
        );
    }

    #[test]
    fn test_screenshot_dir_follows_workspace() {
        let config = DesktopConfig::resolve(Some("/srv/ws"), None);
        assert_eq!(config.screenshot_dir, PathBuf::from("/srv/ws/screenshots"));
    }

    #[test]
    fn test_empty_strings_are_unset() {
        let config = DesktopConfig::resolve(Some(""), Some(""));
        assert_eq!(config, DesktopConfig::default());
    }

    #[test]
    fn test_plugin_config_camel_case() {
        let config = DesktopConfig::from_plugin_config(&serde_json::json!({
            "workspacePath": "/data/ws",
            "screenshotDir": "/data/shots"
        }))
        .unwrap();
        assert_eq!(config.workspace_path, PathBuf::from("/data/ws"));
        assert_eq!(config.screenshot_dir, PathBuf::from("/data/shots"));
    }

    #[test]
    fn test_plugin_config_null_and_empty_object() {
        let a = DesktopConfig::from_plugin_config(&serde_json::Value::Null).unwrap();
        let b = DesktopConfig::from_plugin_config(&serde_json::json!({})).unwrap();
        assert_eq!(a, DesktopConfig::default());
        assert_eq!(b, DesktopConfig::default());
    }

    #[test]
    fn test_plugin_config_rejects_wrong_types() {
        let err = DesktopConfig::from_plugin_config(&serde_json::json!({"workspacePath": 3}));
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
        let err = DesktopConfig::from_plugin_config(&serde_json::json!("ws"));
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_script_paths() {
        let scripts = DesktopConfig::resolve(Some("/ws"), None).scripts();
        assert_eq!(
            scripts.capture_screen,
            PathBuf::from("/ws/desktop-automation/scripts/capture_screen.sh")
        );
        assert_eq!(
            scripts.capture_ocr,
            PathBuf::from("/ws/desktop-automation/scripts/capture_and_ocr.sh")
        );
        assert_eq!(
            scripts.control,
            PathBuf::from("/ws/desktop-automation/scripts/desktop_control.py")
        );
        assert_eq!(
            scripts.list_windows,
            PathBuf::from("/ws/desktop-automation/scripts/list_windows.sh")
        );
    }
}
