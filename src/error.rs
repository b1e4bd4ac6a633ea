//! Error types for q-desktop.

use std::time::Duration;

/// Top-level error type for the plugin.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised while running an external command.
///
/// Not-found, permission-denied and failures inside the target script all
/// surface through this type; callers only see the rendered message.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {command} ({status}){}", stderr_suffix(.stderr))]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Command timed out after {timeout:?}: {command}")]
    Timeout { command: String, timeout: Duration },

    #[error("Command produced no usable output: {command}: {reason}")]
    MissingOutput { command: String, reason: String },

    #[error("IO error while waiting for {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr)
    }
}

/// Result type alias for the plugin.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_message_includes_stderr() {
        let err = ExecutionError::Failed {
            command: "bash list_windows.sh".to_string(),
            status: "exit status 2".to_string(),
            stderr: "xdotool: not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Command failed: bash list_windows.sh (exit status 2)"));
        assert!(msg.ends_with("\nxdotool: not found"));
    }

    #[test]
    fn test_failed_message_without_stderr() {
        let err = ExecutionError::Failed {
            command: "false".to_string(),
            status: "exit status 1".to_string(),
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "Command failed: false (exit status 1)");
    }
}
