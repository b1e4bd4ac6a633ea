//! Bounded external-process command dispatcher.
//!
//! Every desktop action ends up here: build an [`Invocation`], apply the
//! display-session defaults, run the child with a hard timeout, and map the
//! outcome to trimmed stdout or an [`ExecutionError`].

pub mod env;
pub mod invocation;

pub use env::{AmbientEnv, DISPLAY_DEFAULTS};
pub use invocation::{CommandLine, Invocation, shell_quote};

use std::collections::HashMap;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::ExecutionError;

/// Time a timed-out process group gets between SIGTERM and SIGKILL.
#[cfg(unix)]
const KILL_GRACE: Duration = Duration::from_millis(250);

/// Something that can execute an [`Invocation`].
///
/// Tools depend on this rather than on [`Dispatcher`] directly so that tests
/// can record invocations without spawning processes.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Execute one invocation and return its trimmed stdout.
    async fn dispatch(&self, invocation: Invocation) -> Result<String, ExecutionError>;

    /// Run an executable with a verbatim argument list.
    async fn run(
        &self,
        executable: &str,
        arguments: Vec<String>,
        timeout: Duration,
    ) -> Result<String, ExecutionError> {
        self.dispatch(Invocation::direct(executable, arguments, timeout))
            .await
    }

    /// Run a command line through `sh -c`.
    async fn run_shell(
        &self,
        command_line: &str,
        timeout: Duration,
    ) -> Result<String, ExecutionError> {
        self.dispatch(Invocation::shell(command_line, timeout)).await
    }
}

/// Process-spawning [`CommandRunner`].
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    ambient: AmbientEnv,
}

impl Dispatcher {
    /// Dispatcher that inherits the current process environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher whose children see only `ambient` plus the display defaults.
    pub fn with_ambient(ambient: HashMap<String, String>) -> Self {
        Self {
            ambient: AmbientEnv::Fixed(ambient),
        }
    }

    /// Attach the per-call environment to an invocation.
    pub fn prepare(&self, invocation: Invocation) -> Invocation {
        let env = env::materialize(&self.ambient);
        invocation.with_environment(env)
    }

    async fn execute(&self, invocation: &Invocation) -> Result<String, ExecutionError> {
        let rendered = invocation.command().to_string();
        let timeout = invocation.timeout();
        let (program, args) = invocation.command().program_and_args();

        let mut command = Command::new(program);
        command.args(args);
        if self.ambient.is_isolated() {
            command.env_clear();
        }
        command
            .envs(invocation.environment_overrides())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Wrappers like `sudo` and `bash` fork the real worker; a group of its
        // own lets a timeout reach every descendant.
        #[cfg(unix)]
        command.process_group(0);

        tracing::debug!(
            command = %rendered,
            shell = invocation.is_shell(),
            timeout_ms = timeout.as_millis() as u64,
            "Dispatching command"
        );

        let start = Instant::now();
        let child = command.spawn().map_err(|source| ExecutionError::Spawn {
            command: rendered.clone(),
            source,
        })?;
        let pid = child.id();

        // The child itself also dies through kill_on_drop once the wait
        // future is dropped.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(ExecutionError::Io {
                    command: rendered,
                    source,
                });
            }
            Err(_) => {
                if let Some(pid) = pid {
                    terminate_group(pid).await;
                }
                tracing::warn!(
                    command = %rendered,
                    timeout_ms = timeout.as_millis() as u64,
                    "Command timed out, process group killed"
                );
                return Err(ExecutionError::Timeout {
                    command: rendered,
                    timeout,
                });
            }
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;

        if !output.status.success() {
            let status = match output.status.code() {
                Some(code) => format!("exit status {}", code),
                None => "terminated by signal".to_string(),
            };
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(command = %rendered, %status, elapsed_ms, "Command failed");
            return Err(ExecutionError::Failed {
                command: rendered,
                status,
                stderr,
            });
        }

        tracing::debug!(command = %rendered, elapsed_ms, "Command finished");
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// SIGTERM the child's process group, then SIGKILL whatever is left after
/// [`KILL_GRACE`].
#[cfg(unix)]
async fn terminate_group(pgid: u32) {
    signal_group(pgid, libc::SIGTERM);
    tokio::time::sleep(KILL_GRACE).await;
    signal_group(pgid, libc::SIGKILL);
}

#[cfg(not(unix))]
async fn terminate_group(_pgid: u32) {}

#[cfg(unix)]
fn signal_group(pgid: u32, signal: libc::c_int) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // ESRCH just means the whole group is already gone.
    let rc = unsafe { libc::killpg(pgid, signal) };
    if rc != 0 {
        tracing::debug!(
            pgid,
            signal,
            error = %std::io::Error::last_os_error(),
            "killpg failed"
        );
    }
}

#[async_trait]
impl CommandRunner for Dispatcher {
    async fn dispatch(&self, invocation: Invocation) -> Result<String, ExecutionError> {
        let invocation = self.prepare(invocation);
        self.execute(&invocation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isolated(pairs: &[(&str, &str)]) -> Dispatcher {
        let mut map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        map.insert(
            "PATH".to_string(),
            "/usr/local/bin:/usr/bin:/bin".to_string(),
        );
        Dispatcher::with_ambient(map)
    }

    #[tokio::test]
    async fn test_direct_output_is_trimmed() {
        let dispatcher = Dispatcher::new();
        let out = dispatcher
            .run(
                "/bin/sh",
                vec!["-c".to_string(), "printf '  hello\\n\\n'".to_string()],
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_direct_arguments_are_not_shell_parsed() {
        let dispatcher = Dispatcher::new();
        let out = dispatcher
            .run(
                "echo",
                vec!["$HOME".to_string(), "a | b".to_string()],
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        assert_eq!(out, "$HOME a | b");
    }

    #[tokio::test]
    async fn test_shell_mode_supports_pipes() {
        let dispatcher = Dispatcher::new();
        let out = dispatcher
            .run_shell("printf '42\\n43\\n' | head -1", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out, "42");
    }

    #[tokio::test]
    async fn test_non_zero_exit_carries_stderr() {
        let dispatcher = Dispatcher::new();
        let err = dispatcher
            .run_shell("echo boom >&2; exit 3", Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            ExecutionError::Failed { status, stderr, .. } => {
                assert_eq!(status, "exit status 3");
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_executable_is_spawn_error() {
        let dispatcher = Dispatcher::new();
        let err = dispatcher
            .run("/nonexistent/q-desktop-binary", vec![], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_timeout_kills_child_and_returns_promptly() {
        let dispatcher = Dispatcher::new();
        let start = Instant::now();
        let err = dispatcher
            .run("sleep", vec!["5".to_string()], Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_timeout_stops_grandchildren() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        // The trailing `:` keeps the outer shell from exec'ing the inner one,
        // so the worker really is a grandchild.
        let script = format!("sh -c \"sleep 1; touch '{}'\"; :", marker.display());

        let err = Dispatcher::new()
            .run(
                "sh",
                vec!["-c".to_string(), script],
                Duration::from_millis(200),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Timeout { .. }));

        tokio::time::sleep(Duration::from_millis(1800)).await;
        assert!(!marker.exists(), "worker kept running after the timeout");
    }

    #[tokio::test]
    async fn test_defaults_injected_when_absent() {
        let dispatcher = isolated(&[]);
        let out = dispatcher
            .run_shell(
                "echo \"$DISPLAY|$XDG_SESSION_TYPE|$XDG_CURRENT_DESKTOP|$WAYLAND_DISPLAY\"",
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        assert_eq!(out, ":0|wayland|GNOME|wayland-0");
    }

    #[tokio::test]
    async fn test_ambient_display_preserved() {
        let dispatcher = isolated(&[("DISPLAY", ":9"), ("WAYLAND_DISPLAY", "wayland-3")]);
        let out = dispatcher
            .run_shell("echo \"$DISPLAY|$WAYLAND_DISPLAY\"", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out, ":9|wayland-3");
    }

    #[test]
    fn test_prepare_materializes_environment() {
        let dispatcher = isolated(&[("XDG_CURRENT_DESKTOP", "sway")]);
        let inv = dispatcher.prepare(Invocation::direct("true", Vec::<String>::new(), Duration::ZERO));
        let env = inv.environment_overrides();
        assert_eq!(env.get("XDG_CURRENT_DESKTOP").map(String::as_str), Some("sway"));
        assert_eq!(env.get("DISPLAY").map(String::as_str), Some(":0"));
    }

    #[tokio::test]
    async fn test_repeated_calls_run_independently() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("count");
        let script = format!("echo x >> '{}'; wc -l < '{}'", counter.display(), counter.display());
        let dispatcher = Dispatcher::new();

        let first = dispatcher.run_shell(&script, Duration::from_secs(5)).await.unwrap();
        let second = dispatcher.run_shell(&script, Duration::from_secs(5)).await.unwrap();
        assert_eq!(first, "1");
        assert_eq!(second, "2");
    }
}
