//! Invocation description: what to run, how long to wait, and with which
//! environment.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// How the child process is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// Executable plus an argument list, passed verbatim with no shell parsing.
    Direct {
        executable: String,
        arguments: Vec<String>,
    },
    /// A single string evaluated by `sh -c`, for pipes and redirects.
    Shell { command_line: String },
}

impl CommandLine {
    /// Program and arguments as handed to the OS.
    pub fn program_and_args(&self) -> (&str, Vec<&str>) {
        match self {
            Self::Direct {
                executable,
                arguments,
            } => (executable, arguments.iter().map(String::as_str).collect()),
            Self::Shell { command_line } => ("sh", vec!["-c", command_line.as_str()]),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct {
                executable,
                arguments,
            } => {
                write!(f, "{}", executable)?;
                for arg in arguments {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
            Self::Shell { command_line } => write!(f, "{}", command_line),
        }
    }
}

/// One external-process execution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    command: CommandLine,
    timeout: Duration,
    environment_overrides: BTreeMap<String, String>,
}

impl Invocation {
    /// Direct-argument invocation.
    pub fn direct<I, S>(executable: impl Into<String>, arguments: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: CommandLine::Direct {
                executable: executable.into(),
                arguments: arguments.into_iter().map(Into::into).collect(),
            },
            timeout,
            environment_overrides: BTreeMap::new(),
        }
    }

    /// Shell-string invocation.
    pub fn shell(command_line: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: CommandLine::Shell {
                command_line: command_line.into(),
            },
            timeout,
            environment_overrides: BTreeMap::new(),
        }
    }

    /// Return a copy carrying the given environment. Used by the dispatcher
    /// when it materializes the per-call environment.
    pub fn with_environment(mut self, env: BTreeMap<String, String>) -> Self {
        self.environment_overrides = env;
        self
    }

    pub fn command(&self) -> &CommandLine {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn environment_overrides(&self) -> &BTreeMap<String, String> {
        &self.environment_overrides
    }

    /// Whether this invocation runs through the shell.
    pub fn is_shell(&self) -> bool {
        matches!(self.command, CommandLine::Shell { .. })
    }
}

/// Quote a string for a POSIX shell so it is passed as one literal word.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_program_and_args() {
        let inv = Invocation::direct("bash", ["capture.sh", "/tmp/shots"], Duration::from_secs(30));
        let (program, args) = inv.command().program_and_args();
        assert_eq!(program, "bash");
        assert_eq!(args, vec!["capture.sh", "/tmp/shots"]);
        assert!(!inv.is_shell());
    }

    #[test]
    fn test_shell_program_and_args() {
        let inv = Invocation::shell("xdotool search --name x | head -1", Duration::from_secs(5));
        let (program, args) = inv.command().program_and_args();
        assert_eq!(program, "sh");
        assert_eq!(args, vec!["-c", "xdotool search --name x | head -1"]);
        assert!(inv.is_shell());
    }

    #[test]
    fn test_display() {
        let inv = Invocation::direct("sudo", ["python3", "ctl.py", "key", "ctrl+c"], Duration::ZERO);
        assert_eq!(inv.command().to_string(), "sudo python3 ctl.py key ctrl+c");
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("Firefox"), "'Firefox'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("$(rm -rf ~)"), "'$(rm -rf ~)'");
        assert_eq!(shell_quote(""), "''");
    }
}
