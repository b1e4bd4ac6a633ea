use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use q_desktop::config::{DesktopConfig, SCREENSHOT_DIR_ENV, WORKSPACE_ENV};
use q_desktop::context::CallContext;
use q_desktop::plugin::DesktopPlugin;

/// Run desktop automation tools without a host runtime.
#[derive(Parser)]
#[command(name = "q-desktop", version, about)]
struct Cli {
    /// Workspace root containing desktop-automation/scripts
    #[arg(long, env = WORKSPACE_ENV)]
    workspace: Option<String>,

    /// Directory screenshots are written to
    #[arg(long, env = SCREENSHOT_DIR_ENV)]
    screenshot_dir: Option<String>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the tool definitions as JSON
    Tools,
    /// Call one tool
    Call {
        /// Tool name, e.g. desktop_screenshot
        name: String,
        /// Parameters as a JSON object
        #[arg(default_value = "{}")]
        params: String,
        /// Print the MCP content envelope instead of plain text
        #[arg(long)]
        mcp: bool,
    },
}

fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "q-desktop.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_dir.as_deref());

    let config = DesktopConfig::resolve(cli.workspace.as_deref(), cli.screenshot_dir.as_deref());
    let plugin = DesktopPlugin::register(config)
        .await
        .context("Failed to register desktop tools")?;
    let tools = plugin.tools();

    match cli.command {
        Command::Tools => {
            let defs = tools.tool_definitions().await;
            println!("{}", serde_json::to_string_pretty(&defs)?);
        }
        Command::Call { name, params, mcp } => {
            let params: serde_json::Value =
                serde_json::from_str(&params).context("Parameters must be valid JSON")?;
            let output = tools
                .execute(&name, params, &CallContext::default())
                .await
                .with_context(|| format!("{} failed", name))?;
            if mcp {
                println!("{}", output.to_mcp_content());
            } else {
                println!("{}", output.as_text());
            }
        }
    }

    Ok(())
}
