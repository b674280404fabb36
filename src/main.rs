use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use workbench::config::WorkbenchConfig;
use workbench::frame::{Frame, Status};
use workbench::services::command::Command;
use workbench::services::dataset::DatasetError;
use workbench::session::{SessionError, spawn_session};
use workbench::workbench::{Workbench, WorkbenchError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("workbench init failed: {0}")]
    Workbench(#[from] WorkbenchError),
    #[error("dataset selection failed: {0}")]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("stdio failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Reads one JSON command per stdin line (`{"kind": "...", "payload": {...}}`)
/// and writes reply and broadcast frames as JSON lines on stdout.
///
/// Environment overrides (`WORKBENCH_*`) are read by the config loader; the
/// flags below take precedence over them.
#[derive(Parser, Debug)]
#[command(name = "workbench", about = "Headless molecular dynamics workbench driven by JSON commands")]
struct Cli {
    /// Simulated-time horizon in ns.
    #[arg(long)]
    horizon: Option<f64>,

    /// Wall-clock tick period in milliseconds.
    #[arg(long)]
    tick_ms: Option<u64>,

    #[arg(long, default_value_t = 1440)]
    width: u32,

    #[arg(long, default_value_t = 900)]
    height: u32,

    /// Dataset to activate instead of the first catalog record.
    #[arg(long)]
    dataset: Option<String>,

    /// Print a full workbench snapshot before reading commands.
    #[arg(long)]
    snapshot: bool,

    /// Keep running this long after stdin closes, so a playing clock can advance.
    #[arg(long, default_value_t = 0)]
    linger_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let mut config = WorkbenchConfig::from_env();
    if let Some(horizon) = cli.horizon {
        config.simulation.horizon = horizon;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.tick_period = Duration::from_millis(tick_ms);
    }

    let mut bench = Workbench::headless(config)?;
    bench.resize(cli.width, cli.height);
    if let Some(id) = &cli.dataset {
        bench.select_dataset(id)?;
    }

    let (handle, task) = spawn_session(bench);
    let (_, mut frames) = handle.subscribe().await?;
    let printer = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if let Err(err) = write_frame(&frame) {
                warn!(error = %err, "cli: frame not written");
            }
        }
    });

    if cli.snapshot {
        println!("{}", serde_json::to_string(&handle.snapshot().await?)?);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let command: Command = match serde_json::from_str(line) {
            Ok(command) => command,
            Err(err) => {
                warn!(error = %err, "cli: invalid command line skipped");
                continue;
            }
        };
        let reply = handle.dispatch(command).await?;
        if reply.status == Status::Error {
            warn!(
                syscall = %reply.syscall,
                code = reply.data_str("code").unwrap_or("-"),
                "cli: command failed"
            );
        }
        write_frame(&reply)?;
    }

    if cli.linger_ms > 0 {
        tokio::time::sleep(Duration::from_millis(cli.linger_ms)).await;
    }

    handle.shutdown().await?;
    let bench = task.await?;
    info!(status = bench.clock().status().as_str(), time = bench.clock().current_time(), "cli: session ended");
    // Dropping the workbench closes the last sink and ends the printer.
    drop(bench);
    printer.await?;
    Ok(())
}

fn write_frame(frame: &Frame) -> Result<(), CliError> {
    println!("{}", serde_json::to_string(frame)?);
    Ok(())
}
