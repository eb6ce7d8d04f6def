use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

/// Logger for the one-shot tools: stderr, `RUST_LOG` or `warn`.
pub fn init_cli_logging() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn")).try_init();
}

/// The TUI owns the terminal, so records only go to a file when one is configured.
pub fn init_tui_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init();
    Ok(())
}
