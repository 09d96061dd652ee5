//! Entry point: CLI dispatch, logging and the terminal session.

mod config;
mod domain;
mod error;
mod selftest;
mod sim;
mod ui;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::driver::Driver;
use sim::level;
use ui::renderer::TerminalPresenter;
use ui::Presentation;

const USAGE: &str = "usage: mazerunner [test]\n\n  (no args)  play\n  test       run the built-in self-tests";
const LOG_FILE: &str = "mazerunner.log";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => match play() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("mazerunner: {e:#}");
                ExitCode::FAILURE
            }
        },
        [cmd] if cmd == "test" => {
            setup_stderr_logging();
            if selftest::run() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }
        _ => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
    }
}

fn play() -> Result<()> {
    let loaded = GameConfig::load();
    let config = loaded.config;

    if let Err(e) = setup_logging(&config.paths.log_dir) {
        eprintln!("logging disabled: {e:#}");
    }
    for w in &loaded.warnings {
        warn!("config: {w}");
    }
    info!("config: {:?}", config);

    let source = level::load_level(&config.paths.level_file).context("cannot start without a level")?;

    let mut presenter = TerminalPresenter::new(&config);
    presenter.init().context("terminal init failed")?;

    let mut driver = Driver::new(config, source, presenter.elapsed_time_ms());
    let result = driver.run(&mut presenter);

    if let Err(e) = presenter.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    let phase = result.context("terminal I/O failed")?;

    info!("session over: {:?}, score {}", phase, driver.state().score);
    println!();
    println!("Thanks for playing Maze Runner!");
    println!("Final Score: {}", driver.state().score);
    Ok(())
}

/// File-only logging: stdout and stderr belong to the terminal UI.
fn setup_logging(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("cannot create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .try_init()
        .context("cannot install log subscriber")?;

    // Keep the writer alive for the rest of the process.
    std::mem::forget(guard);

    info!("logging to {}", log_dir.join(LOG_FILE).display());
    Ok(())
}

fn setup_stderr_logging() {
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if let Err(e) = tracing_subscriber::registry().with(env_filter()).with(stderr_layer).try_init() {
        eprintln!("logging disabled: {e}");
    }
}

/// `RUST_LOG` if set, else `info`.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
