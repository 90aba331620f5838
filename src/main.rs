//! rsiwatch
//!
//! One pass over the configured symbols. Meant to be invoked by an external
//! scheduler (cron, systemd timer) once per trading day.

use chrono::{Local, NaiveDate};
use clap::Parser;
use dotenvy::dotenv;
use rsiwatch::config::{self, Config};
use rsiwatch::core::{bootstrap, notify_operator, RunOptions};
use rsiwatch::logging;
use rsiwatch::signals::SignalEngine;
use rsiwatch::EngineError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Edge-triggered RSI crossing alerts")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, env = "RSIWATCH_CONFIG", default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the history log location
    #[arg(long)]
    history: Option<PathBuf>,

    /// Evaluation date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Log messages instead of sending them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            if let Err(log_err) = logging::init_logging(None) {
                eprintln!("failed to initialise logging: {}", log_err);
            }
            let err = EngineError::from(e);
            error!(config = %cli.config.display(), error = %err, "Failed to load configuration");
            return fail(&cli, &err).await;
        }
    };

    if let Err(e) = logging::init_logging(config.log_file.as_deref()) {
        eprintln!("log file unavailable ({}), logging to stdout only", e);
        if let Err(e) = logging::init_logging(None) {
            eprintln!("failed to initialise logging: {}", e);
        }
    }

    info!(environment = %config::get_environment(), dry_run = cli.dry_run, "Starting rsiwatch");

    let options = RunOptions {
        history_override: cli.history.clone(),
        dry_run: cli.dry_run,
    };
    let mut ctx = match bootstrap(&config, &options) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = %e, "Bootstrap failed");
            return fail(&cli, &e).await;
        }
    };

    let today = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let summary = SignalEngine::run(&mut ctx, today).await;
    info!(?summary, "Run summary");

    if let Some(path) = &config.metrics_textfile {
        if let Err(e) = ctx.metrics.write_textfile(path) {
            warn!(path = %path.display(), error = %e, "Failed to write metrics textfile");
        }
    }

    ExitCode::SUCCESS
}

async fn fail(cli: &Cli, err: &EngineError) -> ExitCode {
    if !cli.dry_run {
        notify_operator(&cli.config, err).await;
    }
    ExitCode::FAILURE
}
