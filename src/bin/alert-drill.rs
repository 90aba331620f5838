//! Alert drill
//!
//! Pushes fixed buy/sell crossings through the detector and the real message
//! templates, then delivers them with the configured notifier. The history
//! log is never touched.

use chrono::Local;
use clap::Parser;
use dotenvy::dotenv;
use rsiwatch::config::{self, Config};
use rsiwatch::core::runtime::build_notifier;
use rsiwatch::logging;
use rsiwatch::models::{OscillatorReading, SymbolPolicy};
use rsiwatch::notifications::templates;
use rsiwatch::signals::{classify, CrossingOutcome};
use rsiwatch::EngineError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

const DRILL_BANNER: &str = "[DRILL] This is a test notification.";

struct Scenario {
    name: &'static str,
    symbol: &'static str,
    filtered: bool,
    prev_daily: f64,
    daily: f64,
    weekly: Option<f64>,
    price: f64,
}

const SCENARIOS: [Scenario; 4] = [
    Scenario {
        name: "enhanced_buy",
        symbol: "TECL",
        filtered: true,
        prev_daily: 35.8,
        daily: 31.2,
        weekly: Some(48.5),
        price: 42.15,
    },
    Scenario {
        name: "enhanced_sell",
        symbol: "TECL",
        filtered: true,
        prev_daily: 65.2,
        daily: 68.7,
        weekly: Some(52.3),
        price: 48.90,
    },
    Scenario {
        name: "standard_buy",
        symbol: "SOXL",
        filtered: false,
        prev_daily: 36.4,
        daily: 30.8,
        weekly: None,
        price: 28.40,
    },
    Scenario {
        name: "standard_sell",
        symbol: "SOXL",
        filtered: false,
        prev_daily: 64.8,
        daily: 69.2,
        weekly: None,
        price: 34.75,
    },
];

#[derive(Parser, Debug)]
#[command(author, version, about = "Send fixed test alerts through the notification path")]
struct Cli {
    #[arg(short, long, env = "RSIWATCH_CONFIG", default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Scenario name, or `all`
    #[arg(short, long, default_value = "all")]
    scenario: String,

    /// Log messages instead of sending them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(None) {
        eprintln!("failed to initialise logging: {}", e);
    }

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!(config = %cli.config.display(), error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    let notifier = match build_notifier(&config, cli.dry_run) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!(error = %e, "Notifier unavailable");
            return ExitCode::FAILURE;
        }
    };

    let selected: Vec<&Scenario> = SCENARIOS
        .iter()
        .filter(|s| cli.scenario == "all" || s.name == cli.scenario)
        .collect();
    if selected.is_empty() {
        let names: Vec<&str> = SCENARIOS.iter().map(|s| s.name).collect();
        error!(scenario = %cli.scenario, available = ?names, "Unknown scenario");
        return ExitCode::FAILURE;
    }

    let mut failures = 0;
    for scenario in selected {
        let policy = config
            .policy_for(scenario.symbol)
            .with_secondary_filter(scenario.filtered);
        let Some(message) = render(scenario, &policy) else {
            failures += 1;
            continue;
        };

        match notifier.deliver(&message).await {
            Ok(()) => info!(scenario = scenario.name, "Drill alert delivered"),
            Err(e) => {
                failures += 1;
                let err = EngineError::from(e);
                error!(scenario = scenario.name, error = %err, "Drill alert failed");
            }
        }
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn render(scenario: &Scenario, policy: &SymbolPolicy) -> Option<String> {
    let today = Local::now().date_naive();
    let prior = OscillatorReading::new(scenario.symbol, today, scenario.prev_daily);
    let current =
        OscillatorReading::new(scenario.symbol, today, scenario.daily).with_weekly_opt(scenario.weekly);

    match classify(&current, Some(&prior), scenario.price, policy) {
        CrossingOutcome::Signal(event) => Some(format!(
            "{}\n\n{}",
            DRILL_BANNER,
            templates::alert_message(&event, policy)
        )),
        other => {
            warn!(
                scenario = scenario.name,
                outcome = ?other,
                "Configured thresholds do not produce a signal for this scenario"
            );
            None
        }
    }
}
