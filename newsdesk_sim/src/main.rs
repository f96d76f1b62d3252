//! Newsdesk panel simulator CLI
//!
//! Runs one moderated panel with breaking-news interruptions and logs every
//! event as `[mm:ss.mmm] <description>`.

use clap::Parser;
use newsdesk_sim::scenarios::ScenarioId;
use newsdesk_sim::{SimError, Simulation, SimulationReport};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Newsdesk panel simulator
#[derive(Parser, Debug)]
#[command(name = "newsdesk-sim")]
#[command(about = "Simulate a moderated panel interrupted by breaking news", long_about = None)]
struct Args {
    /// Number of commentators (overrides the scenario)
    #[arg(short = 'n')]
    participants: Option<usize>,

    /// Number of questions (overrides the scenario)
    #[arg(short = 'q')]
    questions: Option<usize>,

    /// Probability that a commentator answers
    #[arg(short = 'p')]
    answer_probability: Option<f64>,

    /// Maximum speak duration in seconds (at least 1)
    #[arg(short = 't')]
    max_speak_secs: Option<f64>,

    /// Probability of breaking news per tick
    #[arg(short = 'b')]
    news_probability: Option<f64>,

    /// Seed for the random source (0 = OS entropy)
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Scenario preset (panel, all_answer, silent_panel, news_storm)
    #[arg(short = 'S', long, default_value = "panel")]
    scenario: String,

    /// Wall-clock milliseconds per simulated second
    #[arg(long)]
    pace_ms: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Write the run report to a JSON file
    #[arg(long)]
    export: Option<String>,
}

fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides the default level
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let scenario: ScenarioId = args.scenario.parse().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        let names: Vec<_> = ScenarioId::all().iter().map(|s| s.name()).collect();
        eprintln!("Available scenarios: {}", names.join(", "));
        std::process::exit(1);
    });

    match run(&args, scenario) {
        Ok(report) => {
            if args.json {
                match report.to_json() {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("{}", e);
                        std::process::exit(1);
                    }
                }
            }
        }
        Err(e) => {
            error!("✗ {} failed: {}", scenario.name(), e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args, scenario: ScenarioId) -> Result<SimulationReport, SimError> {
    let mut config = scenario.config();
    if let Some(n) = args.participants {
        config = config.with_participants(n);
    }
    if let Some(q) = args.questions {
        config = config.with_questions(q);
    }
    if let Some(p) = args.answer_probability {
        config = config.with_answer_probability(p);
    }
    if let Some(t) = args.max_speak_secs {
        config = config.with_max_speak_secs(t);
    }
    if let Some(b) = args.news_probability {
        config = config.with_news_probability(b);
    }
    if let Some(ms) = args.pace_ms {
        config = config.with_pace(Duration::from_millis(ms));
    }

    info!("Scenario: {} ({})", scenario.name(), scenario.description());
    let random = scenario.random(args.seed)?;
    let report = Simulation::new(config, random)?
        .run()?
        .with_scenario(scenario.name());

    if let Some(path) = &args.export {
        report.write_to_file(path)?;
        info!("Exported {} events to {}", report.events.len(), path);
    }
    Ok(report)
}
