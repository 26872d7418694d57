use std::collections::BTreeMap;

use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::info;

use super::{ReportPayload, run_http_server, state_from_payload};
use crate::core::{HISTORY_SEED, build_report, budget_data, format_budget_summary};

#[derive(Parser, Debug)]
#[command(
    name = "budget-allocator",
    about = "Budget allocation analytics against industry benchmarks",
    version
)]
pub struct Cli {
    /// Seed for the synthesized allocation history
    #[arg(long, global = true, default_value_t = HISTORY_SEED)]
    pub seed: u64,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the budget payload and scenario reports over HTTP
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },

    /// Print the configuration summary
    Summary,

    /// Evaluate an allocation scenario and print the report as JSON
    Report {
        /// Total budget; must be one of the preset amounts
        #[arg(long)]
        budget: Option<f64>,
        /// Benchmark stage, e.g. "Series B"
        #[arg(long)]
        stage: Option<String>,
        /// Category override as id=percent, repeatable
        #[arg(long = "set", value_name = "ID=PERCENT", value_parser = parse_allocation)]
        allocations: Vec<(String, f64)>,
    },
}

fn parse_allocation(raw: &str) -> Result<(String, f64), String> {
    let (id, percent) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=PERCENT, got '{raw}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing category id in '{raw}'"));
    }
    let percent = percent
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid percent in '{raw}': {e}"))?;
    Ok((id.to_string(), percent))
}

pub async fn run(cli: Cli) -> Result<(), String> {
    let today = Local::now().date_naive();
    let data = budget_data(cli.seed, today);
    data.validate().map_err(|e| e.to_string())?;

    match cli.command {
        Command::Serve { host, port } => {
            info!(seed = cli.seed, %today, "starting server");
            run_http_server(&host, port, data)
                .await
                .map_err(|e| format!("server error: {e}"))
        }
        Command::Summary => {
            println!("{}", format_budget_summary(&data));
            Ok(())
        }
        Command::Report {
            budget,
            stage,
            allocations,
        } => {
            let payload = ReportPayload {
                budget,
                stage,
                allocations: Some(allocations.into_iter().collect::<BTreeMap<_, _>>()),
            };
            let state = state_from_payload(&data, payload)?;
            let report = build_report(&data, &state);
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("failed to encode report: {e}"))?;
            println!("{json}");
            Ok(())
        }
    }
}
