use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use dotenv::dotenv;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cleaning_cell::{load_and_clean, write_processed};
use dashboard_cell::{
    compute_breakdown, compute_metrics, DashboardFilter, DashboardMetrics, DashboardQuery,
    GroupBy, GroupMetrics,
};
use shared_config::AppConfig;

const DEFAULT_PROCESSED_PATH: &str = "data/processed/appointments_clean.csv";

#[derive(Debug, Serialize)]
struct SummaryOutput {
    source: PathBuf,
    filter: DashboardFilter,
    metrics: DashboardMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_by: Option<GroupBy>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    groups: Vec<GroupMetrics>,
}

fn filter_args() -> Vec<Arg> {
    vec![
        Arg::new("start-date")
            .long("start-date")
            .help("First scheduled date to include (YYYY-MM-DD)"),
        Arg::new("end-date")
            .long("end-date")
            .help("Last scheduled date to include (YYYY-MM-DD)"),
        Arg::new("clinic").long("clinic").help("Clinic id"),
        Arg::new("provider").long("provider").help("Provider id"),
        Arg::new("appointment-type")
            .long("appointment-type")
            .help("Appointment type, any accepted spelling"),
        Arg::new("status").long("status").help("Status, any accepted spelling"),
    ]
}

fn build_cli() -> Command {
    let input = Arg::new("input")
        .long("input")
        .value_parser(value_parser!(PathBuf))
        .help("Raw appointments CSV (defaults to RAW_DATA_PATH)");

    Command::new("appointments")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Clean raw appointment extracts and summarize operations metrics")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("clean")
                .about("Clean the raw file, write the processed dataset, print the quality report")
                .arg(input.clone())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .value_parser(value_parser!(PathBuf))
                        .help("Processed output path, .csv or .json (defaults to PROCESSED_DATA_PATH)"),
                ),
        )
        .subcommand(
            Command::new("summary")
                .about("Print dashboard metrics for the cleaned dataset as JSON")
                .arg(input)
                .args(filter_args())
                .arg(
                    Arg::new("group-by")
                        .long("group-by")
                        .help("clinic, provider, appointment_type, visit_modality, insurance_type or day"),
                ),
        )
}

fn query_from(matches: &ArgMatches) -> DashboardQuery {
    let get = |name: &str| matches.get_one::<String>(name).cloned();
    DashboardQuery {
        start_date: get("start-date"),
        end_date: get("end-date"),
        clinic_id: get("clinic"),
        provider_id: get("provider"),
        appointment_type: get("appointment-type"),
        status: get("status"),
    }
}

fn input_path(matches: &ArgMatches, config: &AppConfig) -> PathBuf {
    matches
        .get_one::<PathBuf>("input")
        .cloned()
        .unwrap_or_else(|| config.raw_data_path.clone())
}

fn run_clean(matches: &ArgMatches, config: &AppConfig) -> Result<()> {
    let input = input_path(matches, config);
    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .or_else(|| config.processed_data_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROCESSED_PATH));

    let dataset = load_and_clean(&input).with_context(|| format!("failed to clean {}", input.display()))?;
    write_processed(&dataset.records, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!("{} -> {} ({} rows)", input.display(), output.display(), dataset.len());
    print_json(&dataset.report)
}

fn run_summary(matches: &ArgMatches, config: &AppConfig) -> Result<()> {
    let input = input_path(matches, config);
    let filter = DashboardFilter::from_query(&query_from(matches))?;
    let group_by = matches
        .get_one::<String>("group-by")
        .map(|raw| raw.parse::<GroupBy>())
        .transpose()?;

    let dataset = load_and_clean(&input).with_context(|| format!("failed to clean {}", input.display()))?;

    let output = SummaryOutput {
        metrics: compute_metrics(&dataset.records, &filter),
        groups: group_by
            .map(|g| compute_breakdown(&dataset.records, &filter, g))
            .unwrap_or_default(),
        group_by,
        filter,
        source: input,
    };
    print_json(&output)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing() {
    // stdout carries the JSON output, logs go to stderr.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env();
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("clean", sub)) => run_clean(sub, &config),
        Some(("summary", sub)) => run_summary(sub, &config),
        _ => unreachable!("subcommand_required is set"),
    }
}
