//! Campaign Dashboard. Computes KPI, channel and monthly tables from
//! campaign rows.
//!
//! Reads a JSON array of rows keyed by the spreadsheet column names and
//! writes the dashboard report as JSON.

use anyhow::Context;
use campaign_core::config::{AppConfig, LoggingConfig};
use campaign_core::types::RawCampaignRow;
use campaign_reporting::{DashboardBuilder, MetricsEngine, Section};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-dashboard")]
#[command(about = "Marketing campaign KPI and aggregation report")]
#[command(version)]
struct Cli {
    /// JSON file with an array of campaign rows (stdin when omitted)
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// TOML config file
    #[arg(long, env = "CAMPAIGN_DASHBOARD_CONFIG")]
    config: Option<String>,

    /// Impressions histogram bins (overrides config)
    #[arg(long, env = "CAMPAIGN_DASHBOARD__ENGINE__HISTOGRAM_BINS")]
    bins: Option<usize>,

    /// Report section to compute
    #[arg(long, value_enum, default_value_t = SectionArg::All)]
    section: SectionArg,

    /// List every field that failed coercion
    #[arg(long, default_value_t = false)]
    issues: bool,

    /// Pretty-print the JSON report
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Emit logs as JSON (overrides config)
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SectionArg {
    All,
    Kpis,
    Channels,
    Months,
}

impl From<SectionArg> for Section {
    fn from(arg: SectionArg) -> Self {
        match arg {
            SectionArg::All => Section::All,
            SectionArg::Kpis => Section::Kpis,
            SectionArg::Channels => Section::Channels,
            SectionArg::Months => Section::Months,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, load_error) = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    if cli.json_logs {
        config.logging.json = true;
    }
    init_tracing(&config.logging);

    if let Some(e) = load_error {
        if cli.config.is_some() {
            return Err(e).context("Failed to load config file");
        }
        warn!(error = %e, "Failed to load config, using defaults");
    }

    // Apply CLI overrides
    if let Some(bins) = cli.bins {
        config.engine.histogram_bins = bins;
    }

    let rows = read_rows(cli.input.as_deref())?;
    info!(rows = rows.len(), "Campaign rows loaded");

    let engine = MetricsEngine::new(config.engine);
    let report = DashboardBuilder::new(&engine)
        .section(cli.section.into())
        .include_issues(cli.issues)
        .build(&rows)
        .context("Failed to build dashboard report")?;

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    if cli.pretty {
        serde_json::to_writer_pretty(&mut out, &report)?;
    } else {
        serde_json::to_writer(&mut out, &report)?;
    }
    writeln!(out)?;
    out.flush()?;

    info!(records = report.record_count, issues = report.issue_count, "Report written");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.as_str().into());
    // stdout carries the report
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_rows(path: Option<&Path>) -> anyhow::Result<Vec<RawCampaignRow>> {
    let rows = match path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse rows from {}", path.display()))?
        }
        None => serde_json::from_reader(std::io::stdin().lock()).context("Failed to parse rows from stdin")?,
    };
    Ok(rows)
}
