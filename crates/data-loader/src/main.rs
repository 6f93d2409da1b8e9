//! data-loader: analyze company snapshots and print the diagnostic reports.
//!
//! Reads a JSON array of company snapshots, runs every company through the
//! fundamental analysis pipeline and prints the result. An optional portfolio
//! file (`[{"symbol": ..., "quantity": ...}]`) is joined with the analyzed
//! snapshots to produce a portfolio-level diagnosis.
//!
//! Usage:
//!   cargo run -p data-loader -- --input snapshots.json
//!   cargo run -p data-loader -- --input snapshots.json --format json
//!   cargo run -p data-loader -- --input snapshots.json --records
//!   cargo run -p data-loader -- --input snapshots.json --portfolio holdings.json

use analysis_orchestrator::{
    load_snapshots, AnalysisOrchestrator, BatchOutcome, CompanyAnalysis, OrchestratorConfig,
};
use anyhow::{bail, Context};
use portfolio_manager::{Holding, PortfolioAnalyzer, PortfolioDiagnosis, PortfolioEntry};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
struct CliArgs {
    input: PathBuf,
    portfolio: Option<PathBuf>,
    format: OutputFormat,
    records: bool,
}

impl CliArgs {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let value_of = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .filter(|v| !v.starts_with("--"))
        };

        let input = match value_of("--input") {
            Some(path) => PathBuf::from(path),
            None => bail!("--input <snapshots.json> is required"),
        };

        let format = match value_of("--format").map(String::as_str) {
            None | Some("text") => OutputFormat::Text,
            Some("json") => OutputFormat::Json,
            Some(other) => bail!("unknown format {:?} (expected text or json)", other),
        };

        let portfolio = value_of("--portfolio").map(PathBuf::from);
        let records = args.iter().any(|a| a == "--records");
        if records && portfolio.is_some() {
            bail!("--records prints per-company rows only and cannot be combined with --portfolio");
        }

        Ok(Self {
            input,
            portfolio,
            format,
            records,
        })
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    outcome: &'a BatchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    portfolio: Option<&'a PortfolioDiagnosis>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  data-loader --input <snapshots.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --portfolio PATH      Holdings file [{{\"symbol\", \"quantity\"}}] to diagnose");
    eprintln!("  --format text|json    Output format (default: text)");
    eprintln!("  --records             Print flat persistence records instead of reports");
    eprintln!("                        (not combinable with --portfolio)");
}

fn init_tracing() {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("data_loader=info,analysis_orchestrator=info")
        })
    };
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // Logs go to stderr so stdout stays parseable
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    let config = OrchestratorConfig::from_env().context("Invalid analysis configuration")?;
    tracing::info!(
        "data-loader: input={}, format={:?}, concurrency={}",
        cli.input.display(),
        cli.format,
        config.concurrency
    );

    let snapshots = load_snapshots(&cli.input)?;
    let orchestrator = AnalysisOrchestrator::new(config);
    let outcome = orchestrator.analyze_batch(snapshots).await;

    let portfolio = match &cli.portfolio {
        Some(path) => {
            let entries = load_portfolio(path)?;
            let holdings = build_holdings(&entries, &outcome.analyses);
            Some(PortfolioAnalyzer::analyze(&holdings))
        }
        None => None,
    };

    if cli.records {
        let records: Vec<_> = outcome.analyses.iter().map(|a| &a.record).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    match cli.format {
        OutputFormat::Json => {
            let output = JsonOutput {
                outcome: &outcome,
                portfolio: portfolio.as_ref(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            for analysis in &outcome.analyses {
                println!("{}", render_company(analysis));
            }
            for failure in &outcome.failures {
                println!("FAILED {}: {}\n", failure.symbol, failure.error);
            }
            if let Some(diagnosis) = &portfolio {
                println!("{}", render_portfolio(diagnosis));
            }
        }
    }

    Ok(())
}

fn load_portfolio(path: &Path) -> anyhow::Result<Vec<PortfolioEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read portfolio from {}", path.display()))?;
    let entries: Vec<PortfolioEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse portfolio in {}", path.display()))?;
    tracing::info!("Loaded {} portfolio entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Join portfolio entries with their analyses. Entries without an analysis
/// are skipped with a warning.
fn build_holdings(entries: &[PortfolioEntry], analyses: &[CompanyAnalysis]) -> Vec<Holding> {
    let by_symbol: HashMap<&str, &CompanyAnalysis> =
        analyses.iter().map(|a| (a.symbol.as_str(), a)).collect();

    entries
        .iter()
        .filter_map(|entry| match by_symbol.get(entry.symbol.as_str()) {
            Some(analysis) => Some(Holding {
                symbol: entry.symbol.clone(),
                name: analysis.name.clone(),
                quantity: entry.quantity,
                stock_price: analysis.record.stock_price,
                tags: analysis.report.tags,
            }),
            None => {
                tracing::warn!("No analysis for portfolio symbol {}, skipping", entry.symbol);
                None
            }
        })
        .collect()
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

fn render_company(analysis: &CompanyAnalysis) -> String {
    let report = &analysis.report;
    let mut out = String::new();

    let title = match &analysis.name {
        Some(name) => format!("{} {}", analysis.symbol, name),
        None => analysis.symbol.clone(),
    };
    out.push_str(&format!("=== {} ({}) ===\n", title, analysis.analysis_date));
    out.push_str(&format!(
        "State: {} | Expectation: {} | Risk: {}\n",
        report.diagnosis.state.to_label(),
        report.diagnosis.expectation.to_label(),
        report.diagnosis.risk_level.as_str()
    ));
    if !report.diagnosis.risk_reasons.is_empty() {
        out.push_str(&format!(
            "Risk reasons: {}\n",
            report.diagnosis.risk_reasons.join(", ")
        ));
    }

    let zone = report
        .scores
        .altman_zone
        .map(|z| format!(" ({})", z))
        .unwrap_or_default();
    out.push_str(&format!(
        "F-Score: {}/9 | Altman Z: {}{} | ICR: {} | PER: {}\n",
        report.scores.f_score,
        fmt_opt(report.ratios.altman_z),
        zone,
        fmt_opt(report.ratios.interest_coverage),
        fmt_opt(report.ratios.per)
    ));

    let tags: Vec<&str> = report.tags.active().iter().map(|t| t.to_label()).collect();
    if tags.is_empty() {
        out.push_str("Tags: none\n");
    } else {
        out.push_str(&format!("Tags: {}\n", tags.join(", ")));
    }

    for card in &report.narrative {
        out.push_str(&format!(
            "[{} {}] {}\n    {}\n    -> {}\n",
            card.card_type.as_str().to_uppercase(),
            card.severity,
            card.title,
            card.body,
            card.advice
        ));
    }
    out
}

fn render_portfolio(diagnosis: &PortfolioDiagnosis) -> String {
    let mut out = String::new();
    out.push_str("=== Portfolio ===\n");
    out.push_str(&format!("Total value: {:.0}\n", diagnosis.total_value));
    out.push_str(&format!("Health score: {}/100\n", diagnosis.health_score));
    out.push_str(&format!("{}\n", diagnosis.diagnosis_summary));

    if !diagnosis.category_exposure.is_empty() {
        let categories: Vec<String> = diagnosis
            .category_exposure
            .iter()
            .map(|(category, share)| format!("{} {:.1}%", category.as_str(), share))
            .collect();
        out.push_str(&format!("Categories: {}\n", categories.join(", ")));
    }

    for dependency in &diagnosis.narrative_analysis {
        out.push_str(&format!(
            "  {:<36} {:>5.1}%\n",
            dependency.label, dependency.dependency_score
        ));
    }
    out
}
