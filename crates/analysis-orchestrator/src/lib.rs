use analysis_core::{
    AnalysisError, AnalysisRecord, CompanySnapshot, FundamentalAnalyzer, FundamentalReport,
};
use anyhow::Context;
use chrono::NaiveDate;
use fundamental_analysis::FundamentalAnalysisEngine;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub mod config;
pub use config::OrchestratorConfig;

/// One company's analysis, ready for persistence and presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyAnalysis {
    pub symbol: String,
    pub name: Option<String>,
    pub analysis_date: NaiveDate,
    pub report: FundamentalReport,
    pub record: AnalysisRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub symbol: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Successful analyses, in input order
    pub analyses: Vec<CompanyAnalysis>,
    pub failures: Vec<BatchFailure>,
}

/// Fans analyses out across companies. The engine itself is synchronous and
/// holds no state, so each company runs as its own task.
pub struct AnalysisOrchestrator {
    analyzer: Arc<dyn FundamentalAnalyzer>,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
}

impl AnalysisOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        let engine = FundamentalAnalysisEngine::with_assumptions(config.assumptions);
        Self::with_analyzer(Arc::new(engine), config.concurrency)
    }

    pub fn with_analyzer(analyzer: Arc<dyn FundamentalAnalyzer>, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            analyzer,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Validate and analyze a single snapshot
    pub fn analyze_one(&self, snapshot: &CompanySnapshot) -> Result<CompanyAnalysis, AnalysisError> {
        analyze_snapshot(self.analyzer.as_ref(), snapshot)
    }

    /// Analyze every snapshot concurrently. A failing company is logged and
    /// reported in `failures`; it never aborts the rest of the batch.
    pub async fn analyze_batch(&self, snapshots: Vec<CompanySnapshot>) -> BatchOutcome {
        let total = snapshots.len();
        tracing::info!(
            "Starting batch analysis of {} companies (concurrency: {})",
            total,
            self.concurrency
        );

        let mut symbols = Vec::with_capacity(total);
        let mut tasks = JoinSet::new();

        for (index, snapshot) in snapshots.into_iter().enumerate() {
            symbols.push(snapshot.symbol.clone());
            let analyzer = Arc::clone(&self.analyzer);
            let semaphore = Arc::clone(&self.semaphore);

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => analyze_snapshot(analyzer.as_ref(), &snapshot),
                    Err(_) => Err(AnalysisError::Configuration(
                        "analysis semaphore closed".to_string(),
                    )),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<CompanyAnalysis, String>>> =
            (0..total).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    slots[index] = Some(result.map_err(|e| e.to_string()));
                }
                Err(e) => {
                    tracing::error!("Analysis task error: {}", e);
                }
            }
        }

        let mut outcome = BatchOutcome::default();
        for (symbol, slot) in symbols.into_iter().zip(slots) {
            match slot {
                Some(Ok(analysis)) => outcome.analyses.push(analysis),
                Some(Err(error)) => {
                    tracing::warn!("Failed to analyze {}: {}", symbol, error);
                    outcome.failures.push(BatchFailure { symbol, error });
                }
                None => {
                    outcome.failures.push(BatchFailure {
                        symbol,
                        error: "analysis task did not complete".to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Batch complete: {}/{} analyzed, {} failed",
            outcome.analyses.len(),
            total,
            outcome.failures.len()
        );
        outcome
    }
}

impl Default for AnalysisOrchestrator {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}

fn analyze_snapshot(
    analyzer: &dyn FundamentalAnalyzer,
    snapshot: &CompanySnapshot,
) -> Result<CompanyAnalysis, AnalysisError> {
    if snapshot.symbol.trim().is_empty() {
        return Err(AnalysisError::InvalidData("symbol must not be empty".to_string()));
    }
    snapshot.metrics.validate()?;

    let report = analyzer.analyze(&snapshot.metrics);
    let record = AnalysisRecord::from_report(snapshot, &report);
    tracing::debug!(
        "{}: state={} risk={} f_score={}",
        snapshot.symbol,
        report.diagnosis.state.to_label(),
        report.diagnosis.risk_level.as_str(),
        report.scores.f_score
    );

    Ok(CompanyAnalysis {
        symbol: snapshot.symbol.clone(),
        name: snapshot.name.clone(),
        analysis_date: snapshot.analysis_date,
        report,
        record,
    })
}

/// Parse a JSON array of company snapshots
pub fn parse_snapshots(json: &str) -> Result<Vec<CompanySnapshot>, AnalysisError> {
    Ok(serde_json::from_str(json)?)
}

/// Read a JSON array of company snapshots from disk
pub fn load_snapshots(path: &Path) -> anyhow::Result<Vec<CompanySnapshot>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshots from {}", path.display()))?;
    let snapshots = parse_snapshots(&raw)
        .with_context(|| format!("Failed to parse snapshots in {}", path.display()))?;
    tracing::info!("Loaded {} snapshots from {}", snapshots.len(), path.display());
    Ok(snapshots)
}
