pub mod assumptions;
pub mod diagnosis;
pub mod narrative;
pub mod ratios;
pub mod scoring;
pub mod sector;
pub mod tags;

pub use assumptions::EngineAssumptions;
pub use diagnosis::DiagnosticLayering;
pub use narrative::{NarrativeContext, NarrativeEngine};
pub use ratios::RatioCalculator;
pub use scoring::CompositeScorer;
pub use tags::TagClassifier;

use analysis_core::{FundamentalAnalyzer, FundamentalReport, MetricsInput};

/// Runs the full pipeline for one company: ratios, composite scores,
/// character tags, diagnosis and narrative cards.
///
/// Pure and synchronous. The same input always produces the same report.
pub struct FundamentalAnalysisEngine {
    assumptions: EngineAssumptions,
}

impl FundamentalAnalysisEngine {
    pub fn new() -> Self {
        Self::with_assumptions(EngineAssumptions::default())
    }

    pub fn with_assumptions(assumptions: EngineAssumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &EngineAssumptions {
        &self.assumptions
    }

    pub fn analyze(&self, input: &MetricsInput) -> FundamentalReport {
        let ratios = RatioCalculator::calculate(input, &self.assumptions);
        let scores = CompositeScorer::score(input, &ratios);
        let tags = TagClassifier::classify(input, &ratios, &scores);
        let diagnosis = DiagnosticLayering::diagnose(&ratios, &scores);
        let narrative = NarrativeEngine::generate(&NarrativeContext {
            input,
            ratios: &ratios,
            scores: &scores,
            tags: &tags,
            diagnosis: &diagnosis,
        });

        tracing::debug!(
            sector = %input.sector,
            f_score = scores.f_score,
            altman_zone = ?scores.altman_zone,
            state = diagnosis.state.to_label(),
            risk = diagnosis.risk_level.as_str(),
            tags = tags.active().len(),
            cards = narrative.len(),
            "Fundamental analysis complete"
        );

        FundamentalReport {
            ratios,
            scores,
            tags,
            diagnosis,
            narrative,
        }
    }
}

impl FundamentalAnalyzer for FundamentalAnalysisEngine {
    fn analyze(&self, input: &MetricsInput) -> FundamentalReport {
        FundamentalAnalysisEngine::analyze(self, input)
    }
}

impl Default for FundamentalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
