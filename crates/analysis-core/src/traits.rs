use crate::{FundamentalReport, MetricsInput};

/// Trait for fundamental metrics engines.
///
/// Implementations are pure: the same input always yields the same report,
/// so callers may fan out across companies freely.
pub trait FundamentalAnalyzer: Send + Sync {
    fn analyze(&self, input: &MetricsInput) -> FundamentalReport;
}
