//! Diagnostic layering: corporate state, market expectation structure and
//! risk assessment. The three classifiers are independent of each other.

use analysis_core::{
    AltmanZone, CorporateState, Diagnosis, MarketExpectation, RatioBundle, RiskLevel, ScoreBundle,
};

pub const ACCRUALS_WARNING_THRESHOLD: f64 = 0.15;

pub struct DiagnosticLayering;

impl DiagnosticLayering {
    pub fn diagnose(ratios: &RatioBundle, scores: &ScoreBundle) -> Diagnosis {
        let has_fcf = ratios.core_fcf > 0.0;
        let (risk_level, risk_reasons) =
            Self::risk_assessment(scores.altman_zone, scores.f_score, ratios.accruals_ratio);

        Diagnosis {
            state: Self::corporate_state(scores.f_score, scores.altman_zone, has_fcf),
            expectation: Self::market_expectation(
                ratios.reality_gap,
                ratios.implied_revenue_growth,
                has_fcf,
            ),
            risk_level,
            risk_reasons,
        }
    }

    /// First matching rule wins.
    pub fn corporate_state(
        f_score: u8,
        altman_zone: Option<AltmanZone>,
        has_fcf: bool,
    ) -> CorporateState {
        if altman_zone == Some(AltmanZone::Distress) {
            CorporateState::FinancialDistress
        } else if f_score <= 3 {
            CorporateState::Deteriorating
        } else if f_score >= 5 && has_fcf {
            CorporateState::CashGenerator
        } else if f_score >= 5 {
            CorporateState::HighGrowth
        } else {
            CorporateState::Neutral
        }
    }

    /// A cash-less company priced for >25% growth is a single-engine story
    /// regardless of the reality gap. Absent gaps fall through to Reasonable.
    pub fn market_expectation(
        reality_gap: Option<f64>,
        implied_revenue_growth: Option<f64>,
        has_fcf: bool,
    ) -> MarketExpectation {
        if !has_fcf && implied_revenue_growth.map_or(false, |g| g > 25.0) {
            return MarketExpectation::SingleEngine;
        }
        match reality_gap {
            Some(gap) if gap > 20.0 => MarketExpectation::Overheated,
            Some(gap) if gap < -10.0 => MarketExpectation::Underestimated,
            Some(gap) if gap > 10.0 => MarketExpectation::Optimistic,
            _ => MarketExpectation::Reasonable,
        }
    }

    /// Reasons accumulate across every triggered condition; the level is the
    /// most severe one triggered.
    pub fn risk_assessment(
        altman_zone: Option<AltmanZone>,
        f_score: u8,
        accruals_ratio: f64,
    ) -> (RiskLevel, Vec<String>) {
        let mut level = RiskLevel::Low;
        let mut reasons = Vec::new();

        if altman_zone == Some(AltmanZone::Distress) {
            reasons.push("Bankruptcy Risk".to_string());
            level = level.max(RiskLevel::Critical);
        }
        if f_score <= 3 {
            reasons.push("Weak Fundamentals".to_string());
            level = level.max(RiskLevel::High);
        }
        if accruals_ratio > ACCRUALS_WARNING_THRESHOLD {
            reasons.push("Low Earnings Quality".to_string());
            level = level.max(RiskLevel::Medium);
        }

        (level, reasons)
    }
}
