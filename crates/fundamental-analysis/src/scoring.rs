//! Composite scores: Piotroski F-Score and the Altman zone.

use analysis_core::{MetricsInput, RatioBundle, ScoreBundle};

use crate::ratios::RatioCalculator;

pub const INSUFFICIENT_DATA_REASON: &str = "insufficient data";

/// `numerator / denominator`, or 0.0 when the denominator is zero
fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator != 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

pub struct CompositeScorer;

impl CompositeScorer {
    pub fn score(input: &MetricsInput, ratios: &RatioBundle) -> ScoreBundle {
        let (f_score, f_score_reasons) = Self::piotroski_f_score(input);
        ScoreBundle {
            f_score,
            f_score_reasons,
            altman_zone: ratios.altman_z.map(RatioCalculator::classify_altman_zone),
        }
    }

    /// Piotroski F-Score (0-9) with the reason for each point awarded.
    ///
    /// Year-over-year criteria whose prior-period input is absent award no
    /// point. The dilution criterion has no share-count input and is always
    /// awarded.
    pub fn piotroski_f_score(input: &MetricsInput) -> (u8, Vec<String>) {
        let prev_total_assets = match input.prev_total_assets {
            Some(v) => v,
            None => return (0, vec![INSUFFICIENT_DATA_REASON.to_string()]),
        };

        let mut score = 0u8;
        let mut reasons = Vec::new();
        let mut award = |passed: bool, reason: &str| {
            if passed {
                score += 1;
                reasons.push(reason.to_string());
            }
        };

        // Profitability
        award(input.net_income > 0.0, "Positive net income");
        award(input.operating_cf > 0.0, "Positive operating cash flow");

        let roa = ratio_or_zero(input.net_income, input.total_assets);
        let roa_improved = input
            .prev_net_income
            .map_or(false, |prev| roa > ratio_or_zero(prev, prev_total_assets));
        award(roa_improved, "ROA improved");

        award(
            input.operating_cf > input.net_income,
            "Operating cash flow exceeds net income",
        );

        // Leverage & liquidity
        let leverage = ratio_or_zero(input.long_term_debt, input.total_assets);
        let leverage_held = input
            .prev_long_term_debt
            .map_or(false, |prev| leverage <= ratio_or_zero(prev, prev_total_assets));
        award(leverage_held, "Leverage not increased");

        let current_ratio = ratio_or_zero(input.current_assets, input.current_liabilities);
        let current_ratio_improved = match (input.prev_current_assets, input.prev_current_liabilities) {
            (Some(prev_ca), Some(prev_cl)) => current_ratio > ratio_or_zero(prev_ca, prev_cl),
            _ => false,
        };
        award(current_ratio_improved, "Current ratio improved");

        // TODO: score dilution once share counts are part of MetricsInput
        award(true, "No dilution (assumed)");

        // Operating efficiency
        let margin = ratio_or_zero(input.operating_income, input.revenue);
        let margin_improved = match (input.prev_operating_income, input.prev_revenue) {
            (Some(prev_oi), Some(prev_rev)) => margin > ratio_or_zero(prev_oi, prev_rev),
            _ => false,
        };
        award(margin_improved, "Operating margin improved");

        let turnover = ratio_or_zero(input.revenue, input.total_assets);
        let turnover_improved = input
            .prev_revenue
            .map_or(false, |prev| turnover > ratio_or_zero(prev, prev_total_assets));
        award(turnover_improved, "Asset turnover improved");

        (score, reasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::AltmanZone;

    fn improving_company() -> MetricsInput {
        MetricsInput {
            revenue: 1200.0,
            operating_income: 180.0,
            net_income: 100.0,
            total_assets: 1000.0,
            current_assets: 600.0,
            current_liabilities: 300.0,
            long_term_debt: 100.0,
            operating_cf: 150.0,
            prev_revenue: Some(1000.0),
            prev_operating_income: Some(120.0),
            prev_net_income: Some(60.0),
            prev_total_assets: Some(1000.0),
            prev_current_assets: Some(500.0),
            prev_current_liabilities: Some(300.0),
            prev_long_term_debt: Some(150.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_perfect_score() {
        let (score, reasons) = CompositeScorer::piotroski_f_score(&improving_company());
        assert_eq!(score, 9);
        assert_eq!(reasons.len(), 9);
        assert_eq!(reasons[0], "Positive net income");
        assert_eq!(reasons[6], "No dilution (assumed)");
        assert_eq!(reasons[8], "Asset turnover improved");
    }

    #[test]
    fn test_missing_prior_assets_is_insufficient() {
        let input = MetricsInput {
            prev_total_assets: None,
            ..improving_company()
        };
        let (score, reasons) = CompositeScorer::piotroski_f_score(&input);
        assert_eq!(score, 0);
        assert_eq!(reasons, vec!["insufficient data".to_string()]);
    }

    #[test]
    fn test_absent_prior_fields_award_nothing() {
        let input = MetricsInput {
            prev_total_assets: Some(1000.0),
            ..Default::default()
        };
        let (score, reasons) = CompositeScorer::piotroski_f_score(&input);
        // Only the assumed dilution point survives an all-zero input
        assert_eq!(score, 1);
        assert_eq!(reasons, vec!["No dilution (assumed)".to_string()]);
    }

    #[test]
    fn test_deteriorating_company_scores_low() {
        let input = MetricsInput {
            revenue: 800.0,
            operating_income: -50.0,
            net_income: -80.0,
            total_assets: 1000.0,
            current_assets: 300.0,
            current_liabilities: 400.0,
            long_term_debt: 400.0,
            operating_cf: -100.0,
            prev_revenue: Some(1000.0),
            prev_operating_income: Some(50.0),
            prev_net_income: Some(20.0),
            prev_total_assets: Some(1000.0),
            prev_current_assets: Some(400.0),
            prev_current_liabilities: Some(300.0),
            prev_long_term_debt: Some(200.0),
            ..Default::default()
        };
        let (score, _) = CompositeScorer::piotroski_f_score(&input);
        assert_eq!(score, 1);
    }

    #[test]
    fn test_score_bundle_zone_follows_altman_presence() {
        let input = improving_company();
        let ratios = RatioBundle {
            altman_z: Some(1.2),
            ..Default::default()
        };
        let bundle = CompositeScorer::score(&input, &ratios);
        assert_eq!(bundle.altman_zone, Some(AltmanZone::Distress));

        let bundle = CompositeScorer::score(&input, &RatioBundle::default());
        assert_eq!(bundle.altman_zone, None);
        assert_eq!(bundle.f_score, 9);
    }
}
