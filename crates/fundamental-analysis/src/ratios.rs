//! Individual financial ratios.
//!
//! Every function here is total: a guard failure yields `None` (or the
//! documented 0.0 fallback), never a panic.

use analysis_core::{AltmanZone, DupontBreakdown, MetricsInput, RatioBundle};

use crate::assumptions::EngineAssumptions;
use crate::sector;

pub const ALTMAN_DISTRESS_THRESHOLD: f64 = 1.81;
pub const ALTMAN_SAFE_THRESHOLD: f64 = 2.99;

/// ROIIC reported when capital shrank while operating income grew.
/// A display cap meaning "very high capital efficiency", not a measured ratio.
pub const ROIIC_EFFICIENCY_CAP: f64 = 1.0;

/// Equity duration reported when the discount rate does not exceed the
/// implied growth rate. A display cap, not a measured duration.
pub const EQUITY_DURATION_CAP: f64 = 50.0;

/// Required return and terminal growth of the PSR terminal-value model
pub const TERMINAL_REQUIRED_RETURN: f64 = 0.07;
pub const TERMINAL_GROWTH: f64 = 0.02;
pub const TERMINAL_HORIZON_YEARS: f64 = 5.0;

pub struct RatioCalculator;

impl RatioCalculator {
    /// Compute every ratio for one input
    pub fn calculate(input: &MetricsInput, assumptions: &EngineAssumptions) -> RatioBundle {
        let implied_revenue_growth = Self::implied_revenue_growth(input);
        let actual_revenue_growth = Self::actual_revenue_growth(input);

        RatioBundle {
            altman_z: Self::altman_z_score(input),
            interest_coverage: Self::interest_coverage(input),
            accruals_ratio: Self::accruals_ratio(input),
            earnings_quality: Self::earnings_quality(input),
            delta_noa: Self::delta_noa(input),
            inventory_quality: Self::inventory_quality(input),
            gross_profitability: Self::gross_profitability(input),
            cbop: Self::cbop(input),
            roiic: Self::roiic(input),
            reinvestment_rate: Self::reinvestment_rate(input),
            dupont: Self::dupont_breakdown(input),
            implied_growth_rate: Self::implied_growth_rate(input, assumptions),
            equity_duration: Self::equity_duration_proxy(input, assumptions),
            target_margin: sector::target_margin(&input.sector),
            implied_revenue_growth,
            actual_revenue_growth,
            reality_gap: Self::reality_gap(implied_revenue_growth, actual_revenue_growth),
            operating_margin: Self::operating_margin(input),
            ocf_margin: Self::ocf_margin(input),
            core_fcf: Self::core_fcf(input),
            core_fcf_margin: Self::core_fcf_margin(input),
            equity_ratio: Self::equity_ratio(input),
            operating_margin_improved: Self::operating_margin_improved(input),
            per: Self::per(input),
            pbr: Self::pbr(input),
        }
    }

    // --- Safety & risk ---

    /// Altman Z-Score: 1.2A + 1.4B + 3.3C + 0.6D + 1.0E
    pub fn altman_z_score(input: &MetricsInput) -> Option<f64> {
        if sector::is_altman_excluded(&input.sector) {
            return None;
        }
        if input.total_assets <= 0.0 || input.current_liabilities <= 0.0 {
            return None;
        }
        let total_liabilities = input.long_term_debt + input.current_liabilities;
        if total_liabilities == 0.0 {
            return None;
        }

        let a = (input.current_assets - input.current_liabilities) / input.total_assets;
        let b = input.retained_earnings / input.total_assets;
        let c = input.ebit / input.total_assets;
        let d = input.market_cap / total_liabilities;
        let e = input.revenue / input.total_assets;

        Some(1.2 * a + 1.4 * b + 3.3 * c + 0.6 * d + 1.0 * e)
    }

    pub fn classify_altman_zone(z: f64) -> AltmanZone {
        if z < ALTMAN_DISTRESS_THRESHOLD {
            AltmanZone::Distress
        } else if z < ALTMAN_SAFE_THRESHOLD {
            AltmanZone::Grey
        } else {
            AltmanZone::Safe
        }
    }

    /// EBIT / |interest expense|. Zero interest is "no debt or no data", not
    /// infinite coverage.
    pub fn interest_coverage(input: &MetricsInput) -> Option<f64> {
        // Providers report interest expense with either sign
        let interest = input.interest_expense.abs();
        if interest == 0.0 {
            return None;
        }
        Some(input.ebit / interest)
    }

    // --- Quality of earnings ---

    /// Sloan accruals: (net income - operating CF) / total assets.
    /// Falls back to 0.0 so the signal never drops out.
    pub fn accruals_ratio(input: &MetricsInput) -> f64 {
        if input.total_assets == 0.0 {
            return 0.0;
        }
        (input.net_income - input.operating_cf) / input.total_assets
    }

    pub fn earnings_quality(input: &MetricsInput) -> Option<f64> {
        if input.net_income == 0.0 {
            return None;
        }
        Some(input.operating_cf / input.net_income)
    }

    /// Change in net operating (working) assets, scaled by total assets
    pub fn delta_noa(input: &MetricsInput) -> Option<f64> {
        let (prev_ca, prev_cl) = (input.prev_current_assets?, input.prev_current_liabilities?);
        if input.total_assets == 0.0 {
            return None;
        }
        let noa = input.current_assets - input.current_liabilities;
        let prev_noa = prev_ca - prev_cl;
        Some((noa - prev_noa) / input.total_assets)
    }

    /// Inventory growth minus revenue growth
    pub fn inventory_quality(input: &MetricsInput) -> Option<f64> {
        let prev_inventory = input.prev_inventory.filter(|v| *v != 0.0)?;
        let prev_revenue = input.prev_revenue.filter(|v| *v != 0.0)?;

        let inventory_growth = (input.inventory - prev_inventory) / prev_inventory;
        let revenue_growth = (input.revenue - prev_revenue) / prev_revenue;
        Some(inventory_growth - revenue_growth)
    }

    // --- Quality of growth & structure ---

    pub fn gross_profitability(input: &MetricsInput) -> f64 {
        if input.total_assets == 0.0 {
            return 0.0;
        }
        input.operating_income / input.total_assets
    }

    /// Cash-based operating profitability
    pub fn cbop(input: &MetricsInput) -> f64 {
        if input.total_assets == 0.0 {
            return 0.0;
        }
        input.operating_cf / input.total_assets
    }

    /// Return on incremental invested capital
    pub fn roiic(input: &MetricsInput) -> Option<f64> {
        let prev_income = input.prev_operating_income?;
        let prev_capital = input.prev_total_assets?;

        let delta_income = input.operating_income - prev_income;
        let delta_capital = input.total_assets - prev_capital;

        if delta_capital > 0.0 {
            Some(delta_income / delta_capital)
        } else if delta_income > 0.0 {
            Some(ROIIC_EFFICIENCY_CAP)
        } else {
            None
        }
    }

    /// (|capex| - |depreciation|) / operating CF
    pub fn reinvestment_rate(input: &MetricsInput) -> Option<f64> {
        if input.operating_cf == 0.0 {
            return None;
        }
        // Capex and depreciation arrive with either sign depending on the provider
        let capex = input.capex.abs();
        let depreciation = input.depreciation.abs();
        Some((capex - depreciation) / input.operating_cf)
    }

    pub fn dupont_breakdown(input: &MetricsInput) -> Option<DupontBreakdown> {
        if input.total_equity == 0.0 || input.total_assets == 0.0 || input.revenue == 0.0 {
            return None;
        }
        Some(DupontBreakdown {
            net_profit_margin: input.net_income / input.revenue,
            asset_turnover: input.revenue / input.total_assets,
            financial_leverage: input.total_assets / input.total_equity,
            roe: input.net_income / input.total_equity,
        })
    }

    // --- Expectation ---

    /// Reverse-DCF growth rate (percent) the market cap implies, from
    /// cost_of_equity - FCF yield.
    pub fn implied_growth_rate(input: &MetricsInput, assumptions: &EngineAssumptions) -> Option<f64> {
        if input.market_cap <= 0.0 {
            return None;
        }
        let fcf = Self::core_fcf(input);
        if fcf <= 0.0 {
            return None;
        }
        let cost_of_equity = assumptions.cost_of_equity(input.beta);
        Some((cost_of_equity - fcf / input.market_cap) * 100.0)
    }

    /// Interest-rate sensitivity, 1 / (discount_rate - g)
    pub fn equity_duration_proxy(input: &MetricsInput, assumptions: &EngineAssumptions) -> Option<f64> {
        let g = Self::implied_growth_rate(input, assumptions)? / 100.0;
        if assumptions.discount_rate <= g {
            return Some(EQUITY_DURATION_CAP);
        }
        Some(1.0 / (assumptions.discount_rate - g))
    }

    /// Annual revenue growth (percent) implied by the price-to-sales ratio
    /// under a five-year terminal-value model.
    ///
    /// A negative base yields 0.0 rather than `None`; a non-finite result
    /// yields `None`.
    pub fn implied_revenue_growth(input: &MetricsInput) -> Option<f64> {
        if input.revenue <= 0.0 || input.market_cap <= 0.0 {
            return None;
        }
        let psr = input.market_cap / input.revenue;
        let target_margin = sector::target_margin(&input.sector);
        let base = psr * (TERMINAL_REQUIRED_RETURN - TERMINAL_GROWTH) / target_margin;
        if base < 0.0 {
            return Some(0.0);
        }
        let implied = base.powf(1.0 / TERMINAL_HORIZON_YEARS) - 1.0;
        if !implied.is_finite() {
            return None;
        }
        Some(implied * 100.0)
    }

    pub fn actual_revenue_growth(input: &MetricsInput) -> Option<f64> {
        let prev_revenue = input.prev_revenue.filter(|v| *v != 0.0)?;
        Some((input.revenue - prev_revenue) / prev_revenue * 100.0)
    }

    /// Implied minus actual revenue growth, in percentage points
    pub fn reality_gap(implied: Option<f64>, actual: Option<f64>) -> Option<f64> {
        Some(implied? - actual?)
    }

    // --- Margins, cash and multiples ---

    pub fn operating_margin(input: &MetricsInput) -> Option<f64> {
        if input.revenue > 0.0 {
            Some(input.operating_income / input.revenue * 100.0)
        } else {
            None
        }
    }

    pub fn ocf_margin(input: &MetricsInput) -> Option<f64> {
        if input.revenue > 0.0 {
            Some(input.operating_cf / input.revenue * 100.0)
        } else {
            None
        }
    }

    /// Operating CF minus capital expenditure
    pub fn core_fcf(input: &MetricsInput) -> f64 {
        input.operating_cf - input.capex.abs()
    }

    pub fn core_fcf_margin(input: &MetricsInput) -> Option<f64> {
        if input.revenue > 0.0 {
            Some(Self::core_fcf(input) / input.revenue * 100.0)
        } else {
            None
        }
    }

    pub fn equity_ratio(input: &MetricsInput) -> Option<f64> {
        if input.total_assets > 0.0 {
            Some(input.total_equity / input.total_assets * 100.0)
        } else {
            None
        }
    }

    /// Whether operating margin rose year over year
    pub fn operating_margin_improved(input: &MetricsInput) -> Option<bool> {
        let current = Self::operating_margin(input)?;
        let prev_revenue = input.prev_revenue.filter(|v| *v > 0.0)?;
        let prev_income = input.prev_operating_income?;
        Some(current > prev_income / prev_revenue * 100.0)
    }

    pub fn per(input: &MetricsInput) -> Option<f64> {
        if input.market_cap > 0.0 && input.net_income > 0.0 {
            Some(input.market_cap / input.net_income)
        } else {
            None
        }
    }

    pub fn pbr(input: &MetricsInput) -> Option<f64> {
        if input.market_cap > 0.0 && input.total_equity > 0.0 {
            Some(input.market_cap / input.total_equity)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn retailer() -> MetricsInput {
        MetricsInput {
            total_assets: 1000.0,
            current_liabilities: 200.0,
            current_assets: 500.0,
            long_term_debt: 100.0,
            retained_earnings: 300.0,
            ebit: 150.0,
            revenue: 800.0,
            market_cap: 1200.0,
            sector: "Retail Trade".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_altman_z_worked_example() {
        let z = RatioCalculator::altman_z_score(&retailer()).unwrap();
        assert_relative_eq!(z, 4.475, epsilon = 1e-9);
        assert_eq!(RatioCalculator::classify_altman_zone(z), AltmanZone::Safe);
    }

    #[test]
    fn test_altman_excluded_sectors() {
        for sector in ["Bank", "Securities & Financial", "Insurance"] {
            let input = MetricsInput {
                sector: sector.to_string(),
                ..retailer()
            };
            assert!(RatioCalculator::altman_z_score(&input).is_none(), "{sector}");
        }
    }

    #[test]
    fn test_altman_guards() {
        let input = MetricsInput { total_assets: 0.0, ..retailer() };
        assert!(RatioCalculator::altman_z_score(&input).is_none());

        let input = MetricsInput { current_liabilities: -5.0, ..retailer() };
        assert!(RatioCalculator::altman_z_score(&input).is_none());

        // Negative long-term debt cancelling current liabilities
        let input = MetricsInput { long_term_debt: -200.0, ..retailer() };
        assert!(RatioCalculator::altman_z_score(&input).is_none());
    }

    #[test]
    fn test_altman_zone_boundaries() {
        assert_eq!(RatioCalculator::classify_altman_zone(1.80), AltmanZone::Distress);
        assert_eq!(RatioCalculator::classify_altman_zone(1.81), AltmanZone::Grey);
        assert_eq!(RatioCalculator::classify_altman_zone(2.98), AltmanZone::Grey);
        assert_eq!(RatioCalculator::classify_altman_zone(2.99), AltmanZone::Safe);
    }

    #[test]
    fn test_interest_coverage() {
        let input = MetricsInput { ebit: 150.0, interest_expense: 0.0, ..Default::default() };
        assert!(RatioCalculator::interest_coverage(&input).is_none());

        let input = MetricsInput { ebit: 150.0, interest_expense: -30.0, ..Default::default() };
        assert_relative_eq!(RatioCalculator::interest_coverage(&input).unwrap(), 5.0);
    }

    #[test]
    fn test_zero_asset_fallbacks() {
        let input = MetricsInput {
            net_income: 10.0,
            operating_cf: 5.0,
            operating_income: 8.0,
            ..Default::default()
        };
        assert_eq!(RatioCalculator::accruals_ratio(&input), 0.0);
        assert_eq!(RatioCalculator::gross_profitability(&input), 0.0);
        assert_eq!(RatioCalculator::cbop(&input), 0.0);
    }

    #[test]
    fn test_earnings_quality_and_accruals() {
        let input = MetricsInput {
            total_assets: 1000.0,
            net_income: 100.0,
            operating_cf: 150.0,
            ..Default::default()
        };
        assert_relative_eq!(RatioCalculator::accruals_ratio(&input), -0.05);
        assert_relative_eq!(RatioCalculator::earnings_quality(&input).unwrap(), 1.5);

        let input = MetricsInput { net_income: 0.0, ..input };
        assert!(RatioCalculator::earnings_quality(&input).is_none());
    }

    #[test]
    fn test_delta_noa_requires_both_prior_fields() {
        let input = MetricsInput {
            total_assets: 1000.0,
            current_assets: 500.0,
            current_liabilities: 200.0,
            prev_current_assets: Some(400.0),
            ..Default::default()
        };
        assert!(RatioCalculator::delta_noa(&input).is_none());

        let input = MetricsInput { prev_current_liabilities: Some(150.0), ..input };
        assert_relative_eq!(RatioCalculator::delta_noa(&input).unwrap(), 0.05);

        let input = MetricsInput { total_assets: 0.0, ..input };
        assert!(RatioCalculator::delta_noa(&input).is_none());
    }

    #[test]
    fn test_inventory_quality() {
        let input = MetricsInput {
            revenue: 110.0,
            inventory: 60.0,
            prev_revenue: Some(100.0),
            prev_inventory: Some(40.0),
            ..Default::default()
        };
        assert_relative_eq!(RatioCalculator::inventory_quality(&input).unwrap(), 0.4, epsilon = 1e-12);

        let input = MetricsInput { prev_inventory: Some(0.0), ..input };
        assert!(RatioCalculator::inventory_quality(&input).is_none());
    }

    #[test]
    fn test_roiic_branches() {
        let base = MetricsInput {
            operating_income: 120.0,
            total_assets: 1200.0,
            prev_operating_income: Some(100.0),
            prev_total_assets: Some(1000.0),
            ..Default::default()
        };
        assert_relative_eq!(RatioCalculator::roiic(&base).unwrap(), 0.1);

        // Capital shrank, income grew
        let input = MetricsInput { total_assets: 900.0, ..base.clone() };
        assert_eq!(RatioCalculator::roiic(&input), Some(ROIIC_EFFICIENCY_CAP));

        // Capital shrank, income shrank
        let input = MetricsInput { total_assets: 900.0, operating_income: 90.0, ..base.clone() };
        assert!(RatioCalculator::roiic(&input).is_none());

        let input = MetricsInput { prev_operating_income: None, ..base };
        assert!(RatioCalculator::roiic(&input).is_none());
    }

    #[test]
    fn test_reinvestment_rate_uses_absolute_values() {
        let input = MetricsInput {
            operating_cf: 100.0,
            capex: -60.0,
            depreciation: -20.0,
            ..Default::default()
        };
        assert_relative_eq!(RatioCalculator::reinvestment_rate(&input).unwrap(), 0.4);

        let input = MetricsInput { operating_cf: 0.0, ..input };
        assert!(RatioCalculator::reinvestment_rate(&input).is_none());
    }

    #[test]
    fn test_dupont_breakdown() {
        let input = MetricsInput {
            net_income: 50.0,
            revenue: 500.0,
            total_assets: 1000.0,
            total_equity: 400.0,
            ..Default::default()
        };
        let d = RatioCalculator::dupont_breakdown(&input).unwrap();
        assert_relative_eq!(d.net_profit_margin, 0.1);
        assert_relative_eq!(d.asset_turnover, 0.5);
        assert_relative_eq!(d.financial_leverage, 2.5);
        assert_relative_eq!(d.roe, 0.125);
        assert_relative_eq!(d.net_profit_margin * d.asset_turnover * d.financial_leverage, d.roe);

        let input = MetricsInput { total_equity: 0.0, ..input };
        assert!(RatioCalculator::dupont_breakdown(&input).is_none());
    }

    #[test]
    fn test_implied_growth_rate_and_duration() {
        let assumptions = EngineAssumptions::default();
        let input = MetricsInput {
            market_cap: 1000.0,
            operating_cf: 80.0,
            capex: -30.0,
            beta: 1.0,
            ..Default::default()
        };
        // 0.07 - 50/1000 = 0.02
        let g = RatioCalculator::implied_growth_rate(&input, &assumptions).unwrap();
        assert_relative_eq!(g, 2.0, epsilon = 1e-9);
        let duration = RatioCalculator::equity_duration_proxy(&input, &assumptions).unwrap();
        assert_relative_eq!(duration, 1.0 / 0.06, epsilon = 1e-9);

        // High beta pushes g above the discount rate
        let input = MetricsInput { beta: 3.0, ..input };
        assert_eq!(
            RatioCalculator::equity_duration_proxy(&input, &assumptions),
            Some(EQUITY_DURATION_CAP)
        );

        let input = MetricsInput { capex: -100.0, ..input };
        assert!(RatioCalculator::implied_growth_rate(&input, &assumptions).is_none());
        assert!(RatioCalculator::equity_duration_proxy(&input, &assumptions).is_none());
    }

    #[test]
    fn test_implied_revenue_growth() {
        let input = MetricsInput {
            revenue: 1000.0,
            market_cap: 800.0,
            sector: "Retail Trade".to_string(),
            ..Default::default()
        };
        // base = 0.8 * 0.05 / 0.04 = 1.0 -> 0% growth
        let g = RatioCalculator::implied_revenue_growth(&input).unwrap();
        assert_relative_eq!(g, 0.0, epsilon = 1e-9);

        let input = MetricsInput { market_cap: 0.0, ..input };
        assert!(RatioCalculator::implied_revenue_growth(&input).is_none());
    }

    #[test]
    fn test_actual_growth_and_reality_gap() {
        let input = MetricsInput {
            revenue: 120.0,
            prev_revenue: Some(100.0),
            ..Default::default()
        };
        assert_relative_eq!(RatioCalculator::actual_revenue_growth(&input).unwrap(), 20.0, epsilon = 1e-9);

        let input = MetricsInput { prev_revenue: Some(0.0), ..input };
        assert!(RatioCalculator::actual_revenue_growth(&input).is_none());

        assert_eq!(RatioCalculator::reality_gap(Some(30.0), Some(12.5)), Some(17.5));
        assert_eq!(RatioCalculator::reality_gap(None, Some(12.5)), None);
        assert_eq!(RatioCalculator::reality_gap(Some(30.0), None), None);
    }

    #[test]
    fn test_margins_and_multiples() {
        let input = MetricsInput {
            revenue: 1000.0,
            operating_income: 150.0,
            operating_cf: 200.0,
            capex: -50.0,
            net_income: 100.0,
            total_assets: 2000.0,
            total_equity: 1300.0,
            market_cap: 1500.0,
            prev_revenue: Some(900.0),
            prev_operating_income: Some(90.0),
            ..Default::default()
        };
        assert_relative_eq!(RatioCalculator::operating_margin(&input).unwrap(), 15.0, epsilon = 1e-9);
        assert_relative_eq!(RatioCalculator::ocf_margin(&input).unwrap(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(RatioCalculator::core_fcf(&input), 150.0);
        assert_relative_eq!(RatioCalculator::core_fcf_margin(&input).unwrap(), 15.0, epsilon = 1e-9);
        assert_relative_eq!(RatioCalculator::equity_ratio(&input).unwrap(), 65.0, epsilon = 1e-9);
        assert_eq!(RatioCalculator::operating_margin_improved(&input), Some(true));
        assert_relative_eq!(RatioCalculator::per(&input).unwrap(), 15.0);
        assert_relative_eq!(RatioCalculator::pbr(&input).unwrap(), 1500.0 / 1300.0);

        let loss_maker = MetricsInput { net_income: -10.0, prev_revenue: None, ..input };
        assert!(RatioCalculator::per(&loss_maker).is_none());
        assert!(RatioCalculator::operating_margin_improved(&loss_maker).is_none());
    }
}
