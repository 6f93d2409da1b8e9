//! Character tag predicates.
//!
//! Each tag is an independent predicate. There is no priority or exclusivity
//! between tags, so contradictory-looking combinations (a Safety Shield that
//! is also a Zombie) are reported as-is. An absent ratio never satisfies a
//! comparison.

use analysis_core::{MetricsInput, RatioBundle, ScoreBundle, TagSet};

use crate::ratios::ALTMAN_SAFE_THRESHOLD;

pub const SAFETY_EQUITY_RATIO_MIN: f64 = 60.0;
pub const QUALITY_OPERATING_MARGIN_MIN: f64 = 10.0;
pub const QUALITY_REVENUE_GROWTH_MIN: f64 = 10.0;
pub const QUALITY_F_SCORE_MIN: u8 = 6;
pub const INSTITUTIONAL_ALTMAN_MIN: f64 = 2.5;
pub const INSTITUTIONAL_F_SCORE_MIN: u8 = 7;
pub const INSTITUTIONAL_OPERATING_MARGIN_MIN: f64 = 5.0;
pub const CASH_COW_OCF_MARGIN_MIN: f64 = 15.0;
pub const CASH_COW_REVENUE_GROWTH_MAX: f64 = 10.0;
pub const SINGLE_ENGINE_REVENUE_GROWTH_MIN: f64 = 20.0;
pub const SINGLE_ENGINE_FCF_MARGIN_MAX: f64 = 5.0;
pub const HIGH_VOLATILITY_GAP_MIN: f64 = 10.0;
pub const SILENT_IMPROVER_F_SCORE_MIN: u8 = 6;
/// Sits just below the Altman distress boundary of 1.81
pub const WEAK_ALTMAN_MAX: f64 = 1.8;
pub const ZOMBIE_ICR_MAX: f64 = 1.0;
pub const FRAGILE_GAP_MIN: f64 = 30.0;

pub struct TagClassifier;

impl TagClassifier {
    pub fn classify(input: &MetricsInput, ratios: &RatioBundle, scores: &ScoreBundle) -> TagSet {
        let single_engine = Self::single_engine(ratios);
        TagSet {
            safety_shield: Self::safety_shield(ratios),
            quality_growth: Self::quality_growth(ratios, scores),
            institutional_quality: Self::institutional_quality(ratios, scores),
            cash_cow: Self::cash_cow(ratios),
            single_engine,
            high_volatility: Self::high_volatility(single_engine, ratios),
            silent_improver: Self::silent_improver(ratios, scores),
            turnaround: Self::turnaround(input),
            zombie: Self::zombie(input, ratios),
            accounting_risk: Self::accounting_risk(input),
            fragile: Self::fragile(ratios),
        }
    }

    // --- Safety / quality ---

    pub fn safety_shield(ratios: &RatioBundle) -> bool {
        ratios.altman_z.map_or(false, |z| z > ALTMAN_SAFE_THRESHOLD)
            && ratios.equity_ratio.map_or(false, |e| e > SAFETY_EQUITY_RATIO_MIN)
            && ratios.core_fcf > 0.0
    }

    pub fn quality_growth(ratios: &RatioBundle, scores: &ScoreBundle) -> bool {
        ratios.operating_margin.map_or(false, |m| m > QUALITY_OPERATING_MARGIN_MIN)
            && ratios.actual_revenue_growth.map_or(false, |g| g > QUALITY_REVENUE_GROWTH_MIN)
            && scores.f_score >= QUALITY_F_SCORE_MIN
    }

    pub fn institutional_quality(ratios: &RatioBundle, scores: &ScoreBundle) -> bool {
        ratios.altman_z.map_or(false, |z| z > INSTITUTIONAL_ALTMAN_MIN)
            && scores.f_score >= INSTITUTIONAL_F_SCORE_MIN
            && ratios.operating_margin.map_or(false, |m| m > INSTITUTIONAL_OPERATING_MARGIN_MIN)
    }

    pub fn cash_cow(ratios: &RatioBundle) -> bool {
        ratios.ocf_margin.map_or(false, |m| m > CASH_COW_OCF_MARGIN_MIN)
            && ratios.actual_revenue_growth.map_or(false, |g| g < CASH_COW_REVENUE_GROWTH_MAX)
            && ratios.core_fcf > 0.0
    }

    // --- Character / phase ---

    pub fn single_engine(ratios: &RatioBundle) -> bool {
        ratios.actual_revenue_growth.map_or(false, |g| g > SINGLE_ENGINE_REVENUE_GROWTH_MIN)
            && ratios.core_fcf_margin.map_or(false, |m| m < SINGLE_ENGINE_FCF_MARGIN_MAX)
    }

    /// Composed from the Single Engine tag rather than re-derived.
    pub fn high_volatility(single_engine: bool, ratios: &RatioBundle) -> bool {
        single_engine && ratios.reality_gap.map_or(false, |gap| gap > HIGH_VOLATILITY_GAP_MIN)
    }

    pub fn silent_improver(ratios: &RatioBundle, scores: &ScoreBundle) -> bool {
        ratios.reality_gap.map_or(false, |gap| gap < 0.0)
            && (ratios.operating_margin_improved == Some(true) || scores.f_score >= SILENT_IMPROVER_F_SCORE_MIN)
    }

    pub fn turnaround(input: &MetricsInput) -> bool {
        input.prev_net_income.map_or(false, |prev| prev < 0.0) && input.net_income > 0.0
    }

    // --- Risk / warning ---

    pub fn zombie(input: &MetricsInput, ratios: &RatioBundle) -> bool {
        let distressed_and_losing =
            ratios.altman_z.map_or(false, |z| z < WEAK_ALTMAN_MAX) && input.operating_income < 0.0;
        let cannot_cover_interest = ratios.interest_coverage.map_or(false, |icr| icr < ZOMBIE_ICR_MAX);
        distressed_and_losing || cannot_cover_interest
    }

    pub fn accounting_risk(input: &MetricsInput) -> bool {
        input.net_income > 0.0 && input.operating_cf < 0.0
    }

    pub fn fragile(ratios: &RatioBundle) -> bool {
        ratios.reality_gap.map_or(false, |gap| gap > FRAGILE_GAP_MIN)
            && ratios.altman_z.map_or(false, |z| z < WEAK_ALTMAN_MAX)
            && ratios.core_fcf < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(f_score: u8) -> ScoreBundle {
        ScoreBundle {
            f_score,
            f_score_reasons: Vec::new(),
            altman_zone: None,
        }
    }

    #[test]
    fn test_safety_shield_requires_all_three() {
        let ratios = RatioBundle {
            altman_z: Some(3.5),
            equity_ratio: Some(70.0),
            core_fcf: 10.0,
            ..Default::default()
        };
        assert!(TagClassifier::safety_shield(&ratios));

        let no_z = RatioBundle { altman_z: None, ..ratios.clone() };
        assert!(!TagClassifier::safety_shield(&no_z));

        let burning = RatioBundle { core_fcf: -1.0, ..ratios };
        assert!(!TagClassifier::safety_shield(&burning));
    }

    #[test]
    fn test_threshold_boundaries_are_exclusive() {
        let at_safe_line = RatioBundle {
            altman_z: Some(ALTMAN_SAFE_THRESHOLD),
            equity_ratio: Some(70.0),
            core_fcf: 10.0,
            ..Default::default()
        };
        assert!(!TagClassifier::safety_shield(&at_safe_line));

        // inside the distress zone, but not below the weak-balance-sheet line
        let losing = MetricsInput { operating_income: -10.0, ..Default::default() };
        let borderline = RatioBundle { altman_z: Some(1.805), ..Default::default() };
        assert!(!TagClassifier::zombie(&losing, &borderline));

        let at_fragile_gap = RatioBundle {
            reality_gap: Some(FRAGILE_GAP_MIN),
            altman_z: Some(1.0),
            core_fcf: -5.0,
            ..Default::default()
        };
        assert!(!TagClassifier::fragile(&at_fragile_gap));
        let past_fragile_gap = RatioBundle { reality_gap: Some(30.1), ..at_fragile_gap };
        assert!(TagClassifier::fragile(&past_fragile_gap));
    }

    #[test]
    fn test_high_volatility_depends_on_single_engine() {
        let ratios = RatioBundle {
            actual_revenue_growth: Some(35.0),
            core_fcf_margin: Some(-3.0),
            reality_gap: Some(15.0),
            ..Default::default()
        };
        let single = TagClassifier::single_engine(&ratios);
        assert!(single);
        assert!(TagClassifier::high_volatility(single, &ratios));
        assert!(!TagClassifier::high_volatility(false, &ratios));
    }

    #[test]
    fn test_silent_improver() {
        let ratios = RatioBundle {
            reality_gap: Some(-5.0),
            operating_margin_improved: Some(true),
            ..Default::default()
        };
        assert!(TagClassifier::silent_improver(&ratios, &scores(2)));

        let flat = RatioBundle { operating_margin_improved: Some(false), ..ratios.clone() };
        assert!(!TagClassifier::silent_improver(&flat, &scores(5)));
        assert!(TagClassifier::silent_improver(&flat, &scores(6)));

        let no_gap = RatioBundle { reality_gap: None, ..ratios };
        assert!(!TagClassifier::silent_improver(&no_gap, &scores(9)));
    }

    #[test]
    fn test_turnaround() {
        let input = MetricsInput {
            net_income: 5.0,
            prev_net_income: Some(-10.0),
            ..Default::default()
        };
        assert!(TagClassifier::turnaround(&input));

        let input = MetricsInput { prev_net_income: None, ..input };
        assert!(!TagClassifier::turnaround(&input));
    }

    #[test]
    fn test_zombie_either_branch() {
        let input = MetricsInput { operating_income: -10.0, ..Default::default() };
        let distressed = RatioBundle { altman_z: Some(1.0), ..Default::default() };
        assert!(TagClassifier::zombie(&input, &distressed));

        let profitable = MetricsInput { operating_income: 10.0, ..Default::default() };
        let weak_icr = RatioBundle {
            altman_z: Some(4.0),
            interest_coverage: Some(0.5),
            ..Default::default()
        };
        assert!(TagClassifier::zombie(&profitable, &weak_icr));

        // No ICR and no Z: nothing to judge
        assert!(!TagClassifier::zombie(&input, &RatioBundle::default()));
    }

    #[test]
    fn test_cash_cow_and_fragile() {
        let cow = RatioBundle {
            ocf_margin: Some(20.0),
            actual_revenue_growth: Some(2.0),
            core_fcf: 50.0,
            ..Default::default()
        };
        assert!(TagClassifier::cash_cow(&cow));
        let unknown_growth = RatioBundle { actual_revenue_growth: None, ..cow };
        assert!(!TagClassifier::cash_cow(&unknown_growth));

        let fragile = RatioBundle {
            reality_gap: Some(45.0),
            altman_z: Some(1.2),
            core_fcf: -20.0,
            ..Default::default()
        };
        assert!(TagClassifier::fragile(&fragile));
    }

    #[test]
    fn test_contradictory_tags_both_reported() {
        let input = MetricsInput {
            net_income: 50.0,
            operating_cf: -10.0,
            ..Default::default()
        };
        let ratios = RatioBundle {
            altman_z: Some(3.2),
            equity_ratio: Some(75.0),
            core_fcf: 5.0,
            interest_coverage: Some(0.4),
            ..Default::default()
        };
        let tags = TagClassifier::classify(&input, &ratios, &scores(4));
        assert!(tags.safety_shield);
        assert!(tags.zombie);
        assert!(tags.accounting_risk);
    }
}
