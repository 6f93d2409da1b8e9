use crate::models::*;
use analysis_core::{CharacterTag, TagSet};
use std::collections::BTreeMap;

pub const EMPTY_PORTFOLIO_SUMMARY: &str = "Portfolio is empty. Add holdings to diagnose it.";

const BASE_HEALTH_SCORE: f64 = 80.0;
const RISK_PENALTY: f64 = 1.5;
const SPECULATIVE_ALLOWANCE: f64 = 30.0;
const SPECULATIVE_PENALTY: f64 = 0.5;
const SAFETY_BONUS_THRESHOLD: f64 = 50.0;
const QUALITY_BONUS_THRESHOLD: f64 = 30.0;
const BONUS: f64 = 5.0;

/// Portfolio-level diagnosis: tag and category exposure, dependency on
/// market narratives, and an overall health score.
pub struct PortfolioAnalyzer;

impl PortfolioAnalyzer {
    pub fn analyze(holdings: &[Holding]) -> PortfolioDiagnosis {
        let total_value: f64 = holdings.iter().map(Holding::market_value).sum();
        if total_value <= 0.0 || !total_value.is_finite() {
            return Self::empty_result();
        }

        let mut tag_exposure: BTreeMap<String, f64> = CharacterTag::ALL
            .iter()
            .map(|t| (t.key().to_string(), 0.0))
            .collect();
        let mut category_exposure: BTreeMap<ExposureCategory, f64> =
            ExposureCategory::ALL.iter().map(|c| (*c, 0.0)).collect();
        let mut valuations = Vec::with_capacity(holdings.len());

        for holding in holdings {
            let market_value = holding.market_value();
            let weight = market_value * 100.0 / total_value;

            for tag in holding.tags.active() {
                *tag_exposure.entry(tag.key().to_string()).or_insert(0.0) += weight;
            }

            let category = Self::categorize(&holding.tags);
            *category_exposure.entry(category).or_insert(0.0) += weight;

            valuations.push(HoldingValuation {
                symbol: holding.symbol.clone(),
                name: holding.name.clone(),
                quantity: holding.quantity,
                market_value,
                weight_percent: weight,
                category,
                tags: holding.tags.active(),
            });
        }

        let narratives = Self::narrative_dependencies(&tag_exposure);
        let health_score = Self::health_score(&category_exposure);
        let diagnosis_summary = Self::summary(health_score, &narratives);

        tracing::debug!(
            "Portfolio diagnosis: {} holdings, value {:.0}, health {}",
            holdings.len(),
            total_value,
            health_score
        );

        PortfolioDiagnosis {
            total_value,
            health_score,
            diagnosis_summary,
            category_exposure,
            tag_exposure,
            narrative_analysis: narratives,
            holdings: valuations,
        }
    }

    /// Risk > Speculative > Quality > Safety > Neutral: a single dangerous
    /// tag outweighs any number of good ones.
    pub fn categorize(tags: &TagSet) -> ExposureCategory {
        if tags.zombie || tags.fragile || tags.accounting_risk {
            ExposureCategory::Risk
        } else if tags.single_engine || tags.high_volatility || tags.turnaround {
            ExposureCategory::Speculative
        } else if tags.quality_growth {
            ExposureCategory::Quality
        } else if tags.safety_shield || tags.institutional_quality || tags.cash_cow {
            ExposureCategory::Safety
        } else {
            ExposureCategory::Neutral
        }
    }

    /// Narrative dependency index, highest first. Ties keep definition order.
    pub fn narrative_dependencies(tag_exposure: &BTreeMap<String, f64>) -> Vec<NarrativeDependency> {
        let mut dependencies: Vec<NarrativeDependency> = MarketNarrative::ALL
            .iter()
            .map(|narrative| {
                let exposure: f64 = narrative
                    .tags()
                    .iter()
                    .map(|t| tag_exposure.get(t.key()).copied().unwrap_or(0.0))
                    .sum();
                NarrativeDependency {
                    key: *narrative,
                    label: narrative.label().to_string(),
                    dependency_score: (exposure * narrative.weight()).min(100.0),
                    description: narrative.description().to_string(),
                    risk_scenario: narrative.risk_scenario().to_string(),
                }
            })
            .collect();

        dependencies.sort_by(|a, b| {
            b.dependency_score
                .partial_cmp(&a.dependency_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        dependencies
    }

    pub fn health_score(category_exposure: &BTreeMap<ExposureCategory, f64>) -> u8 {
        let share = |c: ExposureCategory| category_exposure.get(&c).copied().unwrap_or(0.0);

        let mut score = BASE_HEALTH_SCORE;
        score -= share(ExposureCategory::Risk) * RISK_PENALTY;

        let speculative = share(ExposureCategory::Speculative);
        if speculative > SPECULATIVE_ALLOWANCE {
            score -= (speculative - SPECULATIVE_ALLOWANCE) * SPECULATIVE_PENALTY;
        }

        if share(ExposureCategory::Safety) > SAFETY_BONUS_THRESHOLD {
            score += BONUS;
        }
        if share(ExposureCategory::Quality) > QUALITY_BONUS_THRESHOLD {
            score += BONUS;
        }

        score.clamp(0.0, 100.0) as u8
    }

    pub fn summary(health_score: u8, narratives: &[NarrativeDependency]) -> String {
        let top = narratives.first();
        let top_above = |threshold: f64| top.filter(|n| n.dependency_score > threshold);

        if health_score < 40 {
            match top_above(50.0) {
                Some(n) => format!(
                    "Danger. Your assets depend heavily on \"{}\" and could collapse under {}.",
                    n.label, n.risk_scenario
                ),
                None => "Danger. Consider trimming zombie companies and holdings whose expectations could collapse.".to_string(),
            }
        } else if health_score < 60 {
            match top_above(40.0) {
                Some(n) => format!(
                    "Caution. {:.0}% of the portfolio depends on \"{}\". Are you prepared for {}?",
                    n.dependency_score, n.label, n.risk_scenario
                ),
                None => "Balance is deteriorating. A few risky holdings are dragging down the whole portfolio.".to_string(),
            }
        } else if health_score < 80 {
            match top_above(30.0) {
                Some(n) => format!(
                    "Generally healthy, but leaning on \"{}\". Plan for what happens under {}.",
                    n.label, n.risk_scenario
                ),
                None => "A balanced portfolio. Stable results can be expected without excessive risk.".to_string(),
            }
        } else {
            "An exceptionally healthy portfolio. Defense and quality are well balanced with no heavy dependence on any single narrative.".to_string()
        }
    }

    pub fn empty_result() -> PortfolioDiagnosis {
        PortfolioDiagnosis {
            total_value: 0.0,
            health_score: 0,
            diagnosis_summary: EMPTY_PORTFOLIO_SUMMARY.to_string(),
            category_exposure: BTreeMap::new(),
            tag_exposure: BTreeMap::new(),
            narrative_analysis: Vec::new(),
            holdings: Vec::new(),
        }
    }
}
