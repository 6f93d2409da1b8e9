use analysis_core::{CharacterTag, TagSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A position as listed in a portfolio file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub symbol: String,
    pub quantity: f64,
}

/// A position joined with its latest analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub name: Option<String>,
    pub quantity: f64,
    pub stock_price: f64,
    pub tags: TagSet,
}

impl Holding {
    pub fn market_value(&self) -> f64 {
        self.stock_price * self.quantity
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub symbol: String,
    pub name: Option<String>,
    pub quantity: f64,
    pub market_value: f64,
    pub weight_percent: f64,
    pub category: ExposureCategory,
    pub tags: Vec<CharacterTag>,
}

/// Aggregation bucket for a holding. Each holding lands in exactly one
/// bucket, picked by priority; the underlying tags stay independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExposureCategory {
    Risk,
    Speculative,
    Quality,
    Safety,
    Neutral,
}

impl ExposureCategory {
    pub const ALL: [ExposureCategory; 5] = [
        ExposureCategory::Risk,
        ExposureCategory::Speculative,
        ExposureCategory::Quality,
        ExposureCategory::Safety,
        ExposureCategory::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExposureCategory::Risk => "Risk",
            ExposureCategory::Speculative => "Speculative",
            ExposureCategory::Quality => "Quality",
            ExposureCategory::Safety => "Safety",
            ExposureCategory::Neutral => "Neutral",
        }
    }
}

/// The market worldviews a portfolio can implicitly bet on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketNarrative {
    LowRate,
    HighGrowth,
    EconomicExpansion,
    QualityPreference,
}

impl MarketNarrative {
    pub const ALL: [MarketNarrative; 4] = [
        MarketNarrative::LowRate,
        MarketNarrative::HighGrowth,
        MarketNarrative::EconomicExpansion,
        MarketNarrative::QualityPreference,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MarketNarrative::LowRate => "Low rates and easy money",
            MarketNarrative::HighGrowth => "Continued high growth",
            MarketNarrative::EconomicExpansion => "Economic expansion and easy credit",
            MarketNarrative::QualityPreference => "Continued premium on quality",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MarketNarrative::LowRate => "May become fragile once rates start rising.",
            MarketNarrative::HighGrowth => {
                "Exposed to slowing growth or fading expectations."
            }
            MarketNarrative::EconomicExpansion => "Weak against a recession or a credit crunch.",
            MarketNarrative::QualityPreference => {
                "May lag in speculative markets that ignore quality."
            }
        }
    }

    pub fn risk_scenario(&self) -> &'static str {
        match self {
            MarketNarrative::LowRate => "a rate spike or monetary tightening",
            MarketNarrative::HighGrowth => "the growth story collapsing and multiples contracting",
            MarketNarrative::EconomicExpansion => "a recession",
            MarketNarrative::QualityPreference => "a speculative frenzy that ignores quality",
        }
    }

    /// Tags whose exposure feeds this narrative
    pub fn tags(&self) -> &'static [CharacterTag] {
        match self {
            MarketNarrative::LowRate => &[
                CharacterTag::Zombie,
                CharacterTag::HighVolatility,
                CharacterTag::AccountingRisk,
            ],
            MarketNarrative::HighGrowth => &[CharacterTag::SingleEngine, CharacterTag::Fragile],
            MarketNarrative::EconomicExpansion => {
                &[CharacterTag::Turnaround, CharacterTag::SilentImprover]
            }
            MarketNarrative::QualityPreference => &[
                CharacterTag::QualityGrowth,
                CharacterTag::InstitutionalQuality,
                CharacterTag::CashCow,
            ],
        }
    }

    /// Defensive narratives weigh less as a dependency risk
    pub fn weight(&self) -> f64 {
        match self {
            MarketNarrative::LowRate => 1.2,
            MarketNarrative::HighGrowth => 1.5,
            MarketNarrative::EconomicExpansion => 1.0,
            MarketNarrative::QualityPreference => 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeDependency {
    pub key: MarketNarrative,
    pub label: String,
    /// Percent of the portfolio betting on this narrative, capped at 100
    pub dependency_score: f64,
    pub description: String,
    pub risk_scenario: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioDiagnosis {
    pub total_value: f64,
    pub health_score: u8,
    pub diagnosis_summary: String,
    pub category_exposure: BTreeMap<ExposureCategory, f64>,
    /// Percent of portfolio value carrying each tag, keyed by tag key
    pub tag_exposure: BTreeMap<String, f64>,
    /// Sorted by dependency, highest first
    pub narrative_analysis: Vec<NarrativeDependency>,
    pub holdings: Vec<HoldingValuation>,
}
