//! Narrative cards.
//!
//! A fixed rule table is evaluated against the full analysis bundle. Every
//! matching rule renders one card from a template filled with the computed
//! values; cards are then ordered by severity, most severe first. Formatting
//! uses fixed precision so the same input always renders the same text.

use analysis_core::{
    AltmanZone, CardType, Diagnosis, MarketExpectation, MetricsInput, NarrativeCard, RatioBundle,
    ScoreBundle, TagSet,
};

use crate::diagnosis::ACCRUALS_WARNING_THRESHOLD;

pub const INVENTORY_BUILDUP_THRESHOLD: f64 = 0.20;
pub const EXPENSIVE_PER_THRESHOLD: f64 = 40.0;
pub const CHEAP_PER_THRESHOLD: f64 = 12.0;
pub const EFFICIENT_ROIIC_THRESHOLD: f64 = 0.15;

pub const FALLBACK_CARD_ID: &str = "average";

/// Everything a rule may look at
#[derive(Debug, Clone, Copy)]
pub struct NarrativeContext<'a> {
    pub input: &'a MetricsInput,
    pub ratios: &'a RatioBundle,
    pub scores: &'a ScoreBundle,
    pub tags: &'a TagSet,
    pub diagnosis: &'a Diagnosis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardText {
    pub title: String,
    pub body: String,
    pub advice: String,
}

impl CardText {
    fn new(title: &str, body: String, advice: &str) -> Self {
        Self {
            title: title.to_string(),
            body,
            advice: advice.to_string(),
        }
    }
}

pub struct NarrativeRule {
    pub id: &'static str,
    pub card_type: CardType,
    pub severity: u8,
    pub applies: fn(&NarrativeContext) -> bool,
    pub render: fn(&NarrativeContext) -> CardText,
}

impl NarrativeRule {
    fn card(&self, ctx: &NarrativeContext) -> NarrativeCard {
        let text = (self.render)(ctx);
        NarrativeCard {
            id: self.id.to_string(),
            card_type: self.card_type,
            severity: self.severity,
            title: text.title,
            body: text.body,
            advice: text.advice,
        }
    }
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}%", v))
}

fn multiple(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}x", v))
}

fn ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

fn points(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}", v))
}

pub static RULES: &[NarrativeRule] = &[
    // --- Critical ---
    NarrativeRule {
        id: "bankruptcy_risk",
        card_type: CardType::Critical,
        severity: 5,
        applies: |ctx| ctx.scores.altman_zone == Some(AltmanZone::Distress),
        render: |ctx| {
            CardText::new(
                "Bankruptcy risk zone",
                format!(
                    "Altman Z-Score is {}, inside the distress zone.",
                    ratio(ctx.ratios.altman_z)
                ),
                "Review liquidity and refinancing needs before anything else.",
            )
        },
    },
    NarrativeRule {
        id: "zombie",
        card_type: CardType::Critical,
        severity: 5,
        applies: |ctx| ctx.tags.zombie,
        render: |ctx| {
            CardText::new(
                "Zombie company",
                format!(
                    "Interest coverage is {} with operating income of {:.0}. The business is kept alive by financing rather than earnings.",
                    multiple(ctx.ratios.interest_coverage),
                    ctx.input.operating_income
                ),
                "Avoid unless a credible restructuring plan is in place.",
            )
        },
    },
    NarrativeRule {
        id: "fragile_expectation",
        card_type: CardType::Critical,
        severity: 5,
        applies: |ctx| ctx.tags.fragile,
        render: |ctx| {
            CardText::new(
                "Fragile expectations",
                format!(
                    "The price assumes {} points more growth than delivered, with Altman Z-Score {} and core FCF of {:.0}.",
                    points(ctx.ratios.reality_gap),
                    ratio(ctx.ratios.altman_z),
                    ctx.ratios.core_fcf
                ),
                "A single missed quarter can reprice this stock sharply.",
            )
        },
    },
    // --- Warning ---
    NarrativeRule {
        id: "accounting_risk",
        card_type: CardType::Warning,
        severity: 4,
        applies: |ctx| ctx.tags.accounting_risk,
        render: |ctx| {
            CardText::new(
                "Profit without cash",
                format!(
                    "Net income is {:.0} while operating cash flow is {:.0}.",
                    ctx.input.net_income, ctx.input.operating_cf
                ),
                "Check receivables and inventory for the missing cash.",
            )
        },
    },
    NarrativeRule {
        id: "overheated_expectation",
        card_type: CardType::Warning,
        severity: 4,
        applies: |ctx| ctx.diagnosis.expectation == MarketExpectation::Overheated,
        render: |ctx| {
            CardText::new(
                "Overheated expectations",
                format!(
                    "The price implies {} revenue growth against {} actual, a gap of {} points.",
                    percent(ctx.ratios.implied_revenue_growth),
                    percent(ctx.ratios.actual_revenue_growth),
                    points(ctx.ratios.reality_gap)
                ),
                "Growth has to accelerate just to hold the current price.",
            )
        },
    },
    NarrativeRule {
        id: "single_engine",
        card_type: CardType::Warning,
        severity: 3,
        applies: |ctx| ctx.tags.single_engine,
        render: |ctx| {
            CardText::new(
                "Growth on a single engine",
                format!(
                    "Revenue grows {} but the core FCF margin is only {}.",
                    percent(ctx.ratios.actual_revenue_growth),
                    percent(ctx.ratios.core_fcf_margin)
                ),
                "Watch funding needs; growth is not paying for itself yet.",
            )
        },
    },
    NarrativeRule {
        id: "low_earnings_quality",
        card_type: CardType::Warning,
        severity: 3,
        applies: |ctx| ctx.ratios.accruals_ratio > ACCRUALS_WARNING_THRESHOLD,
        render: |ctx| {
            CardText::new(
                "Low earnings quality",
                format!(
                    "Accruals ratio is {:.2}; reported earnings run well ahead of cash.",
                    ctx.ratios.accruals_ratio
                ),
                "Discount reported profit until cash flow catches up.",
            )
        },
    },
    NarrativeRule {
        id: "inventory_buildup",
        card_type: CardType::Warning,
        severity: 3,
        applies: |ctx| {
            ctx.ratios
                .inventory_quality
                .map_or(false, |v| v > INVENTORY_BUILDUP_THRESHOLD)
        },
        render: |ctx| {
            CardText::new(
                "Inventory build-up",
                format!(
                    "Inventory grew {} faster than revenue.",
                    percent(ctx.ratios.inventory_quality.map(|v| v * 100.0))
                ),
                "Look for discounting or write-downs in the next periods.",
            )
        },
    },
    NarrativeRule {
        id: "expensive_per",
        card_type: CardType::Warning,
        severity: 2,
        applies: |ctx| ctx.ratios.per.map_or(false, |p| p > EXPENSIVE_PER_THRESHOLD),
        render: |ctx| {
            CardText::new(
                "Expensive on earnings",
                format!("PER is {}.", multiple(ctx.ratios.per)),
                "The valuation leaves little room for disappointment.",
            )
        },
    },
    // --- Opportunity ---
    NarrativeRule {
        id: "silent_improver",
        card_type: CardType::Opportunity,
        severity: 4,
        applies: |ctx| ctx.tags.silent_improver,
        render: |ctx| {
            CardText::new(
                "Silent improver",
                format!(
                    "The price implies {} growth while the company delivers {} with an F-Score of {}/9.",
                    percent(ctx.ratios.implied_revenue_growth),
                    percent(ctx.ratios.actual_revenue_growth),
                    ctx.scores.f_score
                ),
                "Fundamentals are improving ahead of the market's view.",
            )
        },
    },
    NarrativeRule {
        id: "turnaround",
        card_type: CardType::Opportunity,
        severity: 3,
        applies: |ctx| ctx.tags.turnaround,
        render: |ctx| {
            CardText::new(
                "Turnaround",
                format!(
                    "Net income swung from {:.0} to {:.0}.",
                    ctx.input.prev_net_income.unwrap_or_default(),
                    ctx.input.net_income
                ),
                "Confirm the recovery is operational and not a one-off gain.",
            )
        },
    },
    NarrativeRule {
        id: "undervalued_quality",
        card_type: CardType::Opportunity,
        severity: 3,
        applies: |ctx| {
            ctx.ratios.per.map_or(false, |p| p < CHEAP_PER_THRESHOLD) && ctx.scores.f_score >= 6
        },
        render: |ctx| {
            CardText::new(
                "Undervalued quality",
                format!(
                    "PER is {} with an F-Score of {}/9.",
                    multiple(ctx.ratios.per),
                    ctx.scores.f_score
                ),
                "Solid fundamentals at a modest multiple.",
            )
        },
    },
    // --- Success ---
    NarrativeRule {
        id: "quality_growth",
        card_type: CardType::Success,
        severity: 3,
        applies: |ctx| ctx.tags.quality_growth,
        render: |ctx| {
            CardText::new(
                "Quality growth",
                format!(
                    "Operating margin {} with revenue growth of {}.",
                    percent(ctx.ratios.operating_margin),
                    percent(ctx.ratios.actual_revenue_growth)
                ),
                "Profitable growth backed by healthy fundamentals.",
            )
        },
    },
    NarrativeRule {
        id: "safety_shield",
        card_type: CardType::Success,
        severity: 2,
        applies: |ctx| ctx.tags.safety_shield,
        render: |ctx| {
            CardText::new(
                "Safety shield",
                format!(
                    "Equity ratio {} and Altman Z-Score {} with positive core FCF of {:.0}.",
                    percent(ctx.ratios.equity_ratio),
                    ratio(ctx.ratios.altman_z),
                    ctx.ratios.core_fcf
                ),
                "A balance sheet that can absorb a downturn.",
            )
        },
    },
    NarrativeRule {
        id: "cash_cow",
        card_type: CardType::Success,
        severity: 2,
        applies: |ctx| ctx.tags.cash_cow,
        render: |ctx| {
            CardText::new(
                "Cash cow",
                format!(
                    "Operating cash flow margin {} on revenue growth of {}.",
                    percent(ctx.ratios.ocf_margin),
                    percent(ctx.ratios.actual_revenue_growth)
                ),
                "Look at how the cash is returned to shareholders.",
            )
        },
    },
    // --- Info ---
    NarrativeRule {
        id: "institutional_quality",
        card_type: CardType::Info,
        severity: 2,
        applies: |ctx| ctx.tags.institutional_quality,
        render: |ctx| {
            CardText::new(
                "Institutional quality",
                format!(
                    "F-Score {}/9, Altman Z-Score {} and operating margin {}.",
                    ctx.scores.f_score,
                    ratio(ctx.ratios.altman_z),
                    percent(ctx.ratios.operating_margin)
                ),
                "Meets the screens long-only institutions typically apply.",
            )
        },
    },
    NarrativeRule {
        id: "efficient_reinvestment",
        card_type: CardType::Info,
        severity: 1,
        applies: |ctx| {
            ctx.ratios
                .roiic
                .map_or(false, |r| r >= EFFICIENT_ROIIC_THRESHOLD)
        },
        render: |ctx| {
            CardText::new(
                "Efficient reinvestment",
                format!(
                    "Return on incremental invested capital is {}.",
                    percent(ctx.ratios.roiic.map(|r| r * 100.0))
                ),
                "New capital is being put to productive use.",
            )
        },
    },
];

pub struct NarrativeEngine;

impl NarrativeEngine {
    /// Cards for every matching rule, most severe first. Never empty.
    pub fn generate(ctx: &NarrativeContext) -> Vec<NarrativeCard> {
        let mut cards: Vec<NarrativeCard> = RULES
            .iter()
            .filter(|rule| (rule.applies)(ctx))
            .map(|rule| rule.card(ctx))
            .collect();

        if cards.is_empty() {
            return vec![Self::fallback_card()];
        }

        // sort_by is stable: equal severities keep table order
        cards.sort_by(|a, b| b.severity.cmp(&a.severity));
        cards
    }

    pub fn fallback_card() -> NarrativeCard {
        NarrativeCard {
            id: FALLBACK_CARD_ID.to_string(),
            card_type: CardType::Info,
            severity: 1,
            title: "No notable pattern".to_string(),
            body: "None of the diagnostic patterns apply to this company.".to_string(),
            advice: "Compare against sector peers for a relative view.".to_string(),
        }
    }
}
