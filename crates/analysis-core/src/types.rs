use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::AnalysisError;

fn default_beta() -> f64 {
    1.0
}

fn default_sector() -> String {
    "Unknown".to_string()
}

/// One company's fundamentals for the current and prior fiscal period.
///
/// Current-period fields are never optional: the ingestion side normalizes
/// unknown values to 0.0. Prior-period fields are `None` when no prior-year
/// data exists, which is not the same thing as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsInput {
    // Income statement
    pub revenue: f64,
    pub operating_income: f64,
    pub net_income: f64,
    pub ebit: f64,
    pub interest_expense: f64,
    pub depreciation: f64,

    // Balance sheet
    pub total_assets: f64,
    pub total_equity: f64,
    pub current_assets: f64,
    pub current_liabilities: f64,
    pub inventory: f64,
    pub retained_earnings: f64,
    pub long_term_debt: f64,

    // Cash flow
    pub operating_cf: f64,
    pub investing_cf: f64,
    pub capex: f64,

    // Market
    #[serde(default)]
    pub stock_price: f64,
    #[serde(default)]
    pub market_cap: f64,
    #[serde(default = "default_beta")]
    pub beta: f64,

    // Prior fiscal period
    #[serde(default)]
    pub prev_revenue: Option<f64>,
    #[serde(default)]
    pub prev_operating_income: Option<f64>,
    #[serde(default)]
    pub prev_net_income: Option<f64>,
    #[serde(default)]
    pub prev_total_assets: Option<f64>,
    #[serde(default)]
    pub prev_current_assets: Option<f64>,
    #[serde(default)]
    pub prev_current_liabilities: Option<f64>,
    #[serde(default)]
    pub prev_inventory: Option<f64>,
    #[serde(default)]
    pub prev_long_term_debt: Option<f64>,

    #[serde(default = "default_sector")]
    pub sector: String,
}

impl Default for MetricsInput {
    fn default() -> Self {
        Self {
            revenue: 0.0,
            operating_income: 0.0,
            net_income: 0.0,
            ebit: 0.0,
            interest_expense: 0.0,
            depreciation: 0.0,
            total_assets: 0.0,
            total_equity: 0.0,
            current_assets: 0.0,
            current_liabilities: 0.0,
            inventory: 0.0,
            retained_earnings: 0.0,
            long_term_debt: 0.0,
            operating_cf: 0.0,
            investing_cf: 0.0,
            capex: 0.0,
            stock_price: 0.0,
            market_cap: 0.0,
            beta: default_beta(),
            prev_revenue: None,
            prev_operating_income: None,
            prev_net_income: None,
            prev_total_assets: None,
            prev_current_assets: None,
            prev_current_liabilities: None,
            prev_inventory: None,
            prev_long_term_debt: None,
            sector: default_sector(),
        }
    }
}

impl MetricsInput {
    /// Check the ingestion contract: every current-period value must be a
    /// finite number, and present prior-period values must be finite too.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let current = [
            ("revenue", self.revenue),
            ("operating_income", self.operating_income),
            ("net_income", self.net_income),
            ("ebit", self.ebit),
            ("interest_expense", self.interest_expense),
            ("depreciation", self.depreciation),
            ("total_assets", self.total_assets),
            ("total_equity", self.total_equity),
            ("current_assets", self.current_assets),
            ("current_liabilities", self.current_liabilities),
            ("inventory", self.inventory),
            ("retained_earnings", self.retained_earnings),
            ("long_term_debt", self.long_term_debt),
            ("operating_cf", self.operating_cf),
            ("investing_cf", self.investing_cf),
            ("capex", self.capex),
            ("stock_price", self.stock_price),
            ("market_cap", self.market_cap),
            ("beta", self.beta),
        ];
        if let Some((name, _)) = current.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AnalysisError::InvalidData(format!(
                "{} must be a finite number",
                name
            )));
        }

        let prior = [
            ("prev_revenue", self.prev_revenue),
            ("prev_operating_income", self.prev_operating_income),
            ("prev_net_income", self.prev_net_income),
            ("prev_total_assets", self.prev_total_assets),
            ("prev_current_assets", self.prev_current_assets),
            ("prev_current_liabilities", self.prev_current_liabilities),
            ("prev_inventory", self.prev_inventory),
            ("prev_long_term_debt", self.prev_long_term_debt),
        ];
        if let Some((name, _)) = prior
            .iter()
            .find(|(_, v)| v.map_or(false, |x| !x.is_finite()))
        {
            return Err(AnalysisError::InvalidData(format!(
                "{} must be a finite number when present",
                name
            )));
        }

        Ok(())
    }
}

/// A company snapshot as handed over by the ingestion side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySnapshot {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub analysis_date: NaiveDate,
    pub metrics: MetricsInput,
}

/// ROE decomposition: margin x turnover x leverage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DupontBreakdown {
    pub net_profit_margin: f64,
    pub asset_turnover: f64,
    pub financial_leverage: f64,
    pub roe: f64,
}

/// Output of the ratio calculator.
///
/// `None` means "not computable from the given input" and must be excluded
/// downstream, never read as zero. Accruals, gross profitability and CBOP
/// fall back to 0.0 instead, so they are plain floats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioBundle {
    // Safety & risk
    pub altman_z: Option<f64>,
    pub interest_coverage: Option<f64>,

    // Quality of earnings
    pub accruals_ratio: f64,
    pub earnings_quality: Option<f64>,
    pub delta_noa: Option<f64>,
    pub inventory_quality: Option<f64>,

    // Growth quality & structure
    pub gross_profitability: f64,
    pub cbop: f64,
    pub roiic: Option<f64>,
    pub reinvestment_rate: Option<f64>,
    pub dupont: Option<DupontBreakdown>,

    // Expectation
    pub implied_growth_rate: Option<f64>,
    pub equity_duration: Option<f64>,
    pub target_margin: f64,
    pub implied_revenue_growth: Option<f64>,
    pub actual_revenue_growth: Option<f64>,
    pub reality_gap: Option<f64>,

    // Margins (percent), cash and multiples
    pub operating_margin: Option<f64>,
    pub ocf_margin: Option<f64>,
    pub core_fcf: f64,
    pub core_fcf_margin: Option<f64>,
    pub equity_ratio: Option<f64>,
    pub operating_margin_improved: Option<bool>,
    pub per: Option<f64>,
    pub pbr: Option<f64>,
}

impl RatioBundle {
    /// Flat name -> value view, with the Dupont record expanded into
    /// `dupont_*` entries.
    pub fn to_map(&self) -> BTreeMap<&'static str, Option<f64>> {
        let mut map = BTreeMap::new();
        map.insert("altman_z", self.altman_z);
        map.insert("interest_coverage", self.interest_coverage);
        map.insert("accruals_ratio", Some(self.accruals_ratio));
        map.insert("earnings_quality", self.earnings_quality);
        map.insert("delta_noa", self.delta_noa);
        map.insert("inventory_quality", self.inventory_quality);
        map.insert("gross_profitability", Some(self.gross_profitability));
        map.insert("cbop", Some(self.cbop));
        map.insert("roiic", self.roiic);
        map.insert("reinvestment_rate", self.reinvestment_rate);
        map.insert("dupont_net_profit_margin", self.dupont.map(|d| d.net_profit_margin));
        map.insert("dupont_asset_turnover", self.dupont.map(|d| d.asset_turnover));
        map.insert("dupont_financial_leverage", self.dupont.map(|d| d.financial_leverage));
        map.insert("dupont_roe", self.dupont.map(|d| d.roe));
        map.insert("implied_growth_rate", self.implied_growth_rate);
        map.insert("equity_duration", self.equity_duration);
        map.insert("target_margin", Some(self.target_margin));
        map.insert("implied_revenue_growth", self.implied_revenue_growth);
        map.insert("actual_revenue_growth", self.actual_revenue_growth);
        map.insert("reality_gap", self.reality_gap);
        map.insert("operating_margin", self.operating_margin);
        map.insert("ocf_margin", self.ocf_margin);
        map.insert("core_fcf", Some(self.core_fcf));
        map.insert("core_fcf_margin", self.core_fcf_margin);
        map.insert("equity_ratio", self.equity_ratio);
        map.insert("per", self.per);
        map.insert("pbr", self.pbr);
        map
    }
}

/// Altman Z-Score zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltmanZone {
    Distress,
    Grey,
    Safe,
}

impl AltmanZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            AltmanZone::Distress => "distress",
            AltmanZone::Grey => "grey",
            AltmanZone::Safe => "safe",
        }
    }
}

impl fmt::Display for AltmanZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite scores.
///
/// `altman_zone` is `None` exactly when the Z-Score itself is not computable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBundle {
    pub f_score: u8,
    pub f_score_reasons: Vec<String>,
    pub altman_zone: Option<AltmanZone>,
}

/// Display grouping for character tags. Grouping never implies exclusivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagLayer {
    SafetyQuality,
    CharacterPhase,
    RiskWarning,
}

/// The fixed taxonomy of character tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacterTag {
    SafetyShield,
    QualityGrowth,
    InstitutionalQuality,
    CashCow,
    SingleEngine,
    HighVolatility,
    SilentImprover,
    Turnaround,
    Zombie,
    AccountingRisk,
    Fragile,
}

impl CharacterTag {
    pub const ALL: [CharacterTag; 11] = [
        CharacterTag::SafetyShield,
        CharacterTag::QualityGrowth,
        CharacterTag::InstitutionalQuality,
        CharacterTag::CashCow,
        CharacterTag::SingleEngine,
        CharacterTag::HighVolatility,
        CharacterTag::SilentImprover,
        CharacterTag::Turnaround,
        CharacterTag::Zombie,
        CharacterTag::AccountingRisk,
        CharacterTag::Fragile,
    ];

    /// Stable identifier used by persistence and presentation.
    pub fn key(&self) -> &'static str {
        match self {
            CharacterTag::SafetyShield => "tag_safety_shield",
            CharacterTag::QualityGrowth => "tag_quality_growth",
            CharacterTag::InstitutionalQuality => "tag_institutional",
            CharacterTag::CashCow => "tag_cash_cow",
            CharacterTag::SingleEngine => "tag_single_engine",
            CharacterTag::HighVolatility => "tag_high_volatility",
            CharacterTag::SilentImprover => "tag_silent_improver",
            CharacterTag::Turnaround => "tag_turnaround",
            CharacterTag::Zombie => "tag_zombie",
            CharacterTag::AccountingRisk => "tag_accounting_risk",
            CharacterTag::Fragile => "tag_fragile",
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            CharacterTag::SafetyShield => "Safety Shield",
            CharacterTag::QualityGrowth => "Quality Growth",
            CharacterTag::InstitutionalQuality => "Institutional Quality",
            CharacterTag::CashCow => "Cash Cow",
            CharacterTag::SingleEngine => "Single Engine",
            CharacterTag::HighVolatility => "High Volatility",
            CharacterTag::SilentImprover => "Silent Improver",
            CharacterTag::Turnaround => "Turnaround",
            CharacterTag::Zombie => "Zombie",
            CharacterTag::AccountingRisk => "Accounting Risk",
            CharacterTag::Fragile => "Fragile",
        }
    }

    pub fn layer(&self) -> TagLayer {
        match self {
            CharacterTag::SafetyShield
            | CharacterTag::QualityGrowth
            | CharacterTag::InstitutionalQuality
            | CharacterTag::CashCow => TagLayer::SafetyQuality,
            CharacterTag::SingleEngine
            | CharacterTag::HighVolatility
            | CharacterTag::SilentImprover
            | CharacterTag::Turnaround => TagLayer::CharacterPhase,
            CharacterTag::Zombie | CharacterTag::AccountingRisk | CharacterTag::Fragile => {
                TagLayer::RiskWarning
            }
        }
    }
}

/// Independent boolean character tags. Any number of them may be set at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    pub safety_shield: bool,
    pub quality_growth: bool,
    pub institutional_quality: bool,
    pub cash_cow: bool,
    pub single_engine: bool,
    pub high_volatility: bool,
    pub silent_improver: bool,
    pub turnaround: bool,
    pub zombie: bool,
    pub accounting_risk: bool,
    pub fragile: bool,
}

impl TagSet {
    pub fn is_set(&self, tag: CharacterTag) -> bool {
        match tag {
            CharacterTag::SafetyShield => self.safety_shield,
            CharacterTag::QualityGrowth => self.quality_growth,
            CharacterTag::InstitutionalQuality => self.institutional_quality,
            CharacterTag::CashCow => self.cash_cow,
            CharacterTag::SingleEngine => self.single_engine,
            CharacterTag::HighVolatility => self.high_volatility,
            CharacterTag::SilentImprover => self.silent_improver,
            CharacterTag::Turnaround => self.turnaround,
            CharacterTag::Zombie => self.zombie,
            CharacterTag::AccountingRisk => self.accounting_risk,
            CharacterTag::Fragile => self.fragile,
        }
    }

    /// Tags currently set, in taxonomy order
    pub fn active(&self) -> Vec<CharacterTag> {
        CharacterTag::ALL
            .iter()
            .copied()
            .filter(|t| self.is_set(*t))
            .collect()
    }
}

/// Corporate state classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorporateState {
    #[serde(rename = "Financial Distress")]
    FinancialDistress,
    #[serde(rename = "Deteriorating")]
    Deteriorating,
    #[serde(rename = "Cash Generator")]
    CashGenerator,
    #[serde(rename = "High Growth")]
    HighGrowth,
    #[serde(rename = "Neutral")]
    Neutral,
}

impl CorporateState {
    pub fn to_label(&self) -> &'static str {
        match self {
            CorporateState::FinancialDistress => "Financial Distress",
            CorporateState::Deteriorating => "Deteriorating",
            CorporateState::CashGenerator => "Cash Generator",
            CorporateState::HighGrowth => "High Growth",
            CorporateState::Neutral => "Neutral",
        }
    }
}

/// Market expectation structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketExpectation {
    #[serde(rename = "Single Engine")]
    SingleEngine,
    #[serde(rename = "Overheated")]
    Overheated,
    #[serde(rename = "Underestimated")]
    Underestimated,
    #[serde(rename = "Optimistic")]
    Optimistic,
    #[serde(rename = "Reasonable")]
    Reasonable,
}

impl MarketExpectation {
    pub fn to_label(&self) -> &'static str {
        match self {
            MarketExpectation::SingleEngine => "Single Engine",
            MarketExpectation::Overheated => "Overheated",
            MarketExpectation::Underestimated => "Underestimated",
            MarketExpectation::Optimistic => "Optimistic",
            MarketExpectation::Reasonable => "Reasonable",
        }
    }
}

/// Risk level, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub state: CorporateState,
    pub expectation: MarketExpectation,
    pub risk_level: RiskLevel,
    pub risk_reasons: Vec<String>,
}

/// Narrative card category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Critical,
    Warning,
    Opportunity,
    Info,
    Success,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Critical => "critical",
            CardType::Warning => "warning",
            CardType::Opportunity => "opportunity",
            CardType::Info => "info",
            CardType::Success => "success",
        }
    }
}

/// A human-readable diagnostic card. `severity` runs from 1 to 5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeCard {
    pub id: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub severity: u8,
    pub title: String,
    pub body: String,
    pub advice: String,
}

/// Everything one analysis run produces for one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalReport {
    pub ratios: RatioBundle,
    pub scores: ScoreBundle,
    pub tags: TagSet,
    pub diagnosis: Diagnosis,
    pub narrative: Vec<NarrativeCard>,
}
