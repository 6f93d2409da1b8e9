//! Flat persistence row: one record per company per analysis date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    AltmanZone, CompanySnapshot, CorporateState, FundamentalReport, MarketExpectation, RiskLevel,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub symbol: String,
    pub analysis_date: NaiveDate,
    pub stock_price: f64,
    pub market_cap: f64,
    pub f_score: u8,
    pub altman_z: Option<f64>,
    pub altman_zone: Option<AltmanZone>,
    pub accruals_ratio: f64,
    pub state: CorporateState,
    pub expectation: MarketExpectation,
    pub risk_level: RiskLevel,
    pub tag_safety_shield: bool,
    pub tag_quality_growth: bool,
    pub tag_institutional: bool,
    pub tag_cash_cow: bool,
    pub tag_single_engine: bool,
    pub tag_high_volatility: bool,
    pub tag_silent_improver: bool,
    pub tag_turnaround: bool,
    pub tag_zombie: bool,
    pub tag_accounting_risk: bool,
    pub tag_fragile: bool,
}

impl AnalysisRecord {
    pub fn from_report(snapshot: &CompanySnapshot, report: &FundamentalReport) -> Self {
        let tags = &report.tags;
        Self {
            symbol: snapshot.symbol.clone(),
            analysis_date: snapshot.analysis_date,
            stock_price: snapshot.metrics.stock_price,
            market_cap: snapshot.metrics.market_cap,
            f_score: report.scores.f_score,
            altman_z: report.ratios.altman_z,
            altman_zone: report.scores.altman_zone,
            accruals_ratio: report.ratios.accruals_ratio,
            state: report.diagnosis.state,
            expectation: report.diagnosis.expectation,
            risk_level: report.diagnosis.risk_level,
            tag_safety_shield: tags.safety_shield,
            tag_quality_growth: tags.quality_growth,
            tag_institutional: tags.institutional_quality,
            tag_cash_cow: tags.cash_cow,
            tag_single_engine: tags.single_engine,
            tag_high_volatility: tags.high_volatility,
            tag_silent_improver: tags.silent_improver,
            tag_turnaround: tags.turnaround,
            tag_zombie: tags.zombie,
            tag_accounting_risk: tags.accounting_risk,
            tag_fragile: tags.fragile,
        }
    }
}
