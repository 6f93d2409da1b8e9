use analysis_core::AnalysisError;
use fundamental_analysis::EngineAssumptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub assumptions: EngineAssumptions,
    /// Maximum number of companies analyzed at once
    pub concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            assumptions: EngineAssumptions::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl OrchestratorConfig {
    /// Read the configuration from the process environment. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, AnalysisError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Missing keys take their
    /// defaults; present keys must parse and be in range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AnalysisError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineAssumptions::default();
        let assumptions = EngineAssumptions {
            risk_free_rate: parse_or(&lookup, "RISK_FREE_RATE", defaults.risk_free_rate)?,
            market_risk_premium: parse_or(
                &lookup,
                "MARKET_RISK_PREMIUM",
                defaults.market_risk_premium,
            )?,
            discount_rate: parse_or(&lookup, "DISCOUNT_RATE", defaults.discount_rate)?,
        };

        for (name, value) in [
            ("RISK_FREE_RATE", assumptions.risk_free_rate),
            ("MARKET_RISK_PREMIUM", assumptions.market_risk_premium),
            ("DISCOUNT_RATE", assumptions.discount_rate),
        ] {
            if !value.is_finite() {
                return Err(AnalysisError::Configuration(format!(
                    "{} must be a finite number",
                    name
                )));
            }
        }

        let concurrency: usize = parse_or(&lookup, "ANALYSIS_CONCURRENCY", DEFAULT_CONCURRENCY)?;
        if concurrency == 0 {
            return Err(AnalysisError::Configuration(
                "ANALYSIS_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            assumptions,
            concurrency,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AnalysisError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            AnalysisError::Configuration(format!("{} has an invalid value: {:?}", key, raw))
        }),
        None => Ok(default),
    }
}
