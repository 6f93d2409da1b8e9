use serde::{Deserialize, Serialize};

/// Market assumptions used by the expectation models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineAssumptions {
    pub risk_free_rate: f64,
    pub market_risk_premium: f64,
    /// Discount rate for the equity duration proxy
    pub discount_rate: f64,
}

impl Default for EngineAssumptions {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.01,
            market_risk_premium: 0.06,
            discount_rate: 0.08,
        }
    }
}

impl EngineAssumptions {
    /// CAPM cost of equity for a given beta
    pub fn cost_of_equity(&self, beta: f64) -> f64 {
        self.risk_free_rate + beta * self.market_risk_premium
    }
}
