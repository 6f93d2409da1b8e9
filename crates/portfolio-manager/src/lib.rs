pub mod models;
pub mod portfolio;

pub use models::*;
pub use portfolio::PortfolioAnalyzer;
