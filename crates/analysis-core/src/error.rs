use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::InvalidData("revenue is not finite".to_string());
        assert_eq!(err.to_string(), "Invalid data: revenue is not finite");

        let err = AnalysisError::Configuration("ANALYSIS_CONCURRENCY must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: ANALYSIS_CONCURRENCY must be at least 1"
        );

        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AnalysisError = parse_err.into();
        assert!(matches!(err, AnalysisError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error: "));
    }
}
