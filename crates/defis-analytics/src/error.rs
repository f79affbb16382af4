use thiserror::Error;

/// Reasons a set of portfolio weights cannot be normalized.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PortfolioError {
    #[error("portfolio has no entries")]
    Empty,

    #[error("weight for group '{group}' must be a finite non-negative number, got {weight}")]
    InvalidWeight { group: String, weight: f64 },

    #[error("portfolio weights sum to zero")]
    ZeroTotal,
}

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    #[error("no products found for group '{0}'")]
    UnknownGroup(String),

    #[error("no revenue lines found for laboratory '{0}'")]
    UnknownLab(String),

    #[error("cannot compare group '{0}' with itself")]
    SameGroup(String),

    #[error("invalid lookup key '{0}'")]
    InvalidKey(String),
}
