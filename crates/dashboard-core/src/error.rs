use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("No data returned: {0}")]
    EmptyInput(String),

    #[error("No Close price column among {0:?}")]
    MissingColumn(Vec<String>),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Provider error: {0}")]
    ProviderFailure(String),
}

pub type DashboardResult<T> = Result<T, DashboardError>;
