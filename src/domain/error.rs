// Errors raised by the analytics core for invalid call shapes
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("page size must be at least 1")]
    InvalidPageSize,

    #[error("daily window must cover at least one day, got {0}")]
    InvalidWindow(usize),
}
