use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("period must be positive")]
    InvalidPeriod,

    #[error("insufficient data: need {required} points, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("non-finite price at index {0}")]
    NonFinitePrice(usize),
}
