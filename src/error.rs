// src/error.rs
use thiserror::Error;

use crate::models::Karat;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PawnError {
    #[error("Invalid karat {0}. Must be one of: {}", Karat::supported_list())]
    InvalidKarat(u32),

    #[error("Weight must be greater than 0 (got {0})")]
    InvalidWeight(f64),

    #[error("Invalid input for '{0}'. Please enter valid numbers.")]
    InvalidNumericInput(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Price source unavailable: {0}")]
    PriceSourceUnavailable(String),
}

impl PawnError {
    /// Errors caused by bad caller input, surfaced as 400 responses.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PawnError::InvalidKarat(_) | PawnError::InvalidWeight(_) | PawnError::InvalidNumericInput(_)
        )
    }
}

impl From<anyhow::Error> for PawnError {
    fn from(e: anyhow::Error) -> Self {
        PawnError::Persistence(format!("{:#}", e))
    }
}

pub type Result<T> = std::result::Result<T, PawnError>;
