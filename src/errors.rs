use thiserror::Error;

use crate::decimal::Money;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FinancingError {
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        name: &'static str,
        message: String,
    },

    #[error("loan does not amortize in period {period}: payment {payment} does not exceed interest {interest} on balance {balance}")]
    NonAmortizingLoan {
        period: u32,
        balance: Money,
        interest: Money,
        payment: Money,
    },

    #[error("iteration limit of {limit} periods reached with remaining balance {remaining_balance}")]
    IterationLimitExceeded {
        limit: u32,
        remaining_balance: Money,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

impl FinancingError {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        FinancingError::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for FinancingError {
    fn from(err: serde_json::Error) -> Self {
        FinancingError::InvalidConfiguration {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FinancingError>;
