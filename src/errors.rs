use rust_decimal::Decimal;
use thiserror::Error;

use crate::decimal::Money;
use crate::types::LoanId;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid loan term: {months} months (must be between 1 and {max})", max = crate::loan::MAX_TERM_MONTHS)]
    InvalidLoanTerm {
        months: i64,
    },

    #[error("invalid interest rate: {rate}% (must be between 0 and {max}%)", max = crate::loan::MAX_RATE_PERCENT)]
    InvalidRate {
        rate: Decimal,
    },

    #[error("invalid principal amount: {amount} (must be greater than zero and at most {max})", max = crate::loan::MAX_PRINCIPAL)]
    InvalidPrincipal {
        amount: Money,
    },

    #[error("due date of installment {installment} is outside the calendar range")]
    DueDateOutOfRange {
        installment: u32,
    },

    #[error("borrower name is required")]
    MissingBorrowerName,

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("invalid payment number: {number} (must be positive)")]
    InvalidPaymentNumber {
        number: i64,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("missing field: {field}")]
    MissingField {
        field: &'static str,
    },

    #[error("unknown loan type: {value}")]
    UnknownLoanType {
        value: String,
    },

    #[error("unknown loan status: {value}")]
    UnknownStatus {
        value: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
