use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::LedgerError;

/// unique identifier for a loan
pub type LoanId = u64;

/// unique identifier for a recorded payment
pub type PaymentId = u64;

/// identifier of the user who owns a loan
pub type UserId = u64;

/// amortization scheme used to compute installments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AmortizationType {
    /// constant amortization: fixed principal portion, interest on the remaining balance
    #[default]
    #[serde(rename = "SAC")]
    Sac,
    /// french table: constant total installment
    #[serde(rename = "PRICE")]
    Price,
}

impl AmortizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmortizationType::Sac => "SAC",
            AmortizationType::Price => "PRICE",
        }
    }
}

impl fmt::Display for AmortizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmortizationType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SAC" => Ok(AmortizationType::Sac),
            "PRICE" => Ok(AmortizationType::Price),
            _ => Err(LedgerError::UnknownLoanType { value: s.to_string() }),
        }
    }
}

/// loan status, set externally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// loan is running
    #[default]
    Active,
    /// loan is suspended or archived
    Inactive,
    /// loan has been fully repaid
    PaidOff,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Inactive => "inactive",
            LoanStatus::PaidOff => "paid_off",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(LoanStatus::Active),
            "inactive" => Ok(LoanStatus::Inactive),
            "paid_off" => Ok(LoanStatus::PaidOff),
            _ => Err(LedgerError::UnknownStatus { value: s.to_string() }),
        }
    }
}
