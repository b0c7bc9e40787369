use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::loan::MAX_TERM_MONTHS;
use crate::types::{AmortizationType, LoanStatus};

/// ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// scheme applied when a new loan does not name one
    pub default_loan_type: AmortizationType,
    /// status given to newly created loans
    pub default_status: LoanStatus,
    /// longest accepted term
    pub max_term_months: u32,
    /// days after a due date before a loan counts as overdue
    pub overdue_grace_days: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_loan_type: AmortizationType::Sac,
            default_status: LoanStatus::Active,
            max_term_months: 600,
            overdue_grace_days: 0,
        }
    }
}

impl LedgerConfig {
    /// informal loans between people: short terms, fixed installments
    pub fn personal() -> Self {
        Self {
            default_loan_type: AmortizationType::Price,
            max_term_months: 120,
            overdue_grace_days: 5,
            ..Self::default()
        }
    }

    /// long real-estate style financing, constant amortization
    pub fn financing() -> Self {
        Self {
            default_loan_type: AmortizationType::Sac,
            max_term_months: 420,
            overdue_grace_days: 15,
            ..Self::default()
        }
    }

    /// parse from json, missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LedgerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_term_months == 0 || self.max_term_months > MAX_TERM_MONTHS {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "max_term_months must be between 1 and {MAX_TERM_MONTHS}, got {}",
                    self.max_term_months
                ),
            });
        }
        if self.overdue_grace_days > 365 {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("overdue_grace_days too large: {}", self.overdue_grace_days),
            });
        }
        Ok(())
    }
}
