use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{LoanId, PaymentId};

/// one installment actually paid against a loan; immutable once stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub loan_id: LoanId,
    pub payment_date: NaiveDate,
    pub amount_paid: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    /// balance snapshot taken right after this payment
    pub outstanding_balance: Money,
    pub payment_number: u32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn from_draft(id: PaymentId, draft: NewPayment, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            loan_id: draft.loan_id,
            payment_date: draft.payment_date,
            amount_paid: draft.amount_paid,
            principal_paid: draft.principal_paid,
            interest_paid: draft.interest_paid,
            outstanding_balance: draft.outstanding_balance,
            payment_number: draft.payment_number,
            notes: draft.notes,
            created_at,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_payment(self.amount_paid, self.payment_number as i64)
    }
}

pub fn validate_payment(amount_paid: Money, payment_number: i64) -> Result<()> {
    if amount_paid.is_negative() {
        return Err(LedgerError::InvalidPaymentAmount { amount: amount_paid });
    }
    if payment_number <= 0 || payment_number > u32::MAX as i64 {
        return Err(LedgerError::InvalidPaymentNumber { number: payment_number });
    }
    Ok(())
}

/// payment waiting to be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub loan_id: LoanId,
    pub payment_date: NaiveDate,
    pub amount_paid: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub outstanding_balance: Money,
    pub payment_number: u32,
    pub notes: Option<String>,
}

impl NewPayment {
    /// draft with the required fields; portions and snapshot default to zero
    pub fn new(
        loan_id: LoanId,
        payment_date: NaiveDate,
        amount_paid: Money,
        payment_number: u32,
    ) -> Self {
        Self {
            loan_id,
            payment_date,
            amount_paid,
            principal_paid: Money::ZERO,
            interest_paid: Money::ZERO,
            outstanding_balance: Money::ZERO,
            payment_number,
            notes: None,
        }
    }

    pub fn with_split(mut self, principal_paid: Money, interest_paid: Money) -> Self {
        self.principal_paid = principal_paid;
        self.interest_paid = interest_paid;
        self
    }

    pub fn with_outstanding_balance(mut self, balance: Money) -> Self {
        self.outstanding_balance = balance;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_payment(self.amount_paid, self.payment_number as i64)
    }
}
