//! external representation of loans and payments
//!
//! Field lists are fixed; dates travel as `YYYY-MM-DD`, timestamps as
//! RFC 3339, and unset date/time fields as `null`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::loan::{validate_due_dates, validate_terms, LoanRecord};
use crate::payment::{validate_payment, PaymentRecord};
use crate::types::{AmortizationType, LoanId, LoanStatus, PaymentId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDto {
    pub id: LoanId,
    pub user_id: UserId,
    pub borrower_name: String,
    pub principal_amount: Money,
    pub interest_rate: Rate,
    /// signed so that a negative term is reported as a term error
    pub loan_term_months: i64,
    pub start_date: Option<NaiveDate>,
    pub first_payment_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub loan_type: AmortizationType,
    #[serde(default)]
    pub status: LoanStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDto {
    pub id: PaymentId,
    pub loan_id: LoanId,
    pub payment_date: Option<NaiveDate>,
    pub amount_paid: Money,
    #[serde(default)]
    pub principal_paid: Money,
    #[serde(default)]
    pub interest_paid: Money,
    #[serde(default)]
    pub outstanding_balance: Money,
    pub payment_number: i64,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&LoanRecord> for LoanDto {
    fn from(loan: &LoanRecord) -> Self {
        Self {
            id: loan.id,
            user_id: loan.user_id,
            borrower_name: loan.borrower_name.clone(),
            principal_amount: loan.principal_amount,
            interest_rate: loan.interest_rate,
            loan_term_months: loan.loan_term_months as i64,
            start_date: Some(loan.start_date),
            first_payment_due_date: Some(loan.first_payment_due_date),
            loan_type: loan.loan_type,
            status: loan.status,
            created_at: Some(loan.created_at),
            updated_at: Some(loan.updated_at),
        }
    }
}

impl TryFrom<LoanDto> for LoanRecord {
    type Error = LedgerError;

    fn try_from(dto: LoanDto) -> Result<Self> {
        validate_terms(
            &dto.borrower_name,
            dto.principal_amount,
            dto.interest_rate,
            dto.loan_term_months,
        )?;

        // in range after validate_terms
        let loan_term_months = dto.loan_term_months as u32;
        let first_payment_due_date = dto
            .first_payment_due_date
            .ok_or(LedgerError::MissingField { field: "first_payment_due_date" })?;
        validate_due_dates(first_payment_due_date, loan_term_months)?;

        Ok(LoanRecord {
            id: dto.id,
            user_id: dto.user_id,
            borrower_name: dto.borrower_name,
            principal_amount: dto.principal_amount,
            interest_rate: dto.interest_rate,
            loan_term_months,
            start_date: dto.start_date.ok_or(LedgerError::MissingField { field: "start_date" })?,
            first_payment_due_date,
            loan_type: dto.loan_type,
            status: dto.status,
            created_at: dto.created_at.ok_or(LedgerError::MissingField { field: "created_at" })?,
            updated_at: dto.updated_at.ok_or(LedgerError::MissingField { field: "updated_at" })?,
        })
    }
}

impl From<&PaymentRecord> for PaymentDto {
    fn from(payment: &PaymentRecord) -> Self {
        Self {
            id: payment.id,
            loan_id: payment.loan_id,
            payment_date: Some(payment.payment_date),
            amount_paid: payment.amount_paid,
            principal_paid: payment.principal_paid,
            interest_paid: payment.interest_paid,
            outstanding_balance: payment.outstanding_balance,
            payment_number: payment.payment_number as i64,
            notes: payment.notes.clone(),
            created_at: Some(payment.created_at),
        }
    }
}

impl TryFrom<PaymentDto> for PaymentRecord {
    type Error = LedgerError;

    fn try_from(dto: PaymentDto) -> Result<Self> {
        validate_payment(dto.amount_paid, dto.payment_number)?;

        Ok(PaymentRecord {
            id: dto.id,
            loan_id: dto.loan_id,
            payment_date: dto.payment_date.ok_or(LedgerError::MissingField { field: "payment_date" })?,
            amount_paid: dto.amount_paid,
            principal_paid: dto.principal_paid,
            interest_paid: dto.interest_paid,
            outstanding_balance: dto.outstanding_balance,
            payment_number: dto.payment_number as u32,
            notes: dto.notes,
            created_at: dto.created_at.ok_or(LedgerError::MissingField { field: "created_at" })?,
        })
    }
}

impl LoanDto {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl PaymentDto {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
