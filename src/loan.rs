use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::add_months;
use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::{AmortizationType, LoanId, LoanStatus, UserId};

/// a stored loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: LoanId,
    pub user_id: UserId,
    pub borrower_name: String,
    pub principal_amount: Money,
    /// monthly rate in percent
    pub interest_rate: Rate,
    pub loan_term_months: u32,
    pub start_date: NaiveDate,
    pub first_payment_due_date: NaiveDate,
    pub loan_type: AmortizationType,
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoanRecord {
    /// assemble a stored loan from a validated draft
    pub fn from_draft(
        id: LoanId,
        user_id: UserId,
        draft: NewLoan,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            borrower_name: draft.borrower_name,
            principal_amount: draft.principal_amount,
            interest_rate: draft.interest_rate,
            loan_term_months: draft.loan_term_months,
            start_date: draft.start_date,
            first_payment_due_date: draft.first_payment_due_date,
            loan_type: draft.loan_type.unwrap_or_default(),
            status: draft.status.unwrap_or_default(),
            created_at,
            updated_at: created_at,
        }
    }

    /// re-run the construction checks against the current field values
    pub fn validate(&self) -> Result<()> {
        validate_terms(
            &self.borrower_name,
            self.principal_amount,
            self.interest_rate,
            self.loan_term_months as i64,
        )?;
        validate_due_dates(self.first_payment_due_date, self.loan_term_months)
    }

    /// refresh the update timestamp after a mutation
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }
}

/// longest term any record may carry; keeps schedules and compounding bounded
pub const MAX_TERM_MONTHS: u32 = 1200;

/// largest principal, in whole currency units
pub const MAX_PRINCIPAL: i64 = 1_000_000_000_000_000;

/// highest monthly rate, in percent
pub const MAX_RATE_PERCENT: i64 = 1000;

/// precondition checks shared by drafts, stored records and decoded DTOs
///
/// The upper bounds keep every installment, schedule row and total within
/// the decimal range.
pub fn validate_terms(
    borrower_name: &str,
    principal_amount: Money,
    interest_rate: Rate,
    loan_term_months: i64,
) -> Result<()> {
    if borrower_name.trim().is_empty() {
        return Err(LedgerError::MissingBorrowerName);
    }
    if !principal_amount.is_positive() || principal_amount > Money::from_major(MAX_PRINCIPAL) {
        return Err(LedgerError::InvalidPrincipal { amount: principal_amount });
    }
    if interest_rate.is_negative() || interest_rate.as_percentage() > Decimal::from(MAX_RATE_PERCENT) {
        return Err(LedgerError::InvalidRate {
            rate: interest_rate.as_percentage(),
        });
    }
    if loan_term_months <= 0 || loan_term_months > MAX_TERM_MONTHS as i64 {
        return Err(LedgerError::InvalidLoanTerm { months: loan_term_months });
    }
    Ok(())
}

/// the last installment's due date must be a representable calendar date
pub fn validate_due_dates(first_payment_due_date: NaiveDate, loan_term_months: u32) -> Result<()> {
    let last = loan_term_months.saturating_sub(1);
    match add_months(first_payment_due_date, last) {
        Some(_) => Ok(()),
        None => Err(LedgerError::DueDateOutOfRange {
            installment: loan_term_months,
        }),
    }
}

/// validated draft of a loan that has not been stored yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    pub borrower_name: String,
    pub principal_amount: Money,
    pub interest_rate: Rate,
    pub loan_term_months: u32,
    pub start_date: NaiveDate,
    pub first_payment_due_date: NaiveDate,
    /// `None` lets the ledger configuration decide
    pub loan_type: Option<AmortizationType>,
    pub status: Option<LoanStatus>,
}

impl NewLoan {
    pub fn builder() -> LoanBuilder {
        LoanBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        validate_terms(
            &self.borrower_name,
            self.principal_amount,
            self.interest_rate,
            self.loan_term_months as i64,
        )?;
        validate_due_dates(self.first_payment_due_date, self.loan_term_months)
    }
}

/// builder for new loans
#[derive(Debug, Default)]
pub struct LoanBuilder {
    borrower_name: Option<String>,
    principal_amount: Option<Money>,
    interest_rate: Option<Rate>,
    loan_term_months: Option<u32>,
    start_date: Option<NaiveDate>,
    first_payment_due_date: Option<NaiveDate>,
    loan_type: Option<AmortizationType>,
    status: Option<LoanStatus>,
}

impl LoanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn borrower_name(mut self, name: impl Into<String>) -> Self {
        self.borrower_name = Some(name.into());
        self
    }

    pub fn principal(mut self, amount: Money) -> Self {
        self.principal_amount = Some(amount);
        self
    }

    pub fn rate(mut self, rate: Rate) -> Self {
        self.interest_rate = Some(rate);
        self
    }

    pub fn term_months(mut self, months: u32) -> Self {
        self.loan_term_months = Some(months);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn first_payment_due(mut self, date: NaiveDate) -> Self {
        self.first_payment_due_date = Some(date);
        self
    }

    pub fn loan_type(mut self, loan_type: AmortizationType) -> Self {
        self.loan_type = Some(loan_type);
        self
    }

    pub fn status(mut self, status: LoanStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// build and validate the draft
    pub fn build(self) -> Result<NewLoan> {
        let loan = NewLoan {
            borrower_name: self.borrower_name.ok_or(LedgerError::MissingBorrowerName)?,
            principal_amount: self
                .principal_amount
                .ok_or(LedgerError::MissingField { field: "principal_amount" })?,
            interest_rate: self
                .interest_rate
                .ok_or(LedgerError::MissingField { field: "interest_rate" })?,
            loan_term_months: self
                .loan_term_months
                .ok_or(LedgerError::MissingField { field: "loan_term_months" })?,
            start_date: self
                .start_date
                .ok_or(LedgerError::MissingField { field: "start_date" })?,
            first_payment_due_date: self
                .first_payment_due_date
                .ok_or(LedgerError::MissingField { field: "first_payment_due_date" })?,
            loan_type: self.loan_type,
            status: self.status,
        };

        loan.validate()?;
        Ok(loan)
    }
}
