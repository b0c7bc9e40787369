use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::amortization::{
    add_months, AmortizationSchedule, NextInstallmentCalculator, OutstandingBalanceCalculator,
};
use crate::decimal::Money;
use crate::errors::Result;
use crate::loan::LoanRecord;
use crate::payment::PaymentRecord;

/// a loan together with its payments, in insertion order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanAccount {
    pub loan: LoanRecord,
    pub payments: Vec<PaymentRecord>,
}

impl LoanAccount {
    pub fn new(loan: LoanRecord, payments: Vec<PaymentRecord>) -> Self {
        Self { loan, payments }
    }

    pub fn outstanding_balance(&self) -> Money {
        OutstandingBalanceCalculator::calculate(&self.loan, &self.payments)
    }

    pub fn next_installment(&self) -> Money {
        NextInstallmentCalculator::calculate(&self.loan, &self.payments)
    }

    pub fn total_paid(&self) -> Money {
        OutstandingBalanceCalculator::total_paid(&self.loan, &self.payments)
    }

    pub fn payments_made(&self) -> u32 {
        u32::try_from(self.payments.len()).unwrap_or(u32::MAX)
    }

    /// every installment of the term has a payment recorded
    pub fn all_installments_paid(&self) -> bool {
        self.payments_made() >= self.loan.loan_term_months
    }

    /// due date of the next unpaid installment, `None` once the term is covered
    /// or the date falls past the end of the calendar
    pub fn next_due_date(&self) -> Option<NaiveDate> {
        if self.all_installments_paid() {
            return None;
        }
        add_months(self.loan.first_payment_due_date, self.payments_made())
    }

    /// active loan whose next due date plus grace lies before `as_of`
    pub fn is_overdue(&self, as_of: NaiveDate, grace_days: u32) -> bool {
        if !self.loan.is_active() {
            return false;
        }
        match self.next_due_date() {
            Some(due) => due
                .checked_add_signed(Duration::days(i64::from(grace_days)))
                .is_some_and(|deadline| deadline < as_of),
            None => false,
        }
    }

    pub fn schedule(&self) -> Result<AmortizationSchedule> {
        AmortizationSchedule::generate(&self.loan)
    }
}
