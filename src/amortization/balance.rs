use crate::decimal::Money;
use crate::loan::LoanRecord;
use crate::payment::PaymentRecord;

/// remaining balance of a loan given the payments recorded against it
///
/// The figure is `principal - Σ amount_paid`, floored at zero. Accrued
/// interest is not tracked, so the balance falls faster than the one an
/// amortization table would show for the same payments.
pub struct OutstandingBalanceCalculator;

impl OutstandingBalanceCalculator {
    pub fn calculate(loan: &LoanRecord, payments: &[PaymentRecord]) -> Money {
        loan.principal_amount
            .saturating_sub(Self::total_paid(loan, payments))
    }

    /// sum of `amount_paid` over the payments that belong to `loan`
    pub fn total_paid(loan: &LoanRecord, payments: &[PaymentRecord]) -> Money {
        payments
            .iter()
            .filter(|p| p.loan_id == loan.id)
            .map(|p| p.amount_paid)
            .sum()
    }
}
