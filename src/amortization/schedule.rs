use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::loan::LoanRecord;
use crate::types::{AmortizationType, LoanId};

use super::installment::{price_installment, sac_amortization};

/// one row of an amortization table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledInstallment {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub beginning_balance: Money,
    pub installment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// full repayment table of a loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub loan_id: LoanId,
    pub principal: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
    pub loan_type: AmortizationType,
    pub installments: Vec<ScheduledInstallment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate the table for a stored loan
    ///
    /// The loan is validated first, so every amount in the table stays within
    /// the decimal range and every due date exists.
    pub fn generate(loan: &LoanRecord) -> Result<Self> {
        loan.validate()?;

        let installments = match loan.loan_type {
            AmortizationType::Sac => sac_table(
                loan.principal_amount,
                loan.interest_rate,
                loan.loan_term_months,
                loan.first_payment_due_date,
            )?,
            AmortizationType::Price => price_table(
                loan.principal_amount,
                loan.interest_rate,
                loan.loan_term_months,
                loan.first_payment_due_date,
            )?,
        };

        let total_interest = installments.iter().map(|p| p.interest_portion).sum();
        let total_payment = installments.iter().map(|p| p.installment_amount).sum();

        Ok(Self {
            loan_id: loan.id,
            principal: loan.principal_amount,
            interest_rate: loan.interest_rate,
            term_months: loan.loan_term_months,
            loan_type: loan.loan_type,
            installments,
            total_interest,
            total_payment,
        })
    }

    /// row for a 1-based installment number
    pub fn installment(&self, number: u32) -> Option<&ScheduledInstallment> {
        if number == 0 {
            return None;
        }
        self.installments.get((number - 1) as usize)
    }

    /// balance left by the table after `number` installments
    pub fn balance_after(&self, number: u32) -> Money {
        if number == 0 {
            return self.principal;
        }
        self.installment(number)
            .map(|p| p.ending_balance)
            .unwrap_or(Money::ZERO)
    }

    /// first and last installment amounts
    pub fn installment_range(&self) -> Option<(Money, Money)> {
        let first = self.installments.first()?;
        let last = self.installments.last()?;
        Some((first.installment_amount, last.installment_amount))
    }
}

/// constant principal portion, interest on the declining balance
fn sac_table(
    principal: Money,
    rate: Rate,
    term_months: u32,
    first_due: NaiveDate,
) -> Result<Vec<ScheduledInstallment>> {
    let amortization = sac_amortization(principal, term_months);

    let mut rows = Vec::with_capacity(term_months as usize);
    let mut balance = principal;
    let mut cumulative_interest = Money::ZERO;
    let mut cumulative_principal = Money::ZERO;

    for i in 1..=term_months {
        let interest_portion = balance.apply_rate(rate);
        // the last row clears whatever division left behind
        let principal_portion = if i == term_months { balance } else { amortization.min(balance) };
        let ending_balance = balance.saturating_sub(principal_portion);

        cumulative_interest += interest_portion;
        cumulative_principal += principal_portion;

        rows.push(ScheduledInstallment {
            installment_number: i,
            due_date: due_date(first_due, i)?,
            beginning_balance: balance,
            installment_amount: principal_portion + interest_portion,
            principal_portion,
            interest_portion,
            ending_balance,
            cumulative_interest,
            cumulative_principal,
        });

        balance = ending_balance;
    }

    Ok(rows)
}

/// constant installment, interest on the declining balance
fn price_table(
    principal: Money,
    rate: Rate,
    term_months: u32,
    first_due: NaiveDate,
) -> Result<Vec<ScheduledInstallment>> {
    let installment = price_installment(principal, rate, term_months);

    let mut rows = Vec::with_capacity(term_months as usize);
    let mut balance = principal;
    let mut cumulative_interest = Money::ZERO;
    let mut cumulative_principal = Money::ZERO;

    for i in 1..=term_months {
        let interest_portion = balance.apply_rate(rate);
        let (installment_amount, principal_portion) = if i == term_months {
            (balance + interest_portion, balance)
        } else {
            let principal_portion = (installment - interest_portion).min(balance);
            (principal_portion + interest_portion, principal_portion)
        };
        let ending_balance = balance.saturating_sub(principal_portion);

        cumulative_interest += interest_portion;
        cumulative_principal += principal_portion;

        rows.push(ScheduledInstallment {
            installment_number: i,
            due_date: due_date(first_due, i)?,
            beginning_balance: balance,
            installment_amount,
            principal_portion,
            interest_portion,
            ending_balance,
            cumulative_interest,
            cumulative_principal,
        });

        balance = ending_balance;
    }

    Ok(rows)
}

/// calendar month arithmetic, clamped to the last day of shorter months;
/// `None` past the end of the calendar
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

fn due_date(first_due: NaiveDate, installment: u32) -> Result<NaiveDate> {
    add_months(first_due, installment - 1).ok_or(LedgerError::DueDateOutOfRange { installment })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::NewLoan;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn loan(principal: i64, rate: Decimal, months: u32, loan_type: AmortizationType) -> LoanRecord {
        let draft = NewLoan::builder()
            .borrower_name("Fernanda")
            .principal(Money::from_major(principal))
            .rate(Rate::from_percentage(rate))
            .term_months(months)
            .loan_type(loan_type)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .first_payment_due(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
            .build()
            .unwrap();
        LoanRecord::from_draft(5, 1, draft, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_sac_schedule() {
        let schedule = AmortizationSchedule::generate(&loan(1200, dec!(1), 12, AmortizationType::Sac)).unwrap();

        assert_eq!(schedule.installments.len(), 12);
        for row in &schedule.installments {
            assert_eq!(row.principal_portion, Money::from_major(100));
        }

        // interest declines every month
        for pair in schedule.installments.windows(2) {
            assert!(pair[1].interest_portion < pair[0].interest_portion);
        }

        let (first, last) = schedule.installment_range().unwrap();
        assert_eq!(first, Money::from_major(112));
        assert_eq!(last, Money::from_major(101));

        // 1% of 1200, 1100, ..., 100
        assert_eq!(schedule.total_interest, Money::from_major(78));
        assert_eq!(schedule.total_payment, Money::from_major(1278));
        assert_eq!(schedule.balance_after(12), Money::ZERO);
    }

    #[test]
    fn test_price_schedule() {
        let schedule = AmortizationSchedule::generate(&loan(1000, dec!(2), 10, AmortizationType::Price)).unwrap();
        let installment = price_installment(Money::from_major(1000), Rate::from_percentage(dec!(2)), 10);

        assert_eq!(schedule.installments.len(), 10);
        for row in &schedule.installments[..9] {
            assert_eq!(row.installment_amount, installment);
        }

        let last = schedule.installment(10).unwrap();
        assert_eq!(last.ending_balance, Money::ZERO);
        assert!((last.installment_amount - installment).abs() < Money::from_str_exact("0.000001").unwrap());

        // principal portions grow under PRICE
        for pair in schedule.installments.windows(2) {
            assert!(pair[1].principal_portion > pair[0].principal_portion);
        }
        let repaid = schedule.installments[9].cumulative_principal;
        assert!((repaid - Money::from_major(1000)).abs() < Money::from_str_exact("0.0000001").unwrap());
        assert_eq!(schedule.total_interest.round_currency(), Money::from_str_exact("113.27").unwrap());
    }

    #[test]
    fn test_uneven_division_ends_at_zero() {
        let schedule = AmortizationSchedule::generate(&loan(1000, dec!(1.5), 7, AmortizationType::Sac)).unwrap();
        assert_eq!(schedule.balance_after(7), Money::ZERO);
        let repaid = schedule.installments[6].cumulative_principal;
        assert!((repaid - Money::from_major(1000)).abs() < Money::from_str_exact("0.0000001").unwrap());
    }

    #[test]
    fn test_due_dates_clamp_to_month_end() {
        let schedule = AmortizationSchedule::generate(&loan(300, dec!(0), 3, AmortizationType::Price)).unwrap();
        let dates: Vec<_> = schedule.installments.iter().map(|p| p.due_date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            ]
        );
    }

    #[test]
    fn test_installment_lookup_bounds() {
        let schedule = AmortizationSchedule::generate(&loan(300, dec!(0), 3, AmortizationType::Sac)).unwrap();
        assert!(schedule.installment(0).is_none());
        assert!(schedule.installment(4).is_none());
        assert_eq!(schedule.balance_after(0), Money::from_major(300));
        assert_eq!(schedule.balance_after(1), Money::from_major(200));
    }

    #[test]
    fn test_oversized_term_is_rejected_not_allocated() {
        let mut record = loan(1000, dec!(1), 12, AmortizationType::Price);
        record.loan_term_months = u32::MAX;
        assert!(matches!(
            AmortizationSchedule::generate(&record),
            Err(LedgerError::InvalidLoanTerm { .. })
        ));
    }

    #[test]
    fn test_due_date_past_calendar_end() {
        let mut record = loan(300, dec!(0), 3, AmortizationType::Sac);
        record.first_payment_due_date = NaiveDate::MAX;
        assert!(matches!(
            AmortizationSchedule::generate(&record),
            Err(LedgerError::DueDateOutOfRange { installment: 3 })
        ));
        assert_eq!(add_months(NaiveDate::MAX, 1), None);
    }
}
