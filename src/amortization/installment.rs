use rust_decimal::{Decimal, MathematicalOps};

use crate::decimal::{Money, Rate};
use crate::loan::{LoanRecord, NewLoan};
use crate::payment::PaymentRecord;
use crate::types::AmortizationType;

use super::balance::OutstandingBalanceCalculator;

/// amount due for the upcoming installment of a loan
pub struct NextInstallmentCalculator;

impl NextInstallmentCalculator {
    /// `payments` only matter for SAC, where interest runs on the outstanding balance
    pub fn calculate(loan: &LoanRecord, payments: &[PaymentRecord]) -> Money {
        match loan.loan_type {
            AmortizationType::Sac => {
                let outstanding = OutstandingBalanceCalculator::calculate(loan, payments);
                sac_installment(
                    loan.principal_amount,
                    loan.interest_rate,
                    loan.loan_term_months,
                    outstanding,
                )
            }
            AmortizationType::Price => price_installment(
                loan.principal_amount,
                loan.interest_rate,
                loan.loan_term_months,
            ),
        }
    }
}

/// installment shown before a loan is stored: SAC charges interest on the full principal
pub fn estimate_first_installment(draft: &NewLoan) -> Money {
    match draft.loan_type.unwrap_or_default() {
        AmortizationType::Sac => sac_installment(
            draft.principal_amount,
            draft.interest_rate,
            draft.loan_term_months,
            draft.principal_amount,
        ),
        AmortizationType::Price => price_installment(
            draft.principal_amount,
            draft.interest_rate,
            draft.loan_term_months,
        ),
    }
}

/// fixed principal portion plus one month of interest on `outstanding`
pub fn sac_installment(principal: Money, rate: Rate, months: u32, outstanding: Money) -> Money {
    sac_amortization(principal, months).saturating_add(outstanding.apply_rate(rate))
}

/// principal repaid by every SAC installment
pub fn sac_amortization(principal: Money, months: u32) -> Money {
    if months == 0 {
        return principal;
    }
    principal / Decimal::from(months)
}

/// constant installment of the french table
///
/// Results beyond the decimal range saturate at [`Money::MAX`]; validated
/// loans never get there.
pub fn price_installment(principal: Money, rate: Rate, months: u32) -> Money {
    if months == 0 {
        return principal;
    }

    let r = rate.as_decimal();
    if r.is_zero() {
        return principal / Decimal::from(months);
    }

    // PMT = P * r * (1 + r)^n / ((1 + r)^n - 1)
    let payment = match compound_factor(r, months) {
        Some(compound) => {
            let denominator = compound - Decimal::ONE;
            if denominator.is_zero() {
                // rate below decimal precision
                return principal / Decimal::from(months);
            }
            compound
                .checked_div(denominator)
                .and_then(|ratio| principal.as_decimal().checked_mul(r)?.checked_mul(ratio))
        }
        // (1 + r)^n beyond the decimal range: the ratio is 1 to full precision
        None => principal.as_decimal().checked_mul(r),
    };

    payment.map(Money::from_decimal).unwrap_or(Money::MAX)
}

/// (1 + r)^n, or `None` when it does not fit in a decimal
fn compound_factor(r: Decimal, months: u32) -> Option<Decimal> {
    (Decimal::ONE + r).checked_powu(u64::from(months))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::NewPayment;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn loan(principal: i64, rate: Decimal, months: u32, loan_type: AmortizationType) -> LoanRecord {
        let draft = NewLoan::builder()
            .borrower_name("Beatriz")
            .principal(Money::from_major(principal))
            .rate(Rate::from_percentage(rate))
            .term_months(months)
            .loan_type(loan_type)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .first_payment_due(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .build()
            .unwrap();
        LoanRecord::from_draft(1, 1, draft, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    fn paid(amount: Money, number: u32) -> PaymentRecord {
        let draft = NewPayment::new(1, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), amount, number);
        PaymentRecord::from_draft(number as u64, draft, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_price_zero_rate() {
        let loan = loan(1200, dec!(0), 12, AmortizationType::Price);
        assert_eq!(NextInstallmentCalculator::calculate(&loan, &[]), Money::from_major(100));
    }

    #[test]
    fn test_sac_zero_rate() {
        let loan = loan(1200, dec!(0), 12, AmortizationType::Sac);
        assert_eq!(NextInstallmentCalculator::calculate(&loan, &[]), Money::from_major(100));
    }

    #[test]
    fn test_sac_first_installment() {
        let loan = loan(1200, dec!(1), 12, AmortizationType::Sac);
        assert_eq!(sac_amortization(loan.principal_amount, 12), Money::from_major(100));
        assert_eq!(NextInstallmentCalculator::calculate(&loan, &[]), Money::from_major(112));
    }

    #[test]
    fn test_sac_interest_follows_outstanding_balance() {
        let loan = loan(1200, dec!(1), 12, AmortizationType::Sac);
        let payments = vec![paid(Money::from_major(112), 1)];
        // outstanding 1088 -> interest 10.88
        assert_eq!(
            NextInstallmentCalculator::calculate(&loan, &payments),
            Money::from_str_exact("110.88").unwrap()
        );
    }

    #[test]
    fn test_price_annuity() {
        let loan = loan(1000, dec!(2), 10, AmortizationType::Price);
        let installment = NextInstallmentCalculator::calculate(&loan, &[]);

        // 1000 * 0.02 * 1.02^10 / (1.02^10 - 1)
        let compound = dec!(1.21899441999475713024);
        let expected = dec!(1000) * dec!(0.02) * compound / (compound - Decimal::ONE);
        assert!((installment.as_decimal() - expected).abs() < dec!(0.0000000001));
        assert_eq!(installment.round_currency(), Money::from_str_exact("111.33").unwrap());
    }

    #[test]
    fn test_price_ignores_payments() {
        let loan = loan(1000, dec!(2), 10, AmortizationType::Price);
        let before = NextInstallmentCalculator::calculate(&loan, &[]);
        let after = NextInstallmentCalculator::calculate(&loan, &[paid(before, 1)]);
        assert_eq!(before, after);
    }

    #[test]
    fn test_price_huge_compound_does_not_overflow() {
        let installment = price_installment(Money::from_major(1000), Rate::from_percentage(dec!(50)), 600);
        assert_eq!(installment, Money::from_major(500));
    }

    #[test]
    fn test_extreme_inputs_saturate() {
        let huge = Money::from_decimal(Decimal::from_i128_with_scale(5 * 10i128.pow(28), 0));
        let rate = Rate::from_percentage(dec!(100));

        assert_eq!(price_installment(huge, rate, 1), Money::MAX);
        assert_eq!(sac_installment(huge, rate, 1, huge), Money::MAX);
    }

    #[test]
    fn test_largest_valid_loan_fits() {
        let principal = Money::from_major(crate::loan::MAX_PRINCIPAL);
        let rate = Rate::from_percentage(Decimal::from(crate::loan::MAX_RATE_PERCENT));

        // n = 1: P * (1 + r)
        assert_eq!(price_installment(principal, rate, 1), principal * dec!(11));
        assert_eq!(sac_installment(principal, rate, 1, principal), principal * dec!(11));

        let long = price_installment(principal, Rate::from_percentage(dec!(0.01)), crate::loan::MAX_TERM_MONTHS);
        assert!(long.is_positive() && long < principal);
    }

    #[test]
    fn test_estimate_matches_zero_payment_installment() {
        let draft = NewLoan::builder()
            .borrower_name("Beatriz")
            .principal(Money::from_major(1200))
            .rate(Rate::from_percentage(dec!(1)))
            .term_months(12)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .first_payment_due(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .build()
            .unwrap();
        assert_eq!(estimate_first_installment(&draft), Money::from_major(112));

        let price = NewLoan {
            loan_type: Some(AmortizationType::Price),
            ..draft
        };
        let expected = price_installment(Money::from_major(1200), Rate::from_percentage(dec!(1)), 12);
        assert_eq!(estimate_first_installment(&price), expected);
    }
}
