//! installment and balance arithmetic for SAC and PRICE loans
//!
//! Everything here is pure: the balance and installment calculators read
//! already-loaded records and never fail, saturating rather than overflowing.
//! Input validity (term, rate and principal bounds) is enforced when a
//! [`LoanRecord`](crate::loan::LoanRecord) is built; schedule generation
//! re-checks it and reports errors.

pub mod balance;
pub mod installment;
pub mod schedule;

pub use balance::OutstandingBalanceCalculator;
pub use installment::{estimate_first_installment, NextInstallmentCalculator};
pub use schedule::{add_months, AmortizationSchedule, ScheduledInstallment};
