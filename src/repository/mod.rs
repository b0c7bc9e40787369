//! data access for loans and their payments
//!
//! The service layer only talks to storage through [`LoanRepository`], so a
//! database-backed implementation can replace [`InMemoryLoanRepository`]
//! without touching the amortization code.

pub mod memory;

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::loan::{LoanRecord, NewLoan};
use crate::payment::{NewPayment, PaymentRecord};
use crate::types::{LoanId, UserId};

pub use memory::InMemoryLoanRepository;

pub trait LoanRepository {
    /// store a validated draft, assigning its id
    fn insert_loan(
        &mut self,
        user_id: UserId,
        draft: NewLoan,
        created_at: DateTime<Utc>,
    ) -> Result<LoanRecord>;

    fn find_loan(&self, id: LoanId) -> Result<Option<LoanRecord>>;

    /// loans owned by a user, in id order
    fn loans_for_user(&self, user_id: UserId) -> Result<Vec<LoanRecord>>;

    /// replace a stored loan; fails with `LoanNotFound` when it does not exist
    fn update_loan(&mut self, loan: &LoanRecord) -> Result<()>;

    /// remove a loan and every payment recorded against it in one step,
    /// returning how many payments went with it
    fn delete_loan(&mut self, id: LoanId) -> Result<usize>;

    /// store a payment; the parent loan must exist
    fn insert_payment(&mut self, draft: NewPayment, created_at: DateTime<Utc>) -> Result<PaymentRecord>;

    /// payments of a loan in insertion order
    fn payments_for_loan(&self, loan_id: LoanId) -> Result<Vec<PaymentRecord>>;
}
