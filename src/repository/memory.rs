use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::errors::{LedgerError, Result};
use crate::loan::{LoanRecord, NewLoan};
use crate::payment::{NewPayment, PaymentRecord};
use crate::types::{LoanId, PaymentId, UserId};

use super::LoanRepository;

/// map-backed repository; ids are sequential and start at 1
#[derive(Debug)]
pub struct InMemoryLoanRepository {
    loans: BTreeMap<LoanId, LoanRecord>,
    payments: BTreeMap<LoanId, Vec<PaymentRecord>>,
    next_loan_id: LoanId,
    next_payment_id: PaymentId,
}

impl Default for InMemoryLoanRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLoanRepository {
    pub fn new() -> Self {
        Self {
            loans: BTreeMap::new(),
            payments: BTreeMap::new(),
            next_loan_id: 1,
            next_payment_id: 1,
        }
    }

    pub fn loan_count(&self) -> usize {
        self.loans.len()
    }

    pub fn payment_count(&self) -> usize {
        self.payments.values().map(Vec::len).sum()
    }
}

impl LoanRepository for InMemoryLoanRepository {
    fn insert_loan(
        &mut self,
        user_id: UserId,
        draft: NewLoan,
        created_at: DateTime<Utc>,
    ) -> Result<LoanRecord> {
        draft.validate()?;

        let id = self.next_loan_id;
        self.next_loan_id += 1;

        let record = LoanRecord::from_draft(id, user_id, draft, created_at);
        self.loans.insert(id, record.clone());
        self.payments.insert(id, Vec::new());

        debug!(loan_id = id, user_id, "stored loan");
        Ok(record)
    }

    fn find_loan(&self, id: LoanId) -> Result<Option<LoanRecord>> {
        Ok(self.loans.get(&id).cloned())
    }

    fn loans_for_user(&self, user_id: UserId) -> Result<Vec<LoanRecord>> {
        Ok(self
            .loans
            .values()
            .filter(|loan| loan.user_id == user_id)
            .cloned()
            .collect())
    }

    fn update_loan(&mut self, loan: &LoanRecord) -> Result<()> {
        loan.validate()?;
        match self.loans.get_mut(&loan.id) {
            Some(stored) => {
                *stored = loan.clone();
                debug!(loan_id = loan.id, "updated loan");
                Ok(())
            }
            None => Err(LedgerError::LoanNotFound { id: loan.id }),
        }
    }

    fn delete_loan(&mut self, id: LoanId) -> Result<usize> {
        if self.loans.remove(&id).is_none() {
            return Err(LedgerError::LoanNotFound { id });
        }
        let removed = self.payments.remove(&id).map(|p| p.len()).unwrap_or(0);

        debug!(loan_id = id, payments_removed = removed, "deleted loan");
        Ok(removed)
    }

    fn insert_payment(&mut self, draft: NewPayment, created_at: DateTime<Utc>) -> Result<PaymentRecord> {
        draft.validate()?;

        let loan_id = draft.loan_id;
        if !self.loans.contains_key(&loan_id) {
            warn!(loan_id, "payment rejected: loan does not exist");
            return Err(LedgerError::LoanNotFound { id: loan_id });
        }

        let id = self.next_payment_id;
        self.next_payment_id += 1;

        let record = PaymentRecord::from_draft(id, draft, created_at);
        self.payments.entry(loan_id).or_default().push(record.clone());

        debug!(loan_id, payment_id = id, "stored payment");
        Ok(record)
    }

    fn payments_for_loan(&self, loan_id: LoanId) -> Result<Vec<PaymentRecord>> {
        if !self.loans.contains_key(&loan_id) {
            return Err(LedgerError::LoanNotFound { id: loan_id });
        }
        Ok(self.payments.get(&loan_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    }

    fn draft(name: &str) -> NewLoan {
        NewLoan::builder()
            .borrower_name(name)
            .principal(Money::from_major(1000))
            .rate(Rate::from_percentage(dec!(2)))
            .term_months(10)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .first_payment_due(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .build()
            .unwrap()
    }

    fn payment(loan_id: LoanId, number: u32) -> NewPayment {
        NewPayment::new(
            loan_id,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            Money::from_major(100),
            number,
        )
    }

    #[test]
    fn test_sequential_ids() {
        let mut repo = InMemoryLoanRepository::new();
        let a = repo.insert_loan(1, draft("A"), now()).unwrap();
        let b = repo.insert_loan(1, draft("B"), now()).unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let p = repo.insert_payment(payment(a.id, 1), now()).unwrap();
        assert_eq!(p.id, 1);
    }

    #[test]
    fn test_loans_scoped_by_user() {
        let mut repo = InMemoryLoanRepository::new();
        repo.insert_loan(1, draft("A"), now()).unwrap();
        repo.insert_loan(2, draft("B"), now()).unwrap();
        repo.insert_loan(1, draft("C"), now()).unwrap();

        let names: Vec<_> = repo
            .loans_for_user(1)
            .unwrap()
            .into_iter()
            .map(|l| l.borrower_name)
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_payment_requires_existing_loan() {
        let mut repo = InMemoryLoanRepository::new();
        let err = repo.insert_payment(payment(42, 1), now()).unwrap_err();
        assert!(matches!(err, LedgerError::LoanNotFound { id: 42 }));
        assert_eq!(repo.payment_count(), 0);
    }

    #[test]
    fn test_payments_keep_insertion_order() {
        let mut repo = InMemoryLoanRepository::new();
        let loan = repo.insert_loan(1, draft("A"), now()).unwrap();
        for n in [3, 1, 2] {
            repo.insert_payment(payment(loan.id, n), now()).unwrap();
        }
        let numbers: Vec<_> = repo
            .payments_for_loan(loan.id)
            .unwrap()
            .iter()
            .map(|p| p.payment_number)
            .collect();
        assert_eq!(numbers, vec![3, 1, 2]);
    }

    #[test]
    fn test_delete_cascades() {
        let mut repo = InMemoryLoanRepository::new();
        let keep = repo.insert_loan(1, draft("Keep"), now()).unwrap();
        let gone = repo.insert_loan(1, draft("Gone"), now()).unwrap();
        repo.insert_payment(payment(keep.id, 1), now()).unwrap();
        repo.insert_payment(payment(gone.id, 1), now()).unwrap();
        repo.insert_payment(payment(gone.id, 2), now()).unwrap();

        assert_eq!(repo.delete_loan(gone.id).unwrap(), 2);
        assert_eq!(repo.loan_count(), 1);
        assert_eq!(repo.payment_count(), 1);
        assert!(repo.find_loan(gone.id).unwrap().is_none());
        assert!(matches!(
            repo.payments_for_loan(gone.id),
            Err(LedgerError::LoanNotFound { .. })
        ));

        // a second delete reports the missing loan
        assert!(matches!(
            repo.delete_loan(gone.id),
            Err(LedgerError::LoanNotFound { .. })
        ));
    }

    #[test]
    fn test_update_missing_loan() {
        let mut repo = InMemoryLoanRepository::new();
        let loan = repo.insert_loan(1, draft("A"), now()).unwrap();
        repo.delete_loan(loan.id).unwrap();
        assert!(matches!(
            repo.update_loan(&loan),
            Err(LedgerError::LoanNotFound { .. })
        ));
    }
}
