use chrono::NaiveDate;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::account::LoanAccount;
use crate::amortization::AmortizationSchedule;
use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{EventStore, LedgerEvent};
use crate::loan::{LoanRecord, NewLoan};
use crate::payment::{NewPayment, PaymentRecord};
use crate::repository::LoanRepository;
use crate::types::{LoanId, LoanStatus, UserId};

/// portfolio figures for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_loans: usize,
    pub active_loans: usize,
    pub total_principal: Money,
    /// next installment summed over active loans
    pub monthly_income: Money,
    pub overdue_loans: usize,
}

/// loan service: validation, timestamps and cascades on top of a repository
pub struct LoanService<R: LoanRepository> {
    repository: R,
    config: LedgerConfig,
    events: EventStore,
}

impl<R: LoanRepository> LoanService<R> {
    pub fn new(repository: R, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            repository,
            config,
            events: EventStore::new(),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// drain the events emitted so far
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        self.events.take_events()
    }

    pub fn events(&self) -> &[LedgerEvent] {
        self.events.events()
    }

    /// store a new loan for `user_id`
    pub fn create_loan(
        &mut self,
        user_id: UserId,
        mut draft: NewLoan,
        time_provider: &SafeTimeProvider,
    ) -> Result<LoanRecord> {
        draft.validate()?;
        if draft.loan_term_months > self.config.max_term_months {
            return Err(LedgerError::InvalidLoanTerm {
                months: draft.loan_term_months as i64,
            });
        }

        draft.loan_type.get_or_insert(self.config.default_loan_type);
        draft.status.get_or_insert(self.config.default_status);

        let now = time_provider.now();
        let loan = self.repository.insert_loan(user_id, draft, now)?;

        info!(
            loan_id = loan.id,
            user_id,
            principal = %loan.principal_amount,
            loan_type = %loan.loan_type,
            "loan created"
        );
        self.events.emit(LedgerEvent::LoanCreated {
            loan_id: loan.id,
            user_id,
            principal: loan.principal_amount,
            loan_type: loan.loan_type,
            timestamp: now,
        });

        Ok(loan)
    }

    /// create a loan stamped with system time
    pub fn create_loan_now(&mut self, user_id: UserId, draft: NewLoan) -> Result<LoanRecord> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.create_loan(user_id, draft, &time)
    }

    pub fn loan(&self, id: LoanId) -> Result<LoanRecord> {
        self.repository
            .find_loan(id)?
            .ok_or(LedgerError::LoanNotFound { id })
    }

    pub fn payments(&self, loan_id: LoanId) -> Result<Vec<PaymentRecord>> {
        self.repository.payments_for_loan(loan_id)
    }

    pub fn account(&self, id: LoanId) -> Result<LoanAccount> {
        let loan = self.loan(id)?;
        let payments = self.repository.payments_for_loan(id)?;
        Ok(LoanAccount::new(loan, payments))
    }

    pub fn loans_for_user(&self, user_id: UserId) -> Result<Vec<LoanRecord>> {
        self.repository.loans_for_user(user_id)
    }

    /// case-insensitive match on the borrower name; an empty query matches everything
    pub fn search_loans(&self, user_id: UserId, query: &str) -> Result<Vec<LoanRecord>> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .repository
            .loans_for_user(user_id)?
            .into_iter()
            .filter(|loan| loan.borrower_name.to_lowercase().contains(&needle))
            .collect())
    }

    /// set the status; transitions are not restricted
    pub fn set_status(
        &mut self,
        id: LoanId,
        status: LoanStatus,
        time_provider: &SafeTimeProvider,
    ) -> Result<LoanRecord> {
        let mut loan = self.loan(id)?;
        let old_status = loan.status;
        let now = time_provider.now();

        loan.status = status;
        loan.touch(now);
        self.repository.update_loan(&loan)?;

        info!(loan_id = id, from = %old_status, to = %status, "loan status changed");
        self.events.emit(LedgerEvent::StatusChanged {
            loan_id: id,
            old_status,
            new_status: status,
            timestamp: now,
        });

        Ok(loan)
    }

    /// store a payment exactly as given
    ///
    /// The loan is touched before the payment is stored; if storing fails the
    /// previous loan record is put back.
    pub fn record_payment(
        &mut self,
        draft: NewPayment,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentRecord> {
        draft.validate()?;
        let previous = self.loan(draft.loan_id)?;
        let now = time_provider.now();

        let mut loan = previous.clone();
        loan.touch(now);
        self.repository.update_loan(&loan)?;

        let payment = match self.repository.insert_payment(draft, now) {
            Ok(payment) => payment,
            Err(err) => {
                warn!(loan_id = loan.id, error = %err, "payment not stored, restoring loan");
                self.repository.update_loan(&previous)?;
                return Err(err);
            }
        };

        let outstanding_after = self.account(loan.id)?.outstanding_balance();
        info!(
            loan_id = loan.id,
            payment_id = payment.id,
            amount = %payment.amount_paid,
            outstanding = %outstanding_after,
            "payment recorded"
        );
        self.events.emit(LedgerEvent::PaymentRecorded {
            loan_id: loan.id,
            payment_id: payment.id,
            payment_number: payment.payment_number,
            amount: payment.amount_paid,
            payment_date: payment.payment_date,
            outstanding_after,
            timestamp: now,
        });

        Ok(payment)
    }

    /// record the next installment, numbering it and splitting `amount`
    /// into interest on the current balance and principal
    pub fn record_installment(
        &mut self,
        loan_id: LoanId,
        payment_date: NaiveDate,
        amount: Money,
        notes: Option<String>,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentRecord> {
        let account = self.account(loan_id)?;
        let outstanding = account.outstanding_balance();

        let interest_paid = outstanding.apply_rate(account.loan.interest_rate).min(amount);
        let principal_paid = amount - interest_paid;
        let balance_after = outstanding.saturating_sub(amount);

        debug!(
            loan_id,
            %outstanding,
            %interest_paid,
            %principal_paid,
            "split installment"
        );

        let mut draft = NewPayment::new(loan_id, payment_date, amount, account.payments_made().saturating_add(1))
            .with_split(principal_paid, interest_paid)
            .with_outstanding_balance(balance_after);
        draft.notes = notes;

        self.record_payment(draft, time_provider)
    }

    /// delete a loan together with all of its payments
    pub fn delete_loan(&mut self, id: LoanId, time_provider: &SafeTimeProvider) -> Result<usize> {
        let payments_removed = self.repository.delete_loan(id)?;

        info!(loan_id = id, payments_removed, "loan deleted");
        self.events.emit(LedgerEvent::LoanDeleted {
            loan_id: id,
            payments_removed,
            timestamp: time_provider.now(),
        });

        Ok(payments_removed)
    }

    pub fn outstanding_balance(&self, id: LoanId) -> Result<Money> {
        Ok(self.account(id)?.outstanding_balance())
    }

    pub fn next_installment(&self, id: LoanId) -> Result<Money> {
        Ok(self.account(id)?.next_installment())
    }

    pub fn schedule(&self, id: LoanId) -> Result<AmortizationSchedule> {
        AmortizationSchedule::generate(&self.loan(id)?)
    }

    /// dashboard figures for a user as of a given day
    pub fn portfolio_summary(&self, user_id: UserId, as_of: NaiveDate) -> Result<PortfolioSummary> {
        let loans = self.repository.loans_for_user(user_id)?;

        let mut summary = PortfolioSummary {
            total_loans: loans.len(),
            active_loans: 0,
            total_principal: Money::ZERO,
            monthly_income: Money::ZERO,
            overdue_loans: 0,
        };

        for loan in loans {
            summary.total_principal += loan.principal_amount;
            if !loan.is_active() {
                continue;
            }

            let payments = self.repository.payments_for_loan(loan.id)?;
            let account = LoanAccount::new(loan, payments);

            summary.active_loans += 1;
            summary.monthly_income += account.next_installment();
            if account.is_overdue(as_of, self.config.overdue_grace_days) {
                summary.overdue_loans += 1;
            }
        }

        Ok(summary)
    }
}
