use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{AmortizationType, LoanId, LoanStatus, PaymentId, UserId};

/// everything the ledger service reports while it mutates state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    LoanCreated {
        loan_id: LoanId,
        user_id: UserId,
        principal: Money,
        loan_type: AmortizationType,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        timestamp: DateTime<Utc>,
    },
    PaymentRecorded {
        loan_id: LoanId,
        payment_id: PaymentId,
        payment_number: u32,
        amount: Money,
        payment_date: NaiveDate,
        outstanding_after: Money,
        timestamp: DateTime<Utc>,
    },
    LoanDeleted {
        loan_id: LoanId,
        payments_removed: usize,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<LedgerEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }
}
