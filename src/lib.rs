pub mod account;
pub mod amortization;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loan;
pub mod payment;
pub mod repository;
pub mod serialization;
pub mod service;
pub mod types;

// re-export key types
pub use account::LoanAccount;
pub use amortization::{
    estimate_first_installment, AmortizationSchedule, NextInstallmentCalculator,
    OutstandingBalanceCalculator, ScheduledInstallment,
};
pub use config::LedgerConfig;
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{EventStore, LedgerEvent};
pub use loan::{LoanBuilder, LoanRecord, NewLoan};
pub use payment::{NewPayment, PaymentRecord};
pub use repository::{InMemoryLoanRepository, LoanRepository};
pub use serialization::{LoanDto, PaymentDto};
pub use service::{LoanService, PortfolioSummary};
pub use types::{AmortizationType, LoanId, LoanStatus, PaymentId, UserId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
