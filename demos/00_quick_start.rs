/// quick start - create two loans, record payments, print the dashboard
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use loan_ledger::{
    AmortizationType, InMemoryLoanRepository, LedgerConfig, LoanDto, LoanService, Money, NewLoan,
    Rate, SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
    ));
    let control = time.test_control().unwrap();

    let mut ledger = LoanService::new(InMemoryLoanRepository::new(), LedgerConfig::default())?;

    let sac = ledger.create_loan(
        1,
        NewLoan::builder()
            .borrower_name("Maria Souza")
            .principal(Money::from_major(1_200))
            .rate(Rate::from_percentage(dec!(1)))
            .term_months(12)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
            .first_payment_due(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap())
            .build()?,
        &time,
    )?;

    let price = ledger.create_loan(
        1,
        NewLoan::builder()
            .borrower_name("João Silva")
            .principal(Money::from_major(1_000))
            .rate(Rate::from_percentage(dec!(2)))
            .term_months(10)
            .loan_type(AmortizationType::Price)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
            .first_payment_due(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap())
            .build()?,
        &time,
    )?;

    control.advance(Duration::days(31));
    let due = ledger.next_installment(sac.id)?;
    ledger.record_installment(sac.id, time.now().date_naive(), due, Some("pix".to_string()), &time)?;

    println!("SAC next installment:   {}", ledger.next_installment(sac.id)?.round_currency());
    println!("SAC outstanding:        {}", ledger.outstanding_balance(sac.id)?.round_currency());
    println!("PRICE installment:      {}", ledger.next_installment(price.id)?.round_currency());

    let schedule = ledger.schedule(price.id)?;
    println!("PRICE total interest:   {}", schedule.total_interest.round_currency());

    let summary = ledger.portfolio_summary(1, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    println!("{}", LoanDto::from(&ledger.loan(sac.id)?).to_json_pretty()?);

    Ok(())
}
