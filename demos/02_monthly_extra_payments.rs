/// monthly exact annuity - compare with and without yearly extra payments
use property_financing_rs::{
    generate_schedule, FinancingParameters, FinancingSummary, Money, Rate,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== monthly extra payments example ===\n");

    let base = FinancingParameters::monthly(
        Money::from_major(300_000),
        Money::from_major(60_000),
        Rate::from_percent(dec!(3.8)),
        Rate::from_percent(dec!(2.0)),
        360,
    );

    for extra in [0, 2_500, 5_000, 10_000] {
        let params = base.clone().with_extra_annual_payment(Money::from_major(extra));
        let schedule = generate_schedule(&params)?;
        let summary = FinancingSummary::from_schedule(&params, &schedule)?;

        println!(
            "extra {:>6}/year: monthly rate {}, paid off after {} months, interest {}",
            extra,
            summary.initial_periodic_payment.round_dp(2),
            summary.effective_term_periods,
            summary.total_interest_paid.round_dp(2),
        );
    }

    Ok(())
}
