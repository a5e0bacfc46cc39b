/// repayment switch - raise the repayment rate after ten years
use property_financing_rs::{FinancingPlan, Money, Rate, ScheduleEvent};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== repayment switch example ===\n");

    let mut plan = FinancingPlan::builder()
        .purchase_price(Money::from_major(400_000))
        .equity(Money::from_major(80_000))
        .ancillary_cost_rate(Rate::from_percent(dec!(10)))
        .nominal_rate(Rate::from_percent(dec!(3.0)))
        .repayment_rate(Rate::from_percent(dec!(2.0)))
        .repayment_switch(Rate::from_percent(dec!(3.5)), 11)
        .extra_annual_payment(Money::from_major(2_000))
        .rate_lock_periods(10)
        .build()?;

    let report = plan.calculate()?;
    let summary = &report.summary;

    println!("total acquisition cost: {}", summary.costs.total_acquisition_cost.round_dp(2));
    println!("loan amount:            {}", summary.costs.loan_amount.round_dp(2));
    println!("annual payment:         {}", summary.initial_annual_payment.round_dp(2));
    println!("monthly payment:        {}", summary.initial_monthly_payment.round_dp(2));
    println!("paid off after:         {} years", summary.effective_term_years);
    println!("rate lock phases:       {}", summary.rate_lock_phases_needed);
    println!("total interest:         {}", summary.total_interest_paid.round_dp(2));

    println!("\nyear  rate    interest     principal    balance");
    for entry in &report.schedule {
        println!(
            "{:>4}  {:<6}  {:>11}  {:>11}  {:>11}",
            entry.period,
            entry.applied_repayment_rate.to_string(),
            entry.interest_paid.round_dp(2),
            entry.principal_paid.round_dp(2),
            entry.remaining_balance.round_dp(2),
        );
    }

    println!("\nlock phases:");
    for phase in &report.lock_phases {
        println!(
            "  phase {} (years {}-{}): residual debt {}",
            phase.phase,
            phase.first_period,
            phase.last_period,
            phase.closing_balance.round_dp(2)
        );
    }

    let switches = plan
        .events()
        .iter()
        .filter(|e| matches!(e, ScheduleEvent::RepaymentRateSwitched { .. }))
        .count();
    println!("\nrepayment switches: {}", switches);

    Ok(())
}
