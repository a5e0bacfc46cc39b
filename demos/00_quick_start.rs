/// quick start - minimal example to get started
use property_financing_rs::{FinancingPlan, Money, Rate, Decimal};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 400k purchase, 80k equity, 3% nominal, 2% initial repayment
    let mut plan = FinancingPlan::builder()
        .purchase_price(Money::from_major(400_000))
        .equity(Money::from_major(80_000))
        .nominal_rate(Rate::from_percent(Decimal::from(3)))
        .repayment_rate(Rate::from_percent(Decimal::from(2)))
        .build()?;

    let report = plan.calculate()?;

    // print current state
    println!("{}", report.json()?);

    Ok(())
}
