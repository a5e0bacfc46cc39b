/// json report - load parameters from json and handle engine errors
use property_financing_rs::{
    FinancingError, FinancingParameters, FinancingPlan, SafeTimeProvider, TimeSource,
};

const PARAMETERS: &str = r#"{
    "purchase_price": "350000",
    "equity": "70000",
    "ancillary_cost_rate": "0.12",
    "nominal_annual_rate": "0.041",
    "initial_repayment_rate": "0.02",
    "switch_repayment_rate": "0.03",
    "switch_period": 6,
    "rate_lock_periods": 15,
    "extra_annual_payment": "3000"
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let params = FinancingParameters::from_json(PARAMETERS)?;
    let time = SafeTimeProvider::new(TimeSource::System);

    let mut plan = FinancingPlan::new(params.clone(), &time)?;
    let report = plan.calculate()?;
    println!("{}", serde_json::to_string_pretty(&report.summary)?);

    // a zero repayment rate never reduces the debt
    let mut stalled = params;
    stalled.initial_repayment_rate = property_financing_rs::Rate::ZERO;
    stalled.switch_period = None;

    match FinancingPlan::new(stalled, &time)?.calculate() {
        Err(FinancingError::NonAmortizingLoan { period, interest, payment, .. }) => {
            println!("\nnot amortizing in period {}: payment {} <= interest {}", period, payment, interest);
        }
        Err(other) => return Err(other.into()),
        Ok(_) => println!("\nunexpectedly amortizing"),
    }

    Ok(())
}
