use chrono::NaiveDate;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use log::debug;
use uuid::Uuid;

use crate::analysis::{FinancingSummary, LockPhase, RateLockPlanner};
use crate::config::{FinancingParameters, GeneratorConfig};
use crate::decimal::{Money, Rate};
use crate::errors::{FinancingError, Result};
use crate::events::{EventStore, ScheduleEvent};
use crate::payments::{AmortizationSchedule, ScheduleGenerator};
use crate::serialization::PlanView;
use crate::types::{Granularity, PlanId};

/// schedule, summary and lock phases of one calculation
#[derive(Debug, Clone, PartialEq)]
pub struct FinancingReport {
    pub plan_id: PlanId,
    pub start_date: NaiveDate,
    pub parameters: FinancingParameters,
    pub schedule: AmortizationSchedule,
    pub summary: FinancingSummary,
    pub lock_phases: Vec<LockPhase>,
}

impl FinancingReport {
    pub fn view(&self) -> PlanView {
        PlanView::from_report(self)
    }

    /// pretty-printed json of the report
    pub fn json(&self) -> Result<String> {
        Ok(self.view().to_json_pretty()?)
    }
}

/// a financing plan: parameters, start date and the events of its runs
pub struct FinancingPlan {
    id: PlanId,
    params: FinancingParameters,
    start_date: NaiveDate,
    config: GeneratorConfig,
    events: EventStore,
}

impl FinancingPlan {
    pub fn new(params: FinancingParameters, time: &SafeTimeProvider) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            params,
            start_date: time.now().date_naive(),
            config: GeneratorConfig::default(),
            events: EventStore::new(),
        })
    }

    pub fn builder() -> FinancingPlanBuilder {
        FinancingPlanBuilder::new()
    }

    pub fn id(&self) -> PlanId {
        self.id
    }

    pub fn params(&self) -> &FinancingParameters {
        &self.params
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn events(&self) -> &[ScheduleEvent] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<ScheduleEvent> {
        self.events.take_events()
    }

    /// generator configured for this plan
    pub fn generator(&self) -> Result<ScheduleGenerator> {
        Ok(ScheduleGenerator::new(&self.params)?
            .with_plan_id(self.id)
            .with_start_date(self.start_date)
            .with_config(self.config))
    }

    /// generate the dated amortization schedule
    pub fn schedule(&mut self) -> Result<AmortizationSchedule> {
        let generator = self.generator()?;
        generator.generate(&mut self.events)
    }

    /// schedule plus derived figures
    pub fn calculate(&mut self) -> Result<FinancingReport> {
        let schedule = self.schedule()?;
        let summary = FinancingSummary::from_schedule(&self.params, &schedule)?;
        let lock_phases = RateLockPlanner::new(self.params.rate_lock_periods)?.lock_phases(&schedule);

        debug!(
            "plan {}: {} periods, {} lock phases, total interest {}",
            self.id,
            summary.effective_term_periods,
            summary.rate_lock_phases_needed,
            summary.total_interest_paid
        );

        Ok(FinancingReport {
            plan_id: self.id,
            start_date: self.start_date,
            parameters: self.params.clone(),
            schedule,
            summary,
            lock_phases,
        })
    }
}

/// builder for financing plans
#[derive(Debug, Default)]
pub struct FinancingPlanBuilder {
    purchase_price: Option<Money>,
    equity: Option<Money>,
    ancillary_cost_rate: Option<Rate>,
    nominal_rate: Option<Rate>,
    repayment_rate: Option<Rate>,
    repayment_switch: Option<(Rate, u32)>,
    extra_annual_payment: Option<Money>,
    rate_lock_periods: Option<u32>,
    term_periods: Option<u32>,
    granularity: Option<Granularity>,
    start_date: Option<NaiveDate>,
    max_periods: Option<u32>,
}

impl FinancingPlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn purchase_price(mut self, amount: Money) -> Self {
        self.purchase_price = Some(amount);
        self
    }

    pub fn equity(mut self, amount: Money) -> Self {
        self.equity = Some(amount);
        self
    }

    pub fn ancillary_cost_rate(mut self, rate: Rate) -> Self {
        self.ancillary_cost_rate = Some(rate);
        self
    }

    pub fn nominal_rate(mut self, rate: Rate) -> Self {
        self.nominal_rate = Some(rate);
        self
    }

    pub fn repayment_rate(mut self, rate: Rate) -> Self {
        self.repayment_rate = Some(rate);
        self
    }

    pub fn repayment_switch(mut self, rate: Rate, period: u32) -> Self {
        self.repayment_switch = Some((rate, period));
        self
    }

    pub fn extra_annual_payment(mut self, amount: Money) -> Self {
        self.extra_annual_payment = Some(amount);
        self
    }

    pub fn rate_lock_periods(mut self, periods: u32) -> Self {
        self.rate_lock_periods = Some(periods);
        self
    }

    pub fn term_periods(mut self, periods: u32) -> Self {
        self.term_periods = Some(periods);
        self
    }

    /// monthly granularity with exact compounding over `months`
    pub fn monthly(mut self, months: u32) -> Self {
        self.granularity = Some(Granularity::Monthly);
        self.term_periods = Some(months);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn max_periods(mut self, periods: u32) -> Self {
        self.max_periods = Some(periods);
        self
    }

    /// build with system time as the default start date
    pub fn build(self) -> Result<FinancingPlan> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.build_with_time(&time)
    }

    /// build with explicit time provider for the default start date
    pub fn build_with_time(self, time: &SafeTimeProvider) -> Result<FinancingPlan> {
        let params = self.parameters()?;
        let mut plan = FinancingPlan::new(params, time)?;

        if let Some(date) = self.start_date {
            plan.start_date = date;
        }
        if let Some(max_periods) = self.max_periods {
            plan.config = GeneratorConfig::with_max_periods(max_periods);
            plan.config.validate()?;
        }

        Ok(plan)
    }

    fn parameters(&self) -> Result<FinancingParameters> {
        let purchase_price = self.purchase_price.ok_or(FinancingError::InvalidConfiguration {
            message: "purchase price required".to_string(),
        })?;
        let nominal_rate = self.nominal_rate.ok_or(FinancingError::InvalidConfiguration {
            message: "nominal rate required".to_string(),
        })?;
        let repayment_rate = self.repayment_rate.ok_or(FinancingError::InvalidConfiguration {
            message: "repayment rate required".to_string(),
        })?;
        let equity = self.equity.unwrap_or(Money::ZERO);

        let mut params = match self.granularity.unwrap_or_default() {
            Granularity::Annual => {
                FinancingParameters::annual(purchase_price, equity, nominal_rate, repayment_rate)
            }
            Granularity::Monthly => {
                let term = self.term_periods.ok_or(FinancingError::InvalidConfiguration {
                    message: "term required for monthly plans".to_string(),
                })?;
                FinancingParameters::monthly(purchase_price, equity, nominal_rate, repayment_rate, term)
            }
        };

        if let Some(rate) = self.ancillary_cost_rate {
            params.ancillary_cost_rate = rate;
        }
        if let Some((rate, period)) = self.repayment_switch {
            params = params.with_repayment_switch(rate, period);
        }
        if let Some(amount) = self.extra_annual_payment {
            params.extra_annual_payment = amount;
        }
        if let Some(periods) = self.rate_lock_periods {
            params.rate_lock_periods = periods;
        }
        if self.term_periods.is_some() {
            params.term_periods = self.term_periods;
        }

        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_builder_defaults_start_date_from_time_provider() {
        let plan = FinancingPlan::builder()
            .purchase_price(Money::from_major(400_000))
            .equity(Money::from_major(80_000))
            .nominal_rate(Rate::from_percent(dec!(3.0)))
            .repayment_rate(Rate::from_percent(dec!(2.0)))
            .build_with_time(&test_time())
            .unwrap();

        assert_eq!(plan.start_date(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(plan.params().ancillary_cost_rate, Rate::from_percent(dec!(10)));
        assert_eq!(plan.params().granularity, Granularity::Annual);
    }

    #[test]
    fn test_builder_requires_rates() {
        let result = FinancingPlan::builder()
            .purchase_price(Money::from_major(400_000))
            .build_with_time(&test_time());

        assert!(matches!(result, Err(FinancingError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_builder_validates_parameters() {
        let result = FinancingPlan::builder()
            .purchase_price(Money::from_major(400_000))
            .nominal_rate(Rate::from_percent(dec!(3.0)))
            .repayment_rate(Rate::from_percent(dec!(2.0)))
            .rate_lock_periods(0)
            .build_with_time(&test_time());

        assert!(matches!(
            result,
            Err(FinancingError::InvalidParameter { name: "rate_lock_periods", .. })
        ));
    }

    #[test]
    fn test_calculate_report() {
        let mut plan = FinancingPlan::builder()
            .purchase_price(Money::from_major(400_000))
            .equity(Money::from_major(80_000))
            .nominal_rate(Rate::from_percent(dec!(3.0)))
            .repayment_rate(Rate::from_percent(dec!(2.0)))
            .repayment_switch(Rate::from_percent(dec!(3.5)), 11)
            .extra_annual_payment(Money::from_major(2_000))
            .build_with_time(&test_time())
            .unwrap();

        let report = plan.calculate().unwrap();

        assert_eq!(report.plan_id, plan.id());
        assert_eq!(report.schedule.plan_id, plan.id());
        assert_eq!(report.summary.costs.loan_amount, Money::from_major(360_000));
        assert_eq!(
            report.lock_phases.len() as u32,
            report.summary.rate_lock_phases_needed
        );
        assert_eq!(
            report.schedule.get_entry(1).unwrap().due_date,
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );

        let events = plan.take_events();
        assert!(events.iter().all(|e| e.plan_id() == plan.id()));
        assert!(events
            .iter()
            .any(|e| matches!(e, ScheduleEvent::RepaymentRateSwitched { period: 11, .. })));
        assert!(plan.events().is_empty());
    }

    #[test]
    fn test_monthly_plan_requires_term() {
        let mut builder = FinancingPlan::builder()
            .purchase_price(Money::from_major(300_000))
            .nominal_rate(Rate::from_percent(dec!(3.0)))
            .repayment_rate(Rate::from_percent(dec!(2.0)));
        builder.granularity = Some(Granularity::Monthly);

        assert!(matches!(
            builder.build_with_time(&test_time()),
            Err(FinancingError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_max_periods_is_enforced() {
        let mut plan = FinancingPlan::builder()
            .purchase_price(Money::from_major(400_000))
            .nominal_rate(Rate::from_percent(dec!(3.0)))
            .repayment_rate(Rate::from_percent(dec!(1.0)))
            .max_periods(5)
            .build_with_time(&test_time())
            .unwrap();

        assert!(matches!(
            plan.calculate(),
            Err(FinancingError::IterationLimitExceeded { limit: 5, .. })
        ));
    }
}
