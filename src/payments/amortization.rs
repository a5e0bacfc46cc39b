use chrono::{Months, NaiveDate};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{FinancingParameters, GeneratorConfig};
use crate::decimal::{Money, Rate};
use crate::errors::{FinancingError, Result};
use crate::events::{EventStore, ScheduleEvent};
use crate::types::{Granularity, PlanId, Termination};

use super::annuity::{Annuity, AnnuityCalculator, AnnuityModel};
use super::extra::ExtraPaymentPlan;
use super::repayment::RepaymentRatePolicy;

/// rounding residual folded into the last contractual payment
const SETTLEMENT_TOLERANCE: Money = Money::CENT;

/// one period of the amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub period: u32,
    pub due_date: Option<NaiveDate>,
    pub beginning_balance: Money,
    /// regular payment actually made (interest plus regular principal)
    pub payment_amount: Money,
    pub interest_paid: Money,
    /// regular principal plus any extra payment
    pub principal_paid: Money,
    pub extra_payment_applied: Money,
    pub remaining_balance: Money,
    pub applied_repayment_rate: Rate,
}

/// amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub plan_id: PlanId,
    pub loan_amount: Money,
    pub granularity: Granularity,
    pub model: AnnuityModel,
    /// regular payment of the first period
    pub initial_payment: Money,
    pub entries: Vec<ScheduleEntry>,
    pub termination: Termination,
}

impl AmortizationSchedule {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleEntry> {
        self.entries.iter()
    }

    pub fn effective_term_periods(&self) -> u32 {
        self.entries.len() as u32
    }

    /// get entry for specific period
    pub fn get_entry(&self, period: u32) -> Option<&ScheduleEntry> {
        period
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx as usize))
    }

    /// remaining balance after a period, loan amount before the first
    pub fn balance_after(&self, period: u32) -> Money {
        if period == 0 {
            return self.loan_amount.max(Money::ZERO);
        }
        self.get_entry(period)
            .or_else(|| self.entries.last())
            .map(|e| e.remaining_balance)
            .unwrap_or_else(|| self.loan_amount.max(Money::ZERO))
    }

    pub fn total_interest(&self) -> Money {
        self.entries.iter().map(|e| e.interest_paid).sum()
    }

    pub fn total_principal(&self) -> Money {
        self.entries.iter().map(|e| e.principal_paid).sum()
    }

    pub fn total_extra_payments(&self) -> Money {
        self.entries.iter().map(|e| e.extra_payment_applied).sum()
    }
}

impl<'a> IntoIterator for &'a AmortizationSchedule {
    type Item = &'a ScheduleEntry;
    type IntoIter = std::slice::Iter<'a, ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// period-by-period repayment engine
#[derive(Debug, Clone)]
pub struct ScheduleGenerator {
    plan_id: PlanId,
    loan_amount: Money,
    granularity: Granularity,
    annuity: Annuity,
    policy: RepaymentRatePolicy,
    extras: ExtraPaymentPlan,
    term_periods: Option<u32>,
    rate_lock_periods: u32,
    start_date: Option<NaiveDate>,
    config: GeneratorConfig,
}

impl ScheduleGenerator {
    pub fn new(params: &FinancingParameters) -> Result<Self> {
        params.validate()?;

        let annuity = Annuity::from_parameters(params)?;
        let mut policy = RepaymentRatePolicy::from_parameters(params);

        if policy.is_switching() && annuity.model() == AnnuityModel::ExactCompounding {
            warn!(
                "repayment rate switch at period {:?} ignored: exact compounding fixes the payment up front",
                params.switch_period
            );
            policy = RepaymentRatePolicy::constant(params.initial_repayment_rate);
        }

        Ok(Self {
            plan_id: Uuid::new_v4(),
            loan_amount: params.loan_amount(),
            granularity: params.granularity,
            annuity,
            policy,
            extras: ExtraPaymentPlan::from_parameters(params),
            term_periods: params.term_periods,
            rate_lock_periods: params.rate_lock_periods,
            start_date: None,
            config: GeneratorConfig::default(),
        })
    }

    pub fn with_plan_id(mut self, plan_id: PlanId) -> Self {
        self.plan_id = plan_id;
        self
    }

    /// date the schedule; period `n` falls due `n` periods after `date`
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn annuity(&self) -> &Annuity {
        &self.annuity
    }

    pub fn policy(&self) -> &RepaymentRatePolicy {
        &self.policy
    }

    /// run the schedule until paid off or the term ends
    pub fn generate(&self, events: &mut EventStore) -> Result<AmortizationSchedule> {
        self.config.validate()?;

        // without extra payments an exact annuity runs its full term
        if let Annuity::Compounding(annuity) = self.annuity {
            if annuity.term_periods() > self.config.max_periods
                && !self.extras.is_active()
                && self.loan_amount.is_positive()
            {
                warn!(
                    "plan {} term of {} periods exceeds the limit of {}",
                    self.plan_id,
                    annuity.term_periods(),
                    self.config.max_periods
                );
                return Err(FinancingError::IterationLimitExceeded {
                    limit: self.config.max_periods,
                    remaining_balance: self.loan_amount,
                });
            }
        }

        let periodic_rate = self.annuity.periodic_rate();
        let initial_payment = if self.loan_amount.is_positive() {
            self.annuity.periodic_payment(self.policy.initial_rate())
        } else {
            Money::ZERO
        };

        debug!(
            "generating {:?} schedule for plan {}: loan {}, periodic rate {}, initial payment {}",
            self.annuity.model(),
            self.plan_id,
            self.loan_amount,
            periodic_rate,
            initial_payment
        );

        events.emit(ScheduleEvent::ScheduleStarted {
            plan_id: self.plan_id,
            loan_amount: self.loan_amount,
            initial_payment,
        });

        let mut balance = self.loan_amount.max(Money::ZERO);
        let mut entries: Vec<ScheduleEntry> = Vec::new();
        let mut current_rate = self.policy.initial_rate();
        let mut period: u32 = 1;

        let termination = loop {
            if balance.is_zero() {
                break Termination::PaidOff;
            }
            if let Some(term) = self.term_periods {
                if period > term {
                    break Termination::TermEnded {
                        residual_balance: balance,
                    };
                }
            }
            if period > self.config.max_periods {
                warn!(
                    "plan {} still owes {} after {} periods",
                    self.plan_id, balance, self.config.max_periods
                );
                return Err(FinancingError::IterationLimitExceeded {
                    limit: self.config.max_periods,
                    remaining_balance: balance,
                });
            }

            let due_date = self.due_date(period)?;

            let repayment_rate = self.policy.repayment_rate_at(period);
            if repayment_rate != current_rate {
                debug!(
                    "plan {} switches repayment rate from {} to {} in period {}",
                    self.plan_id, current_rate, repayment_rate, period
                );
                events.emit(ScheduleEvent::RepaymentRateSwitched {
                    plan_id: self.plan_id,
                    period,
                    old_rate: current_rate,
                    new_rate: repayment_rate,
                    due_date,
                });
                current_rate = repayment_rate;
            }

            let interest = balance.apply(periodic_rate);
            let payment = self.annuity.periodic_payment(repayment_rate);
            let regular = payment - interest;

            if !(regular + self.extras.scheduled_for(period)).is_positive() {
                warn!(
                    "plan {} does not amortize in period {}: payment {} vs interest {}",
                    self.plan_id, period, payment, interest
                );
                return Err(FinancingError::NonAmortizingLoan {
                    period,
                    balance,
                    interest,
                    payment,
                });
            }

            let regular_principal = regular.min(balance);
            let extra = self.extras.applied_for(period, balance - regular_principal);
            let mut principal = regular_principal + extra;
            let mut remaining = (balance - principal).max(Money::ZERO);

            if self.closes_term(period) && remaining.is_positive() && remaining <= SETTLEMENT_TOLERANCE {
                principal += remaining;
                remaining = Money::ZERO;
            }

            if extra.is_positive() {
                debug!("plan {} applies extra payment {} in period {}", self.plan_id, extra, period);
                events.emit(ScheduleEvent::ExtraPaymentApplied {
                    plan_id: self.plan_id,
                    period,
                    amount: extra,
                    due_date,
                });
            }

            entries.push(ScheduleEntry {
                period,
                due_date,
                beginning_balance: balance,
                payment_amount: interest + (principal - extra),
                interest_paid: interest,
                principal_paid: principal,
                extra_payment_applied: extra,
                remaining_balance: remaining,
                applied_repayment_rate: repayment_rate,
            });

            if period % self.rate_lock_periods == 0 && remaining.is_positive() {
                events.emit(ScheduleEvent::RateLockPhaseEnded {
                    plan_id: self.plan_id,
                    phase: period / self.rate_lock_periods,
                    period,
                    remaining_balance: remaining,
                    due_date,
                });
            }

            balance = remaining;
            period += 1;
        };

        let last = entries.last().map(|e| (e.period, e.due_date));
        match termination {
            Termination::PaidOff => {
                if let Some((period, due_date)) = last {
                    events.emit(ScheduleEvent::LoanPaidOff {
                        plan_id: self.plan_id,
                        period,
                        due_date,
                    });
                }
            }
            Termination::TermEnded { residual_balance } => {
                if let Some((period, due_date)) = last {
                    events.emit(ScheduleEvent::TermEnded {
                        plan_id: self.plan_id,
                        period,
                        residual_balance,
                        due_date,
                    });
                }
            }
        }

        info!(
            "plan {} schedule complete after {} periods: {:?}",
            self.plan_id,
            entries.len(),
            termination
        );

        Ok(AmortizationSchedule {
            plan_id: self.plan_id,
            loan_amount: self.loan_amount,
            granularity: self.granularity,
            model: self.annuity.model(),
            initial_payment,
            entries,
            termination,
        })
    }

    /// last contractual period of an exact annuity
    fn closes_term(&self, period: u32) -> bool {
        match self.annuity {
            Annuity::Compounding(annuity) => annuity.term_periods() == period,
            Annuity::Simplified(_) => false,
        }
    }

    fn due_date(&self, period: u32) -> Result<Option<NaiveDate>> {
        let Some(start) = self.start_date else {
            return Ok(None);
        };

        let months = period
            .checked_mul(self.granularity.months_per_period())
            .ok_or_else(|| FinancingError::CalculationError {
                message: format!("period {} out of date range", period),
            })?;

        start
            .checked_add_months(Months::new(months))
            .map(Some)
            .ok_or_else(|| FinancingError::CalculationError {
                message: format!("due date of period {} out of range", period),
            })
    }
}

/// generate a schedule with default limits, discarding events
pub fn generate_schedule(params: &FinancingParameters) -> Result<AmortizationSchedule> {
    let mut events = EventStore::new();
    ScheduleGenerator::new(params)?.generate(&mut events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_PERIODS;
    use rust_decimal_macros::dec;

    fn annual_params() -> FinancingParameters {
        FinancingParameters::annual(
            Money::from_major(400_000),
            Money::from_major(80_000),
            Rate::from_percent(dec!(3.0)),
            Rate::from_percent(dec!(2.0)),
        )
    }

    fn monthly_params(principal: i64, rate: Rate, months: u32) -> FinancingParameters {
        FinancingParameters::monthly(
            Money::from_major(principal),
            Money::ZERO,
            rate,
            Rate::from_percent(dec!(2.0)),
            months,
        )
        .with_ancillary_cost_rate(Rate::ZERO)
    }

    #[test]
    fn test_annual_schedule_pays_off() {
        let schedule = generate_schedule(&annual_params()).unwrap();

        assert_eq!(schedule.termination, Termination::PaidOff);
        assert_eq!(schedule.model, AnnuityModel::Simplified);
        assert_eq!(schedule.initial_payment, Money::from_major(18_000));

        let first = schedule.get_entry(1).unwrap();
        assert_eq!(first.beginning_balance, Money::from_major(360_000));
        assert_eq!(first.interest_paid, Money::from_major(10_800));
        assert_eq!(first.principal_paid, Money::from_major(7_200));

        let last = schedule.entries.last().unwrap();
        assert_eq!(last.remaining_balance, Money::ZERO);
        // 3% + 2% initial repayment pays off in the 31st year
        assert_eq!(schedule.effective_term_periods(), 31);
    }

    #[test]
    fn test_balance_is_non_increasing() {
        let params = annual_params()
            .with_repayment_switch(Rate::from_percent(dec!(4.0)), 6)
            .with_extra_annual_payment(Money::from_major(2_500));
        let schedule = generate_schedule(&params).unwrap();

        let mut previous = schedule.loan_amount;
        for entry in &schedule {
            assert!(entry.remaining_balance <= previous);
            assert!(entry.interest_paid >= Money::ZERO);
            assert!(entry.principal_paid.is_positive());
            previous = entry.remaining_balance;
        }
        assert_eq!(previous, Money::ZERO);
    }

    #[test]
    fn test_totals_reconcile_to_loan_amount() {
        let params = annual_params().with_extra_annual_payment(Money::from_major(5_000));
        let schedule = generate_schedule(&params).unwrap();

        assert_eq!(schedule.total_principal(), schedule.loan_amount);
    }

    #[test]
    fn test_exact_annuity_closes_at_term() {
        let params = monthly_params(300_000, Rate::from_percent(dec!(3.0)), 360);
        let schedule = generate_schedule(&params).unwrap();

        assert_eq!(schedule.len(), 360);
        assert_eq!(schedule.termination, Termination::PaidOff);
        assert_eq!(schedule.balance_after(360), Money::ZERO);
        assert!(schedule.balance_after(359) > Money::from_major(1_000));

        let payment = schedule.initial_payment;
        for entry in &schedule.entries[..359] {
            assert_eq!(entry.payment_amount, payment);
        }
        let last = &schedule.entries[359];
        assert!((last.payment_amount - payment).abs() <= Money::CENT);
    }

    #[test]
    fn test_zero_interest_schedule() {
        let params = monthly_params(120_000, Rate::ZERO, 120);
        let schedule = generate_schedule(&params).unwrap();

        assert_eq!(schedule.initial_payment, Money::from_major(1_000));
        assert_eq!(schedule.len(), 120);
        for entry in &schedule {
            assert_eq!(entry.interest_paid, Money::ZERO);
            assert_eq!(entry.principal_paid, Money::from_major(1_000));
        }
        assert!(schedule.termination.is_paid_off());
    }

    #[test]
    fn test_repayment_switch_under_annual_model() {
        let params = annual_params().with_repayment_switch(Rate::from_percent(dec!(3.5)), 11);
        let mut events = EventStore::new();
        let schedule = ScheduleGenerator::new(&params)
            .unwrap()
            .generate(&mut events)
            .unwrap();

        for entry in &schedule {
            let expected = if entry.period <= 10 {
                Rate::from_percent(dec!(2.0))
            } else {
                Rate::from_percent(dec!(3.5))
            };
            assert_eq!(entry.applied_repayment_rate, expected);
        }
        // annual payment follows the new rate: 360000 * 6.5%
        assert_eq!(
            schedule.get_entry(11).unwrap().payment_amount,
            Money::from_major(23_400)
        );

        let switches: Vec<_> = events
            .events()
            .iter()
            .filter(|e| matches!(e, ScheduleEvent::RepaymentRateSwitched { period: 11, .. }))
            .collect();
        assert_eq!(switches.len(), 1);
    }

    #[test]
    fn test_switch_ignored_under_exact_compounding() {
        let params = monthly_params(300_000, Rate::from_percent(dec!(3.0)), 360)
            .with_repayment_switch(Rate::from_percent(dec!(5.0)), 13);
        let generator = ScheduleGenerator::new(&params).unwrap();
        assert!(!generator.policy().is_switching());

        let schedule = generator.generate(&mut EventStore::new()).unwrap();
        assert_eq!(schedule.len(), 360);
        assert!(schedule
            .iter()
            .all(|e| e.applied_repayment_rate == Rate::from_percent(dec!(2.0))));
    }

    #[test]
    fn test_monthly_extra_payment_at_year_end() {
        let params = monthly_params(300_000, Rate::from_percent(dec!(3.0)), 360)
            .with_extra_annual_payment(Money::from_major(1_000));
        let schedule = generate_schedule(&params).unwrap();

        assert!(schedule.len() < 360);
        let payment = schedule.initial_payment;

        // the final period may need less than the full lump sum
        for entry in &schedule.entries[..schedule.len() - 1] {
            if entry.period % 12 == 0 {
                assert_eq!(entry.extra_payment_applied, Money::from_major(1_000));
                assert_eq!(
                    entry.principal_paid,
                    (payment - entry.interest_paid) + Money::from_major(1_000)
                );
            } else {
                assert_eq!(entry.extra_payment_applied, Money::ZERO);
                assert_eq!(entry.principal_paid, payment - entry.interest_paid);
            }
        }
    }

    #[test]
    fn test_zero_repayment_does_not_amortize() {
        let mut params = annual_params();
        params.initial_repayment_rate = Rate::ZERO;

        let result = generate_schedule(&params);
        assert!(matches!(
            result,
            Err(FinancingError::NonAmortizingLoan { period: 1, .. })
        ));
    }

    #[test]
    fn test_iteration_limit() {
        let mut params = annual_params();
        params.initial_repayment_rate = Rate::from_percent(dec!(0.1));

        let result = ScheduleGenerator::new(&params)
            .unwrap()
            .with_config(GeneratorConfig::with_max_periods(20))
            .generate(&mut EventStore::new());

        match result {
            Err(FinancingError::IterationLimitExceeded { limit, remaining_balance }) => {
                assert_eq!(limit, 20);
                assert!(remaining_balance.is_positive());
            }
            other => panic!("expected iteration limit, got {:?}", other),
        }
    }

    #[test]
    fn test_term_beyond_limit_fails_before_any_period() {
        let params = monthly_params(100_000, Rate::from_percent(dec!(0.0000001)), 4_000_000_000);
        let started = std::time::Instant::now();
        let mut events = EventStore::new();

        let result = ScheduleGenerator::new(&params).unwrap().generate(&mut events);

        match result {
            Err(FinancingError::IterationLimitExceeded { limit, remaining_balance }) => {
                assert_eq!(limit, DEFAULT_MAX_PERIODS);
                assert_eq!(remaining_balance, Money::from_major(100_000));
            }
            other => panic!("expected iteration limit, got {:?}", other),
        }
        assert!(events.is_empty());
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_term_beyond_limit_with_extras_still_runs() {
        let params = monthly_params(120_000, Rate::from_percent(dec!(3.0)), 3_600)
            .with_extra_annual_payment(Money::from_major(20_000));

        let schedule = generate_schedule(&params).unwrap();

        assert_eq!(schedule.termination, Termination::PaidOff);
        assert!(schedule.effective_term_periods() < DEFAULT_MAX_PERIODS);
    }

    #[test]
    fn test_fixed_term_under_annual_model_leaves_residual() {
        let params = annual_params().with_term_periods(10);
        let schedule = generate_schedule(&params).unwrap();

        assert_eq!(schedule.len(), 10);
        match schedule.termination {
            Termination::TermEnded { residual_balance } => {
                assert_eq!(residual_balance, schedule.balance_after(10));
                assert!(residual_balance.is_positive());
            }
            Termination::PaidOff => panic!("expected the term to end first"),
        }
    }

    #[test]
    fn test_negative_loan_amount_yields_empty_schedule() {
        let mut params = annual_params();
        params.equity = Money::from_major(500_000);

        let schedule = generate_schedule(&params).unwrap();
        assert!(schedule.is_empty());
        assert_eq!(schedule.termination, Termination::PaidOff);
        assert_eq!(schedule.loan_amount, Money::from_major(-60_000));
    }

    #[test]
    fn test_due_dates_and_lock_events() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let params = monthly_params(300_000, Rate::from_percent(dec!(3.0)), 360)
            .with_rate_lock_periods(120);
        let mut events = EventStore::new();

        let schedule = ScheduleGenerator::new(&params)
            .unwrap()
            .with_start_date(start)
            .generate(&mut events)
            .unwrap();

        assert_eq!(
            schedule.get_entry(1).unwrap().due_date,
            NaiveDate::from_ymd_opt(2025, 2, 15)
        );
        assert_eq!(
            schedule.get_entry(12).unwrap().due_date,
            NaiveDate::from_ymd_opt(2026, 1, 15)
        );

        let lock_ends: Vec<u32> = events
            .events()
            .iter()
            .filter_map(|e| match e {
                ScheduleEvent::RateLockPhaseEnded { period, .. } => Some(*period),
                _ => None,
            })
            .collect();
        assert_eq!(lock_ends, vec![120, 240]);

        assert!(matches!(
            events.events().last(),
            Some(ScheduleEvent::LoanPaidOff { period: 360, .. })
        ));
    }
}
