use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::FinancingParameters;
use crate::decimal::Money;
use crate::errors::Result;
use crate::payments::AmortizationSchedule;
use crate::types::Termination;

use super::rate_lock::RateLockPlanner;

/// static acquisition cost figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub purchase_price: Money,
    pub ancillary_costs: Money,
    pub total_acquisition_cost: Money,
    pub equity: Money,
    pub loan_amount: Money,
}

impl CostBreakdown {
    pub fn from_parameters(params: &FinancingParameters) -> Self {
        Self {
            purchase_price: params.purchase_price,
            ancillary_costs: params.ancillary_costs(),
            total_acquisition_cost: params.total_acquisition_cost(),
            equity: params.equity,
            loan_amount: params.loan_amount(),
        }
    }
}

/// headline figures of a financing plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingSummary {
    #[serde(flatten)]
    pub costs: CostBreakdown,
    pub initial_periodic_payment: Money,
    pub initial_annual_payment: Money,
    pub initial_monthly_payment: Money,
    pub effective_term_periods: u32,
    pub effective_term_years: Decimal,
    pub rate_lock_periods: u32,
    pub rate_lock_phases_needed: u32,
    pub total_interest_paid: Money,
    pub total_principal_paid: Money,
    pub total_extra_payments: Money,
    pub total_paid: Money,
    pub termination: Termination,
    pub residual_balance: Money,
}

impl FinancingSummary {
    /// fold a completed schedule; pure, same input gives same output
    pub fn from_schedule(
        params: &FinancingParameters,
        schedule: &AmortizationSchedule,
    ) -> Result<Self> {
        let planner = RateLockPlanner::new(params.rate_lock_periods)?;
        let periods_per_year = Decimal::from(params.periods_per_year());

        let effective_term_periods = schedule.effective_term_periods();
        let initial_annual_payment = schedule.initial_payment * periods_per_year;

        let total_interest_paid = schedule.total_interest();
        let total_principal_paid = schedule.total_principal();

        Ok(Self {
            costs: CostBreakdown::from_parameters(params),
            initial_periodic_payment: schedule.initial_payment,
            initial_annual_payment,
            initial_monthly_payment: initial_annual_payment / Decimal::from(12),
            effective_term_periods,
            effective_term_years: (Decimal::from(effective_term_periods) / periods_per_year)
                .round_dp(2),
            rate_lock_periods: params.rate_lock_periods,
            rate_lock_phases_needed: planner.phases_needed(effective_term_periods),
            total_interest_paid,
            total_principal_paid,
            total_extra_payments: schedule.total_extra_payments(),
            total_paid: total_interest_paid + total_principal_paid,
            termination: schedule.termination,
            residual_balance: schedule.termination.residual_balance(),
        })
    }
}
