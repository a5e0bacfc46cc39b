//! serialization support for financing reports
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analysis::{FinancingSummary, LockPhase};
use crate::decimal::Money;
use crate::payments::{AnnuityModel, ScheduleEntry};
use crate::plan::FinancingReport;
use crate::types::{Granularity, PlanId};

/// serializable view of a calculated plan
#[derive(Debug, Serialize, Deserialize)]
pub struct PlanView {
    pub id: PlanId,
    pub start_date: NaiveDate,
    pub terms: TermsView,
    pub summary: FinancingSummary,
    pub lock_phases: Vec<LockPhase>,
    pub schedule: Vec<ScheduleRow>,
}

/// contractual terms, rates as percentage figures
#[derive(Debug, Serialize, Deserialize)]
pub struct TermsView {
    pub granularity: Granularity,
    pub annuity_model: AnnuityModel,
    pub nominal_rate_percent: Decimal,
    pub initial_repayment_percent: Decimal,
    pub switch_repayment_percent: Option<Decimal>,
    pub switch_period: Option<u32>,
    pub extra_annual_payment: Money,
    pub term_periods: Option<u32>,
}

/// one schedule row, flat for tabulation and export
#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub period: u32,
    pub due_date: Option<NaiveDate>,
    pub interest: Money,
    pub principal: Money,
    pub extra_payment: Money,
    pub remaining_balance: Money,
    pub repayment_percent: Decimal,
}

impl From<&ScheduleEntry> for ScheduleRow {
    fn from(entry: &ScheduleEntry) -> Self {
        ScheduleRow {
            period: entry.period,
            due_date: entry.due_date,
            interest: entry.interest_paid,
            principal: entry.principal_paid,
            extra_payment: entry.extra_payment_applied,
            remaining_balance: entry.remaining_balance,
            repayment_percent: entry.applied_repayment_rate.as_percentage().normalize(),
        }
    }
}

impl PlanView {
    pub fn from_report(report: &FinancingReport) -> Self {
        let params = &report.parameters;
        PlanView {
            id: report.plan_id,
            start_date: report.start_date,
            terms: TermsView {
                granularity: params.granularity,
                annuity_model: report.schedule.model,
                nominal_rate_percent: params.nominal_annual_rate.as_percentage().normalize(),
                initial_repayment_percent: params.initial_repayment_rate.as_percentage().normalize(),
                switch_repayment_percent: params
                    .switch_repayment_rate
                    .map(|r| r.as_percentage().normalize()),
                switch_period: params.switch_period,
                extra_annual_payment: params.extra_annual_payment,
                term_periods: params.term_periods,
            },
            summary: report.summary.clone(),
            lock_phases: report.lock_phases.clone(),
            schedule: report.schedule.iter().map(ScheduleRow::from).collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
