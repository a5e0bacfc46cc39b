use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::PlanId;

/// milestones emitted while a schedule is generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduleEvent {
    ScheduleStarted {
        plan_id: PlanId,
        loan_amount: Money,
        initial_payment: Money,
    },
    RepaymentRateSwitched {
        plan_id: PlanId,
        period: u32,
        old_rate: Rate,
        new_rate: Rate,
        due_date: Option<NaiveDate>,
    },
    ExtraPaymentApplied {
        plan_id: PlanId,
        period: u32,
        amount: Money,
        due_date: Option<NaiveDate>,
    },
    RateLockPhaseEnded {
        plan_id: PlanId,
        phase: u32,
        period: u32,
        remaining_balance: Money,
        due_date: Option<NaiveDate>,
    },
    LoanPaidOff {
        plan_id: PlanId,
        period: u32,
        due_date: Option<NaiveDate>,
    },
    TermEnded {
        plan_id: PlanId,
        period: u32,
        residual_balance: Money,
        due_date: Option<NaiveDate>,
    },
}

impl ScheduleEvent {
    pub fn plan_id(&self) -> PlanId {
        match self {
            ScheduleEvent::ScheduleStarted { plan_id, .. }
            | ScheduleEvent::RepaymentRateSwitched { plan_id, .. }
            | ScheduleEvent::ExtraPaymentApplied { plan_id, .. }
            | ScheduleEvent::RateLockPhaseEnded { plan_id, .. }
            | ScheduleEvent::LoanPaidOff { plan_id, .. }
            | ScheduleEvent::TermEnded { plan_id, .. } => *plan_id,
        }
    }
}

/// event store for collecting events during generation
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<ScheduleEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: ScheduleEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<ScheduleEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[ScheduleEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
