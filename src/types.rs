use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a financing plan
pub type PlanId = Uuid;

/// schedule granularity, selects the annuity model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Granularity {
    /// one period per year, simplified annual model
    #[default]
    Annual,
    /// twelve periods per year, exact compounding
    Monthly,
}

impl Granularity {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Granularity::Annual => 1,
            Granularity::Monthly => 12,
        }
    }

    /// calendar months covered by one period
    pub fn months_per_period(&self) -> u32 {
        12 / self.periods_per_year()
    }

    /// true if the period closes a year
    pub fn is_year_end(&self, period: u32) -> bool {
        period > 0 && period % self.periods_per_year() == 0
    }
}

/// how a completed schedule ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// balance reached exactly zero
    PaidOff,
    /// fixed term elapsed, residual balance may remain
    TermEnded { residual_balance: Money },
}

impl Termination {
    pub fn residual_balance(&self) -> Money {
        match self {
            Termination::PaidOff => Money::ZERO,
            Termination::TermEnded { residual_balance } => *residual_balance,
        }
    }

    pub fn is_paid_off(&self) -> bool {
        matches!(self, Termination::PaidOff)
    }
}
