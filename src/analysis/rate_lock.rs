use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{FinancingError, Result};
use crate::payments::AmortizationSchedule;

/// one fixed-rate phase of the repayment horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockPhase {
    pub phase: u32,
    pub first_period: u32,
    pub last_period: u32,
    pub interest_paid: Money,
    pub principal_paid: Money,
    /// debt left to refinance when the lock expires
    pub closing_balance: Money,
}

/// consecutive lock phases covering the schedule
pub struct RateLockPlanner {
    rate_lock_periods: u32,
}

impl RateLockPlanner {
    pub fn new(rate_lock_periods: u32) -> Result<Self> {
        if rate_lock_periods == 0 {
            return Err(FinancingError::invalid("rate_lock_periods", "must be positive"));
        }
        Ok(Self { rate_lock_periods })
    }

    /// ceil(effective / lock)
    pub fn phases_needed(&self, effective_term_periods: u32) -> u32 {
        effective_term_periods.div_ceil(self.rate_lock_periods)
    }

    /// per-phase breakdown of a completed schedule
    pub fn lock_phases(&self, schedule: &AmortizationSchedule) -> Vec<LockPhase> {
        schedule
            .entries
            .chunks(self.rate_lock_periods as usize)
            .zip(1..)
            .map(|(chunk, phase)| LockPhase {
                phase,
                first_period: chunk.first().map(|e| e.period).unwrap_or_default(),
                last_period: chunk.last().map(|e| e.period).unwrap_or_default(),
                interest_paid: chunk.iter().map(|e| e.interest_paid).sum(),
                principal_paid: chunk.iter().map(|e| e.principal_paid).sum(),
                closing_balance: chunk
                    .last()
                    .map(|e| e.remaining_balance)
                    .unwrap_or_default(),
            })
            .collect()
    }
}

pub fn phases_needed(effective_term_periods: u32, rate_lock_periods: u32) -> Result<u32> {
    Ok(RateLockPlanner::new(rate_lock_periods)?.phases_needed(effective_term_periods))
}
