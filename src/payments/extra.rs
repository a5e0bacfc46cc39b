use serde::{Deserialize, Serialize};

use crate::config::FinancingParameters;
use crate::decimal::Money;
use crate::types::Granularity;

/// recurring lump-sum payment applied at every year end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraPaymentPlan {
    annual_amount: Money,
    granularity: Granularity,
}

impl ExtraPaymentPlan {
    pub fn new(annual_amount: Money, granularity: Granularity) -> Self {
        Self {
            annual_amount,
            granularity,
        }
    }

    pub fn none(granularity: Granularity) -> Self {
        Self::new(Money::ZERO, granularity)
    }

    pub fn from_parameters(params: &FinancingParameters) -> Self {
        Self::new(params.extra_annual_payment, params.granularity)
    }

    pub fn annual_amount(&self) -> Money {
        self.annual_amount
    }

    pub fn is_active(&self) -> bool {
        self.annual_amount.is_positive()
    }

    /// scheduled lump sum for a period, before capping at the balance
    pub fn scheduled_for(&self, period: u32) -> Money {
        if self.is_active() && self.granularity.is_year_end(period) {
            self.annual_amount
        } else {
            Money::ZERO
        }
    }

    /// lump sum actually applied, never more than what the regular
    /// payment leaves outstanding
    pub fn applied_for(&self, period: u32, outstanding_after_regular: Money) -> Money {
        self.scheduled_for(period)
            .min(outstanding_after_regular)
            .max(Money::ZERO)
    }
}
