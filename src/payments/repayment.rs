use serde::{Deserialize, Serialize};

use crate::config::FinancingParameters;
use crate::decimal::Rate;

/// how the repayment portion of the payment evolves over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentRatePolicy {
    Constant {
        rate: Rate,
    },
    /// `initial_rate` before `switch_period`, `switch_rate` from it on
    Switching {
        initial_rate: Rate,
        switch_rate: Rate,
        switch_period: u32,
    },
}

impl RepaymentRatePolicy {
    pub fn constant(rate: Rate) -> Self {
        RepaymentRatePolicy::Constant { rate }
    }

    pub fn switching(initial_rate: Rate, switch_rate: Rate, switch_period: u32) -> Self {
        RepaymentRatePolicy::Switching {
            initial_rate,
            switch_rate,
            switch_period,
        }
    }

    /// constant unless both switch rate and switch period are configured
    pub fn from_parameters(params: &FinancingParameters) -> Self {
        match (params.switch_repayment_rate, params.switch_period) {
            (Some(switch_rate), Some(switch_period)) => {
                Self::switching(params.initial_repayment_rate, switch_rate, switch_period)
            }
            _ => Self::constant(params.initial_repayment_rate),
        }
    }

    pub fn repayment_rate_at(&self, period: u32) -> Rate {
        match *self {
            RepaymentRatePolicy::Constant { rate } => rate,
            RepaymentRatePolicy::Switching {
                initial_rate,
                switch_rate,
                switch_period,
            } => {
                if period < switch_period {
                    initial_rate
                } else {
                    switch_rate
                }
            }
        }
    }

    pub fn initial_rate(&self) -> Rate {
        self.repayment_rate_at(1)
    }

    pub fn is_switching(&self) -> bool {
        matches!(self, RepaymentRatePolicy::Switching { .. })
    }

    /// period at which the rate actually changes, if it does
    pub fn switch_at(&self) -> Option<u32> {
        match *self {
            RepaymentRatePolicy::Switching {
                initial_rate,
                switch_rate,
                switch_period,
            } if initial_rate != switch_rate && switch_period > 1 => Some(switch_period),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use rust_decimal_macros::dec;

    #[test]
    fn test_constant_policy() {
        let policy = RepaymentRatePolicy::constant(Rate::from_percent(dec!(2.0)));

        assert_eq!(policy.repayment_rate_at(1), Rate::from_percent(dec!(2.0)));
        assert_eq!(policy.repayment_rate_at(40), Rate::from_percent(dec!(2.0)));
        assert_eq!(policy.switch_at(), None);
    }

    #[test]
    fn test_switching_policy() {
        let policy = RepaymentRatePolicy::switching(
            Rate::from_percent(dec!(2.0)),
            Rate::from_percent(dec!(3.5)),
            11,
        );

        for period in 1..=10 {
            assert_eq!(policy.repayment_rate_at(period), Rate::from_percent(dec!(2.0)));
        }
        for period in 11..=30 {
            assert_eq!(policy.repayment_rate_at(period), Rate::from_percent(dec!(3.5)));
        }
        assert_eq!(policy.switch_at(), Some(11));
    }

    #[test]
    fn test_switch_at_first_period_is_not_a_change() {
        let policy = RepaymentRatePolicy::switching(
            Rate::from_percent(dec!(2.0)),
            Rate::from_percent(dec!(3.5)),
            1,
        );

        assert_eq!(policy.initial_rate(), Rate::from_percent(dec!(3.5)));
        assert_eq!(policy.switch_at(), None);
    }

    #[test]
    fn test_from_parameters() {
        let params = FinancingParameters::annual(
            Money::from_major(400_000),
            Money::from_major(80_000),
            Rate::from_percent(dec!(3.0)),
            Rate::from_percent(dec!(2.0)),
        );
        assert!(!RepaymentRatePolicy::from_parameters(&params).is_switching());

        let params = params.with_repayment_switch(Rate::from_percent(dec!(3.5)), 11);
        let policy = RepaymentRatePolicy::from_parameters(&params);
        assert!(policy.is_switching());
        assert_eq!(policy.repayment_rate_at(11), Rate::from_percent(dec!(3.5)));
    }
}
