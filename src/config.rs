use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{FinancingError, Result};
use crate::types::Granularity;

/// default ceiling on generated periods
pub const DEFAULT_MAX_PERIODS: u32 = 3000;

/// financing parameters
///
/// Rates are stored as fractions; use [`Rate::from_percent`] to build them
/// from the usual percentage figures. In JSON they appear as fractions too
/// (`0.03` for 3%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingParameters {
    pub purchase_price: Money,
    pub equity: Money,
    /// surcharge on the purchase price (notary, transfer tax, broker)
    pub ancillary_cost_rate: Rate,
    pub nominal_annual_rate: Rate,
    pub initial_repayment_rate: Rate,
    #[serde(default)]
    pub switch_repayment_rate: Option<Rate>,
    #[serde(default)]
    pub switch_period: Option<u32>,
    /// length of one fixed-rate phase, in schedule periods
    pub rate_lock_periods: u32,
    #[serde(default)]
    pub extra_annual_payment: Money,
    /// required for monthly granularity
    #[serde(default)]
    pub term_periods: Option<u32>,
    #[serde(default)]
    pub granularity: Granularity,
}

impl FinancingParameters {
    /// annual model with 10% ancillary costs and a 10 year rate lock
    pub fn annual(
        purchase_price: Money,
        equity: Money,
        nominal_annual_rate: Rate,
        initial_repayment_rate: Rate,
    ) -> Self {
        Self {
            purchase_price,
            equity,
            ancillary_cost_rate: Rate::from_percent(dec!(10)),
            nominal_annual_rate,
            initial_repayment_rate,
            switch_repayment_rate: None,
            switch_period: None,
            rate_lock_periods: 10,
            extra_annual_payment: Money::ZERO,
            term_periods: None,
            granularity: Granularity::Annual,
        }
    }

    /// exact monthly compounding over a fixed term, 10 year rate lock
    pub fn monthly(
        purchase_price: Money,
        equity: Money,
        nominal_annual_rate: Rate,
        initial_repayment_rate: Rate,
        term_months: u32,
    ) -> Self {
        Self {
            rate_lock_periods: 120,
            term_periods: Some(term_months),
            granularity: Granularity::Monthly,
            ..Self::annual(purchase_price, equity, nominal_annual_rate, initial_repayment_rate)
        }
    }

    pub fn with_ancillary_cost_rate(mut self, rate: Rate) -> Self {
        self.ancillary_cost_rate = rate;
        self
    }

    /// switch to `rate` from `period` on
    pub fn with_repayment_switch(mut self, rate: Rate, period: u32) -> Self {
        self.switch_repayment_rate = Some(rate);
        self.switch_period = Some(period);
        self
    }

    pub fn with_extra_annual_payment(mut self, amount: Money) -> Self {
        self.extra_annual_payment = amount;
        self
    }

    pub fn with_rate_lock_periods(mut self, periods: u32) -> Self {
        self.rate_lock_periods = periods;
        self
    }

    pub fn with_term_periods(mut self, periods: u32) -> Self {
        self.term_periods = Some(periods);
        self
    }

    /// parse and validate parameters from json
    pub fn from_json(json: &str) -> Result<Self> {
        let params: FinancingParameters = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn periods_per_year(&self) -> u32 {
        self.granularity.periods_per_year()
    }

    pub fn ancillary_costs(&self) -> Money {
        self.purchase_price.apply(self.ancillary_cost_rate)
    }

    pub fn total_acquisition_cost(&self) -> Money {
        self.purchase_price + self.ancillary_costs()
    }

    /// may be negative when equity exceeds the acquisition cost
    pub fn loan_amount(&self) -> Money {
        self.total_acquisition_cost() - self.equity
    }

    /// check the numeric constraints the engine relies on
    pub fn validate(&self) -> Result<()> {
        if !self.purchase_price.is_positive() {
            return Err(FinancingError::invalid("purchase_price", "must be positive"));
        }
        if self.equity.is_negative() {
            return Err(FinancingError::invalid("equity", "must not be negative"));
        }
        if self.ancillary_cost_rate.is_negative() {
            return Err(FinancingError::invalid("ancillary_cost_rate", "must not be negative"));
        }
        if self.nominal_annual_rate.is_negative() {
            return Err(FinancingError::invalid("nominal_annual_rate", "must not be negative"));
        }
        if self.initial_repayment_rate.is_negative() {
            return Err(FinancingError::invalid("initial_repayment_rate", "must not be negative"));
        }
        if self.rate_lock_periods == 0 {
            return Err(FinancingError::invalid("rate_lock_periods", "must be positive"));
        }
        if self.extra_annual_payment.is_negative() {
            return Err(FinancingError::invalid("extra_annual_payment", "must not be negative"));
        }

        if let Some(period) = self.switch_period {
            if period == 0 {
                return Err(FinancingError::invalid("switch_period", "periods are 1-based"));
            }
            match self.switch_repayment_rate {
                None => {
                    return Err(FinancingError::invalid(
                        "switch_repayment_rate",
                        "required when switch_period is set",
                    ));
                }
                Some(rate) if rate.is_negative() => {
                    return Err(FinancingError::invalid("switch_repayment_rate", "must not be negative"));
                }
                Some(_) => {}
            }
        }

        match (self.granularity, self.term_periods) {
            (_, Some(0)) => Err(FinancingError::invalid("term_periods", "must be positive")),
            (Granularity::Monthly, None) => Err(FinancingError::invalid(
                "term_periods",
                "required for exact monthly compounding",
            )),
            _ => Ok(()),
        }
    }
}

/// limits applied by the schedule generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_max_periods")]
    pub max_periods: u32,
}

fn default_max_periods() -> u32 {
    DEFAULT_MAX_PERIODS
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_periods: DEFAULT_MAX_PERIODS,
        }
    }
}

impl GeneratorConfig {
    pub fn with_max_periods(max_periods: u32) -> Self {
        Self { max_periods }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_periods == 0 {
            return Err(FinancingError::invalid("max_periods", "must be positive"));
        }
        Ok(())
    }
}
