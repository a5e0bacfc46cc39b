use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::FinancingParameters;
use crate::decimal::{Money, Rate};
use crate::errors::{FinancingError, Result};
use crate::types::Granularity;

/// annuity model, selected by schedule granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnuityModel {
    /// payment = principal * (nominal + repayment), recomputed each period
    Simplified,
    /// true annuity over a fixed number of periods
    ExactCompounding,
}

impl AnnuityModel {
    pub fn for_granularity(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Annual => AnnuityModel::Simplified,
            Granularity::Monthly => AnnuityModel::ExactCompounding,
        }
    }
}

/// trait for periodic payment calculations
pub trait AnnuityCalculator {
    fn model(&self) -> AnnuityModel;

    /// rate charged on the outstanding balance each period
    fn periodic_rate(&self) -> Rate;

    /// regular payment for one period under the repayment rate in effect
    fn periodic_payment(&self, repayment_rate: Rate) -> Money;
}

/// simplified annual model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplifiedAnnuity {
    principal: Money,
    nominal_annual_rate: Rate,
    periods_per_year: u32,
}

impl SimplifiedAnnuity {
    pub fn new(principal: Money, nominal_annual_rate: Rate, periods_per_year: u32) -> Result<Self> {
        validate_rate_and_frequency(nominal_annual_rate, periods_per_year)?;
        Ok(Self {
            principal,
            nominal_annual_rate,
            periods_per_year,
        })
    }

    /// yearly payment for a repayment rate
    pub fn annual_payment(&self, repayment_rate: Rate) -> Money {
        self.principal.apply(self.nominal_annual_rate + repayment_rate)
    }
}

impl AnnuityCalculator for SimplifiedAnnuity {
    fn model(&self) -> AnnuityModel {
        AnnuityModel::Simplified
    }

    fn periodic_rate(&self) -> Rate {
        self.nominal_annual_rate.per_period(self.periods_per_year)
    }

    fn periodic_payment(&self, repayment_rate: Rate) -> Money {
        self.annual_payment(repayment_rate) / Decimal::from(self.periods_per_year)
    }
}

/// exact compound-interest annuity, fixed up front
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundingAnnuity {
    payment: Money,
    periodic_rate: Rate,
    term_periods: u32,
}

impl CompoundingAnnuity {
    pub fn new(
        principal: Money,
        nominal_annual_rate: Rate,
        term_periods: u32,
        periods_per_year: u32,
    ) -> Result<Self> {
        let payment =
            compute_periodic_annuity(principal, nominal_annual_rate, term_periods, periods_per_year)?;

        Ok(Self {
            payment,
            periodic_rate: nominal_annual_rate.per_period(periods_per_year),
            term_periods,
        })
    }

    pub fn payment(&self) -> Money {
        self.payment
    }

    pub fn term_periods(&self) -> u32 {
        self.term_periods
    }
}

impl AnnuityCalculator for CompoundingAnnuity {
    fn model(&self) -> AnnuityModel {
        AnnuityModel::ExactCompounding
    }

    fn periodic_rate(&self) -> Rate {
        self.periodic_rate
    }

    fn periodic_payment(&self, _repayment_rate: Rate) -> Money {
        self.payment
    }
}

/// annuity strategy built from financing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Annuity {
    Simplified(SimplifiedAnnuity),
    Compounding(CompoundingAnnuity),
}

impl Annuity {
    pub fn from_parameters(params: &FinancingParameters) -> Result<Self> {
        let principal = params.loan_amount().max(Money::ZERO);
        let periods_per_year = params.periods_per_year();

        match AnnuityModel::for_granularity(params.granularity) {
            AnnuityModel::Simplified => Ok(Annuity::Simplified(SimplifiedAnnuity::new(
                principal,
                params.nominal_annual_rate,
                periods_per_year,
            )?)),
            AnnuityModel::ExactCompounding => {
                let term = params.term_periods.ok_or_else(|| {
                    FinancingError::invalid("term_periods", "required for exact monthly compounding")
                })?;
                Ok(Annuity::Compounding(CompoundingAnnuity::new(
                    principal,
                    params.nominal_annual_rate,
                    term,
                    periods_per_year,
                )?))
            }
        }
    }

    fn calculator(&self) -> &dyn AnnuityCalculator {
        match self {
            Annuity::Simplified(annuity) => annuity as &dyn AnnuityCalculator,
            Annuity::Compounding(annuity) => annuity as &dyn AnnuityCalculator,
        }
    }
}

impl AnnuityCalculator for Annuity {
    fn model(&self) -> AnnuityModel {
        self.calculator().model()
    }

    fn periodic_rate(&self) -> Rate {
        self.calculator().periodic_rate()
    }

    fn periodic_payment(&self, repayment_rate: Rate) -> Money {
        self.calculator().periodic_payment(repayment_rate)
    }
}

/// payment that amortizes `principal` over `term_periods` at a fixed rate
///
/// `payment = P * i * (1 + i)^n / ((1 + i)^n - 1)` with `i` the nominal
/// rate divided by `periods_per_year`; degrades to `P / n` when `i` is zero.
pub fn compute_periodic_annuity(
    principal: Money,
    nominal_annual_rate: Rate,
    term_periods: u32,
    periods_per_year: u32,
) -> Result<Money> {
    validate_rate_and_frequency(nominal_annual_rate, periods_per_year)?;
    if term_periods == 0 {
        return Err(FinancingError::invalid("term_periods", "must be positive"));
    }

    let i = nominal_annual_rate.per_period(periods_per_year).as_decimal();

    if i.is_zero() {
        return Ok(principal / Decimal::from(term_periods));
    }

    let compound = compound_factor(i, term_periods)?;
    let numerator = principal
        .as_decimal()
        .checked_mul(i)
        .and_then(|x| x.checked_mul(compound))
        .ok_or_else(|| overflow("annuity numerator"))?;
    let denominator = compound - Decimal::ONE;

    Ok(Money::from_decimal(numerator / denominator))
}

/// (1 + rate)^periods by repeated squaring
fn compound_factor(rate: Decimal, periods: u32) -> Result<Decimal> {
    let mut base = Decimal::ONE + rate;
    let mut factor = Decimal::ONE;
    let mut exponent = periods;

    while exponent > 0 {
        if exponent & 1 == 1 {
            factor = factor
                .checked_mul(base)
                .ok_or_else(|| overflow("compound factor"))?;
        }
        exponent >>= 1;
        // base^(2^k) never exceeds the result, so squaring only overflows when the result would
        if exponent > 0 {
            base = base
                .checked_mul(base)
                .ok_or_else(|| overflow("compound factor"))?;
        }
    }
    Ok(factor)
}

fn overflow(what: &str) -> FinancingError {
    FinancingError::CalculationError {
        message: format!("{} overflows decimal range", what),
    }
}

fn validate_rate_and_frequency(nominal_annual_rate: Rate, periods_per_year: u32) -> Result<()> {
    if nominal_annual_rate.is_negative() {
        return Err(FinancingError::invalid("nominal_annual_rate", "must not be negative"));
    }
    if periods_per_year == 0 {
        return Err(FinancingError::invalid("periods_per_year", "must be positive"));
    }
    Ok(())
}
