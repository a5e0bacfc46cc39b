pub mod amortization;
pub mod annuity;
pub mod extra;
pub mod repayment;

pub use amortization::{generate_schedule, AmortizationSchedule, ScheduleEntry, ScheduleGenerator};
pub use annuity::{
    compute_periodic_annuity, Annuity, AnnuityCalculator, AnnuityModel, CompoundingAnnuity,
    SimplifiedAnnuity,
};
pub use extra::ExtraPaymentPlan;
pub use repayment::RepaymentRatePolicy;
