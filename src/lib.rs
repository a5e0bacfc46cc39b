pub mod analysis;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod payments;
pub mod plan;
pub mod serialization;
pub mod types;

// re-export key types
pub use analysis::{phases_needed, CostBreakdown, FinancingSummary, LockPhase, RateLockPlanner};
pub use config::{FinancingParameters, GeneratorConfig, DEFAULT_MAX_PERIODS};
pub use decimal::{Money, Rate};
pub use errors::{FinancingError, Result};
pub use events::{EventStore, ScheduleEvent};
pub use payments::{
    compute_periodic_annuity, generate_schedule, AmortizationSchedule, Annuity,
    AnnuityCalculator, AnnuityModel, ExtraPaymentPlan, RepaymentRatePolicy, ScheduleEntry,
    ScheduleGenerator,
};
pub use plan::{FinancingPlan, FinancingPlanBuilder, FinancingReport};
pub use serialization::{PlanView, ScheduleRow};
pub use types::{Granularity, PlanId, Termination};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
