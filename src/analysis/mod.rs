pub mod rate_lock;
pub mod summary;

pub use rate_lock::{phases_needed, LockPhase, RateLockPlanner};
pub use summary::{CostBreakdown, FinancingSummary};
