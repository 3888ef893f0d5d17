//! Business logic services.
//!
//! Services contain the core state machine and aggregation logic,
//! separated from command handlers. They own record persistence,
//! transition validation and statistics.

pub mod fasting;
pub mod stats;

pub use fasting::{FastingError, FastingService};
pub use stats::{
    last_fast, month_start, monthly_stats, recent_fasts, week_start, weekly_stats, FastStatistics,
};
