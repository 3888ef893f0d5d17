//! Time adjustment parsing, timeline validation and display formatting.

pub mod adjust;
pub mod format;
pub mod timeline;

pub use adjust::{parse_adjustment, TimeAdjustError};
pub use format::{format_duration_ms, format_local_datetime, format_local_time, hours_1dp};
pub use timeline::{check_timeline, Boundary, TimelineError, MAX_BACKDATE_DAYS};
