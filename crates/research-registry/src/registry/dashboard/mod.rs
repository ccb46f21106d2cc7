mod activity;
mod summary;
pub mod views;

pub use activity::{recent_activity, ACTIVITY_LIMIT};
pub use summary::{utilization_pct, Dashboard};
pub use views::{DashboardSnapshot, ProgressBucket, StatusTally};
