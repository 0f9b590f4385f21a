pub mod trial_lifecycle;
pub mod usage_reporting;
