//! Usage accounting. [tracker::UsageTracker] holds the daily total, [module::TrackingModule] feeds
//! it on a fixed schedule.

pub mod module;
pub mod schedule;
pub mod suspend;
pub mod tracker;
