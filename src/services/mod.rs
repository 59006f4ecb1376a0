pub mod ai;
pub mod availability;
pub mod booking;
pub mod content;
pub mod pricing;
pub mod submitter;
pub mod wizard;
