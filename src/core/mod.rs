pub mod approval;
pub mod calendar;
pub mod dashboard;
pub mod eligibility;
pub mod guard;
pub mod live;
pub mod log;
pub mod regularize;
pub mod tracker;
pub mod view;
