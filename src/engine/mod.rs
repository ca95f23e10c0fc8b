//! Change detection and run bookkeeping.

pub mod differ;
pub mod report;

pub use differ::{Decision, diff};
pub use report::RunReport;
