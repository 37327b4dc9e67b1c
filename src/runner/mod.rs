//! Run orchestration.

pub mod driver;
pub mod plan;

pub use driver::{RunDriver, RunOptions, RunProgress, RunResult};
pub use plan::RunPlan;
