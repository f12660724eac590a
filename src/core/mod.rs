// src/core/mod.rs - Test run model and execution

pub mod executor;
pub mod run_id;
pub mod timestamp;
pub mod types;

pub use executor::TestRunExecutor;
