// src/lib.rs - Library root for promptqa

pub mod cli;
pub mod core;
pub mod evaluator;
pub mod infra;
pub mod provider;
pub mod sources;
pub mod store;
