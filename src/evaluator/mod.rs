// src/evaluator/mod.rs - Automated validation of model responses

pub mod engine;

pub use engine::{BatchStats, ValidationEngine};
