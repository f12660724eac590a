// src/core/run_id.rs - Run identifiers
//
// `run_<YYYYMMDD_HHMMSS>_<6 hex>`: sortable by creation second, with a random
// suffix so two runs started in the same second do not share a file.

use chrono::{DateTime, Local};
use uuid::Uuid;

pub const RUN_ID_PREFIX: &str = "run_";

pub fn new_run_id() -> String {
    run_id_at(Local::now())
}

pub fn run_id_at(at: DateTime<Local>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}_{}",
        RUN_ID_PREFIX,
        at.format("%Y%m%d_%H%M%S"),
        &suffix[..6]
    )
}
