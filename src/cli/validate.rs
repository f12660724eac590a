// src/cli/validate.rs - Manual marking and judge batches

use std::sync::Arc;

use super::progress::terminal_progress;
use crate::core::types::ManualStatus;
use crate::evaluator::ValidationEngine;
use crate::infra::config::Config;
use crate::provider::openai::OpenAiJudge;
use crate::store::ResultStore;

pub fn mark(
    results: &ResultStore,
    project: &str,
    run_id: &str,
    index: usize,
    status: ManualStatus,
) -> anyhow::Result<()> {
    let mut run = results.load(project, run_id)?;
    run.record_manual(index, status)?;
    results.save_validation(project, run_id, &run)?;

    println!("#{} marked {}", index, status);
    match run.next_unvalidated_manual(index + 1) {
        Some(next) => println!("Next unmarked result: #{}", next),
        None => println!("All results from #{} on are marked", index),
    }
    Ok(())
}

pub async fn validate(
    config: &Config,
    results: &ResultStore,
    project: &str,
    run_id: &str,
    count: Option<usize>,
    start: usize,
) -> anyhow::Result<()> {
    let mut run = results.load(project, run_id)?;
    let available = run.unjudged_indices(start).len();
    if available == 0 {
        println!("Nothing to validate: every result from #{} on has a judge verdict", start);
        return Ok(());
    }
    let count = count.unwrap_or(available).clamp(1, available);

    let judge = OpenAiJudge::new(config.judge.clone())?;
    let engine = ValidationEngine::new(Arc::new(judge));
    eprintln!("Judging {} result(s) with {}", count, engine.model());

    let progress = terminal_progress("judge");
    let stats = engine
        .validate_batch_from(&mut run, start, count, Some(&progress))
        .await?;
    results.save_validation(project, run_id, &run)?;

    println!(
        "Validated {}: {} valid, {} invalid ({:.1}% success)",
        stats.validated, stats.success, stats.failed, stats.success_rate
    );
    let remaining = run.unjudged_count();
    if remaining > 0 {
        println!("{} result(s) still unvalidated", remaining);
    }
    Ok(())
}
