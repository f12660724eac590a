// src/cli/run.rs - Execute a test run and inspect stored runs

use std::path::Path;
use std::sync::Arc;

use super::progress::terminal_progress;
use super::project::first_line;
use crate::core::types::RunResult;
use crate::core::TestRunExecutor;
use crate::infra::config::Config;
use crate::infra::errors::QaError;
use crate::provider::ollama::OllamaClient;
use crate::sources;
use crate::store::{ChannelStats, ProjectRegistry, ResultStore};

/// Generate one response per context and persist the run.
pub async fn run_test(
    config: &Config,
    registry: &ProjectRegistry,
    results: ResultStore,
    project: &str,
    prompt_id: &str,
    source: &Path,
) -> anyhow::Result<()> {
    let proj = registry.get_project(project)?;
    let prompt = proj
        .prompt(prompt_id)
        .ok_or_else(|| QaError::not_found("prompt", prompt_id))?;

    let contexts = sources::load_contexts(source)?;
    // Sources used ad hoc are registered so they show up next time.
    registry.add_data_source(project, source)?;

    let client = OllamaClient::new(&config.generation)?;
    eprintln!(
        "Running {} against {} context(s) with {}",
        prompt.id,
        contexts.len(),
        config.generation.model
    );

    let executor = TestRunExecutor::new(Arc::new(client), results);
    let progress = terminal_progress("generate");
    let run = executor
        .run_test(project, &prompt.id, &prompt.text, contexts, Some(&progress))
        .await?;

    println!("Saved {} with {} result(s)", run.run_id, run.len());
    let errors = run.generation_error_count();
    if errors > 0 {
        eprintln!(
            "warning: completed, but {} of {} response(s) indicate upstream failures",
            errors,
            run.len()
        );
    }
    Ok(())
}

pub fn list_runs(results: &ResultStore, project: &str) -> anyhow::Result<()> {
    let runs = results.list(project)?;
    if runs.is_empty() {
        println!("No test runs for '{}'", project);
        return Ok(());
    }
    println!(
        "{:<30} {:<17} {:<12} {:>5}  {:<22} {:<22}",
        "RUN", "TIME", "PROMPT", "TOTAL", "MANUAL", "JUDGE"
    );
    for run in runs {
        println!(
            "{:<30} {:<17} {:<12} {:>5}  {:<22} {:<22}",
            run.run_id,
            run.timestamp.format("%Y-%m-%d %H:%M"),
            run.prompt_id,
            run.stats.total,
            channel_summary(&run.stats.manual),
            channel_summary(&run.stats.judge),
        );
    }
    Ok(())
}

pub fn show_run(results: &ResultStore, project: &str, run_id: &str) -> anyhow::Result<()> {
    let run = results.load(project, run_id)?;
    println!("{} ({}, {})", run.run_id, run.prompt_id, run.timestamp.to_rfc3339());
    if let Some(text) = &run.prompt_text {
        println!("Prompt: {}", first_line(text));
    }
    for (idx, result) in run.results.iter().enumerate() {
        println!();
        print_result(idx, result);
    }
    Ok(())
}

fn print_result(idx: usize, result: &RunResult) {
    println!("#{} context:  {}", idx, first_line(&result.context));
    println!("   response: {}", first_line(&result.model_response));
    let manual = result
        .validations
        .manual
        .as_ref()
        .map_or_else(|| "-".to_string(), |m| m.status.to_string());
    println!("   manual:   {}", manual);
    match &result.validations.judge {
        Some(j) => println!(
            "   judge:    {} ({}) {}",
            if j.status { "valid" } else { "invalid" },
            j.model,
            j.reason
        ),
        None => println!("   judge:    -"),
    }
}

fn channel_summary(stats: &ChannelStats) -> String {
    format!(
        "{:>3.0}% done, {:>3.0}% ok",
        stats.progress, stats.success_rate
    )
}
