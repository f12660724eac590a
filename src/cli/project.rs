// src/cli/project.rs - Project, prompt and data source commands

use super::{ProjectAction, PromptAction, SourceAction};
use crate::store::{ProjectRegistry, ResultStore};

pub fn run_project(
    action: ProjectAction,
    registry: &ProjectRegistry,
    results: &ResultStore,
) -> anyhow::Result<()> {
    match action {
        ProjectAction::Create { name } => {
            let project = registry.create_project(&name)?;
            println!("Created project '{}'", project.name);
        }
        ProjectAction::List => {
            let projects = registry.load_projects()?;
            if projects.is_empty() {
                println!("No projects yet. Create one with `promptqa project create <name>`.");
            }
            for p in projects {
                println!(
                    "{:<30} {:>3} prompt(s)  {:>3} source(s)  created {}",
                    p.name,
                    p.prompts.len(),
                    p.data_sources.len(),
                    p.created.format("%Y-%m-%d %H:%M")
                );
            }
        }
        ProjectAction::Show { name } => {
            let project = registry.get_project(&name)?;
            println!("{} (created {})", project.name, project.created.to_rfc3339());
            println!();
            println!("Prompts:");
            for prompt in &project.prompts {
                println!("  {:<12} {}", prompt.id, first_line(&prompt.text));
            }
            println!();
            println!("Data sources:");
            for source in &project.data_sources {
                println!(
                    "  [{}] {}  (last used {})",
                    source.kind,
                    source.path,
                    source.last_used.format("%Y-%m-%d %H:%M")
                );
            }
            let runs = results.list(&project.name)?;
            println!();
            println!("Test runs: {}", runs.len());
        }
        ProjectAction::Delete { name } => {
            let removed = registry.delete_project(&name, results)?;
            println!("Deleted project '{}' and {} test run(s)", name, removed);
        }
    }
    Ok(())
}

pub fn run_prompt(action: PromptAction, registry: &ProjectRegistry) -> anyhow::Result<()> {
    match action {
        PromptAction::Add { project, text } => {
            let prompt = registry.add_prompt(&project, &text)?;
            println!("Added {} to '{}'", prompt.id, project);
        }
        PromptAction::Edit { project, id, text } => {
            registry.update_prompt(&project, &id, &text)?;
            println!("Updated {}", id);
        }
        PromptAction::Delete { project, id } => {
            registry.delete_prompt(&project, &id)?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

pub fn run_source(action: SourceAction, registry: &ProjectRegistry) -> anyhow::Result<()> {
    match action {
        SourceAction::Add { project, path } => {
            let source = registry.add_data_source(&project, &path)?;
            println!("Registered {} source {}", source.kind, source.path);
        }
    }
    Ok(())
}

pub(crate) fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}
