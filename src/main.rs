// src/main.rs - promptqa entry point

use clap::Parser;

use promptqa::cli::{self, Cli, Commands};
use promptqa::infra::config::Config;
use promptqa::infra::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logger::init_logging(if cli.verbose { "debug" } else { "warn" });

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Falls back to defaults if no config.toml
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let (registry, results) = cli::open_stores(&config);

    match cli.command {
        Commands::Project { action } => cli::project::run_project(action, &registry, &results),
        Commands::Prompt { action } => cli::project::run_prompt(action, &registry),
        Commands::Source { action } => cli::project::run_source(action, &registry),
        Commands::Run {
            project,
            prompt,
            source,
        } => cli::run::run_test(&config, &registry, results, &project, &prompt, &source).await,
        Commands::Runs { project } => cli::run::list_runs(&results, &project),
        Commands::Show { project, run_id } => cli::run::show_run(&results, &project, &run_id),
        Commands::Mark {
            project,
            run_id,
            index,
            status,
        } => cli::validate::mark(&results, &project, &run_id, index, status),
        Commands::Validate {
            project,
            run_id,
            count,
            start,
        } => cli::validate::validate(&config, &results, &project, &run_id, count, start).await,
    }
}
