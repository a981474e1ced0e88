//! Roadmap command line entry point
//!
//! Loads the catalog (and the completions of `ROADMAP_USER_ID`, if set) and
//! prints it with progress.

use std::path::Path;
use std::process::ExitCode;

use roadmap::{init_logging, open_backend, RoadmapConfig, SyncCoordinator};

fn load_config() -> Result<RoadmapConfig, String> {
    match std::env::var("ROADMAP_CONFIG") {
        Ok(path) => RoadmapConfig::from_file(Path::new(&path)),
        Err(_) => Ok(RoadmapConfig::from_env()),
    }
}

async fn run() -> Result<(), String> {
    let config = load_config()?;
    if let Err(e) = init_logging(&config) {
        eprintln!("Logging disabled: {}", e);
    }

    let backend = open_backend(&config).await?;
    let sync = SyncCoordinator::new(backend);
    let user = std::env::var("ROADMAP_USER_ID").ok().filter(|u| !u.trim().is_empty());
    sync.refresh_all(user.as_deref()).await.map_err(|e| e.to_string())?;

    let progress = sync.progress();
    for entry in sync.catalog().categories().iter() {
        let done = progress
            .category(&entry.category.id)
            .map(|p| p.completed)
            .unwrap_or(0);
        println!(
            "{} {} ({}/{})",
            entry.category.icon,
            entry.category.name,
            done,
            entry.problems.len()
        );
        for problem in &entry.problems {
            let mark = if sync.is_completed(&problem.id) { "x" } else { " " };
            let number = problem
                .leetcode_number
                .map(|n| format!("#{} ", n))
                .unwrap_or_default();
            println!("  [{}] {}{} ({})", mark, number, problem.title, problem.difficulty);
        }
    }

    if user.is_some() {
        println!(
            "\n{}/{} completed ({:.0}%)",
            progress.completed,
            progress.total,
            progress.percent()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
