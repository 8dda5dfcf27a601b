use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::process;

mod cli;
mod config;
mod picker;
mod project;
mod scanner;
mod ui;
mod utils;

use cli::{Cli, Command};
use config::Config;
use picker::{Picker, PickerSignal};
use ui::InteractiveUI;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Init { path }) = &cli.command {
        cli::print_init_script(path.as_deref());
        return Ok(());
    }

    let mut config = Config::load()?;
    if let Some(path) = &cli.path {
        config.projects_dir = path.clone();
    }

    if !config.projects_dir.exists() {
        eprintln!(
            "{}",
            format!("projects directory not found: {}", config.projects_dir.display()).red()
        );
        eprintln!(
            "configure the path by editing {}",
            Config::config_path()?.display()
        );
        process::exit(1);
    }

    let projects = scanner::scan_projects(&config.projects_dir, false).await?;

    if projects.is_empty() {
        eprintln!(
            "{}",
            format!("no directories found in: {}", config.projects_dir.display()).red()
        );
        eprintln!("create some directories first or configure a different path");
        process::exit(1);
    }

    let picker = Picker::new(projects, &config.recent_dirs);
    let signal = InteractiveUI::new(picker).run()?;

    match signal {
        PickerSignal::Selected(project) => {
            config.record_visit(&project.path, &project.name);
            config.save()?;
            // the one line the wrapping shell function evals
            println!(
                "cd {}",
                utils::shell_single_quote(&project.path.to_string_lossy())
            );
        }
        PickerSignal::CreateNew => {
            eprintln!("{}", "creating directories is not implemented yet".yellow());
        }
        PickerSignal::Cancelled => {}
    }

    Ok(())
}
