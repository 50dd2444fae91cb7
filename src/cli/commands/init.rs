//! `rrt init` command - create a new project

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::core::project::Project;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    pub path: Option<PathBuf>,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&path).map_err(|e| miette::miette!("{}", e))?;

    let project = Project::init(&path).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Initialized RRT project at {}",
        style("+").green(),
        project.root().display()
    );
    println!();
    println!("Next steps:");
    println!(
        "  Set your register owner and period in {}",
        style(".rrt/config.yaml").yellow()
    );
    println!("  Create a goal with: {}", style("rrt goal new").yellow());
    Ok(())
}
