//! `rrt status` command - register dashboard

use console::style;
use miette::Result;

use crate::cli::helpers::{open_register, refresh_lenient};
use crate::cli::GlobalOpts;
use crate::entities::SessionStatus;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {}

pub fn run(_args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    println!(
        "{} {}",
        style("Register context:").bold(),
        style(reg.context()).cyan()
    );
    if !reg.is_loaded() {
        println!("{} some collections failed to load", style("!").yellow());
    }
    println!();

    println!("Goals:            {}", reg.goals().len());
    println!("Potential risks:  {}", reg.potential_risks().len());
    println!("Risk causes:      {}", reg.risk_causes().len());
    println!("Control measures: {}", reg.control_measures().len());

    let unanalyzed = reg
        .risk_causes()
        .iter()
        .filter(|c| c.score().is_none())
        .count();
    if unanalyzed > 0 {
        println!(
            "{} {} cause(s) not yet analyzed",
            style("!").yellow(),
            unanalyzed
        );
    }

    let active_sessions = reg
        .sessions()
        .iter()
        .filter(|s| s.status == SessionStatus::Active)
        .count();
    println!();
    println!(
        "Sessions:         {} ({} active)",
        reg.sessions().len(),
        active_sessions
    );
    println!("Exposure records: {}", reg.exposures().len());
    Ok(())
}
