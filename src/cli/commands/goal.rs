//! `rrt goal` command - goal management

use console::style;
use dialoguer::{Confirm, Input};
use miette::Result;

use crate::cli::helpers::{format_short_id, open_register, print_entity, print_structured_list, print_empty, refresh_lenient, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::register::GoalUpdate;

#[derive(clap::Subcommand, Debug)]
pub enum GoalCommands {
    /// List goals for the active context
    List(ListArgs),

    /// Create a new goal
    New(NewArgs),

    /// Show a goal's details
    Show(ShowArgs),

    /// Update a goal's name or description
    Update(UpdateArgs),

    /// Delete a goal and its whole subtree
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Short goal name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Detailed description
    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Goal ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Goal ID
    pub id: String,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Goal ID
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: GoalCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        GoalCommands::List(args) => run_list(args, global),
        GoalCommands::New(args) => run_new(args, global),
        GoalCommands::Show(args) => run_show(args, global),
        GoalCommands::Update(args) => run_update(args, global),
        GoalCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    let goals = reg.goals();
    if args.count {
        println!("{}", goals.len());
        return Ok(());
    }
    if goals.is_empty() {
        print_empty(global.format, "goals", "rrt goal new");
        return Ok(());
    }
    if print_structured_list(goals, global.format)? {
        return Ok(());
    }
    if global.format == OutputFormat::Id {
        for goal in goals {
            println!("{}", goal.id);
        }
        return Ok(());
    }

    println!("{}", style("CODE\tID\tNAME\tRISKS").bold());
    for goal in goals {
        let risk_count = reg.risks_for_goal(&goal.id.to_string()).len();
        println!(
            "{}\t{}\t{}\t{}",
            goal.code,
            format_short_id(&goal.id),
            truncate_str(&goal.name, 48),
            risk_count
        );
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;

    let name = match args.name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Goal name")
            .interact_text()
            .map_err(|e| miette::miette!("{}", e))?,
    };
    let description = match args.description {
        Some(description) => description,
        None => Input::new()
            .with_prompt("Description")
            .interact_text()
            .map_err(|e| miette::miette!("{}", e))?,
    };

    let goal = reg
        .add_goal(name, description)
        .map_err(|e| miette::miette!("{}", e))?;

    if !global.quiet {
        println!(
            "{} Created goal {} ({})",
            style("+").green(),
            style(&goal.code).cyan(),
            goal.id
        );
    } else {
        println!("{}", goal.id);
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let reg = open_register(global)?;
    let goal = reg
        .get_goal(&args.id)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("goal '{}' not found", args.id))?;
    print_entity(&goal, global.format)
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    let goal = reg
        .update_goal(
            &args.id,
            GoalUpdate {
                name: args.name,
                description: args.description,
            },
        )
        .map_err(|e| miette::miette!("{}", e))?;

    if !global.quiet {
        println!("{} Updated goal {}", style("+").green(), goal.code);
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    if !args.yes {
        let risk_count = reg.risks_for_goal(&args.id).len();
        let prompt = format!(
            "Delete this goal and its {} potential risk(s) with all their causes, controls and exposures?",
            risk_count
        );
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| miette::miette!("{}", e))?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    reg.delete_goal(&args.id)
        .map_err(|e| miette::miette!("{}", e))?;
    if !global.quiet {
        println!("{} Deleted goal {}", style("-").red(), args.id);
    }
    Ok(())
}
