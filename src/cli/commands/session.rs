//! `rrt session` command - monitoring session management

use chrono::NaiveDate;
use console::style;
use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{
    format_short_id, open_register, print_empty, print_entity, print_structured_list,
    refresh_lenient,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::SessionStatus;
use crate::register::SessionUpdate;

#[derive(clap::Subcommand, Debug)]
pub enum SessionCommands {
    /// List monitoring sessions
    List(ListArgs),

    /// Create a new monitoring session
    New(NewArgs),

    /// Show a session's details
    Show(ShowArgs),

    /// Update a session's name or window
    Update(UpdateArgs),

    /// Mark a session completed
    Complete(IdArgs),

    /// Mark a session cancelled
    Cancel(IdArgs),

    /// Delete a session and its exposure records
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only sessions with this status (active, completed, cancelled)
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Session name ("Q3 review")
    #[arg(long, short = 'n')]
    pub name: String,

    /// First day of the window (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// Last day of the window (YYYY-MM-DD)
    #[arg(long)]
    pub end: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Session ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Session ID
    pub id: String,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// New start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// New end date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Session ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Session ID
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: SessionCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SessionCommands::List(args) => run_list(args, global),
        SessionCommands::New(args) => run_new(args, global),
        SessionCommands::Show(args) => run_show(args, global),
        SessionCommands::Update(args) => run_update(args, global),
        SessionCommands::Complete(args) => run_set_status(args, SessionStatus::Completed, global),
        SessionCommands::Cancel(args) => run_set_status(args, SessionStatus::Cancelled, global),
        SessionCommands::Delete(args) => run_delete(args, global),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").into_diagnostic()
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    let status = args
        .status
        .as_deref()
        .map(str::parse::<SessionStatus>)
        .transpose()
        .map_err(|e| miette::miette!("{}", e))?;

    let sessions: Vec<_> = reg
        .sessions()
        .iter()
        .filter(|s| status.map_or(true, |wanted| s.status == wanted))
        .cloned()
        .collect();

    if args.count {
        println!("{}", sessions.len());
        return Ok(());
    }
    if sessions.is_empty() {
        print_empty(global.format, "monitoring sessions", "rrt session new");
        return Ok(());
    }
    if print_structured_list(&sessions, global.format)? {
        return Ok(());
    }
    if global.format == OutputFormat::Id {
        for session in &sessions {
            println!("{}", session.id);
        }
        return Ok(());
    }

    println!(
        "{}",
        style("ID\tNAME\tWINDOW\tSTATUS\tEXPOSURES").bold()
    );
    for session in &sessions {
        let exposures = reg.exposures_for_session(&session.id.to_string()).len();
        println!(
            "{}\t{}\t{}..{}\t{}\t{}",
            format_short_id(&session.id),
            session.name,
            session.start_date,
            session.end_date,
            session.status,
            exposures
        );
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    let start = parse_date(&args.start)?;
    let end = parse_date(&args.end)?;

    let session = reg
        .add_session(args.name, start, end)
        .map_err(|e| miette::miette!("{}", e))?;
    if !global.quiet {
        println!(
            "{} Created session {} ({})",
            style("+").green(),
            style(&session.name).cyan(),
            session.id
        );
    } else {
        println!("{}", session.id);
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let reg = open_register(global)?;
    let session = reg
        .get_session(&args.id)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("session '{}' not found", args.id))?;
    print_entity(&session, global.format)
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    let session = reg
        .update_session(
            &args.id,
            SessionUpdate {
                name: args.name,
                start_date: args.start.as_deref().map(parse_date).transpose()?,
                end_date: args.end.as_deref().map(parse_date).transpose()?,
                status: None,
            },
        )
        .map_err(|e| miette::miette!("{}", e))?;
    if !global.quiet {
        println!("{} Updated session {}", style("+").green(), session.name);
    }
    Ok(())
}

fn run_set_status(args: IdArgs, status: SessionStatus, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    let session = reg
        .update_session(
            &args.id,
            SessionUpdate {
                status: Some(status),
                ..Default::default()
            },
        )
        .map_err(|e| miette::miette!("{}", e))?;
    if !global.quiet {
        println!(
            "{} Session {} is now {}",
            style("+").green(),
            session.name,
            session.status
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    if !args.yes {
        let exposures = reg.exposures_for_session(&args.id).len();
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete this session and its {} exposure record(s)?",
                exposures
            ))
            .default(false)
            .interact()
            .map_err(|e| miette::miette!("{}", e))?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    reg.delete_session(&args.id)
        .map_err(|e| miette::miette!("{}", e))?;
    if !global.quiet {
        println!("{} Deleted session {}", style("-").red(), args.id);
    }
    Ok(())
}
