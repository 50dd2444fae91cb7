//! `rrt control` command - control measure management

use std::str::FromStr;

use chrono::NaiveDate;
use console::style;
use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{
    format_short_id, open_register, print_empty, print_entity, print_structured_list,
    refresh_lenient, truncate_str,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::ControlType;
use crate::register::ControlMeasureUpdate;

#[derive(clap::Subcommand, Debug)]
pub enum ControlCommands {
    /// List control measures
    List(ListArgs),

    /// Create a new control measure under a risk cause
    New(NewArgs),

    /// Show a control measure's details
    Show(ShowArgs),

    /// Update a control measure
    Update(UpdateArgs),

    /// Delete control measures (best-effort across multiple ids)
    Delete(DeleteArgs),

    /// Show recommended control types for a cause
    Guidance(GuidanceArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only controls under this risk cause
    #[arg(long, short = 'c')]
    pub cause: Option<String>,

    /// Filter by type (preventive, mitigating, corrective)
    #[arg(long, short = 't')]
    pub r#type: Option<String>,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Parent risk cause ID
    #[arg(long, short = 'c')]
    pub cause: String,

    /// Control type (preventive, mitigating, corrective)
    #[arg(long, short = 't', default_value = "preventive")]
    pub r#type: String,

    /// What the control does
    #[arg(long, short = 'd')]
    pub description: String,

    /// Key control indicator
    #[arg(long)]
    pub kci: Option<String>,

    /// Target value for the indicator
    #[arg(long)]
    pub target: Option<String>,

    /// Responsible person
    #[arg(long)]
    pub person: Option<String>,

    /// Implementation deadline (YYYY-MM-DD)
    #[arg(long)]
    pub deadline: Option<String>,

    /// Allocated budget
    #[arg(long)]
    pub budget: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Control measure ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Control measure ID
    pub id: String,

    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// New key control indicator
    #[arg(long)]
    pub kci: Option<String>,

    /// New target
    #[arg(long)]
    pub target: Option<String>,

    /// New responsible person
    #[arg(long)]
    pub person: Option<String>,

    /// New deadline (YYYY-MM-DD)
    #[arg(long)]
    pub deadline: Option<String>,

    /// New budget
    #[arg(long)]
    pub budget: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Control measure IDs
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct GuidanceArgs {
    /// Risk cause ID
    pub cause: String,
}

pub fn run(cmd: ControlCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ControlCommands::List(args) => run_list(args, global),
        ControlCommands::New(args) => run_new(args, global),
        ControlCommands::Show(args) => run_show(args, global),
        ControlCommands::Update(args) => run_update(args, global),
        ControlCommands::Delete(args) => run_delete(args, global),
        ControlCommands::Guidance(args) => run_guidance(args, global),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").into_diagnostic()
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    let type_filter = args
        .r#type
        .as_deref()
        .map(ControlType::from_str)
        .transpose()
        .map_err(|e| miette::miette!("{}", e))?;

    let controls: Vec<_> = reg
        .control_measures()
        .iter()
        .filter(|c| {
            args.cause
                .as_deref()
                .map_or(true, |id| c.risk_cause_id.to_string() == id)
        })
        .filter(|c| type_filter.map_or(true, |t| c.control_type == t))
        .cloned()
        .collect();

    if args.count {
        println!("{}", controls.len());
        return Ok(());
    }
    if controls.is_empty() {
        print_empty(global.format, "control measures", "rrt control new");
        return Ok(());
    }
    if print_structured_list(&controls, global.format)? {
        return Ok(());
    }
    if global.format == OutputFormat::Id {
        for control in &controls {
            println!("{}", control.id);
        }
        return Ok(());
    }

    println!("{}", style("CODE\tID\tTYPE\tDESCRIPTION").bold());
    for control in &controls {
        let code = reg
            .control_measure_code(control)
            .map_err(|e| miette::miette!("{}", e))?
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}\t{}\t{}\t{}",
            code,
            format_short_id(&control.id),
            control.control_type,
            truncate_str(&control.description, 48)
        );
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    let control_type =
        ControlType::from_str(&args.r#type).map_err(|e| miette::miette!("{}", e))?;

    let control = reg
        .add_control_measure(&args.cause, control_type, args.description)
        .map_err(|e| miette::miette!("{}", e))?;

    let patch = ControlMeasureUpdate {
        key_control_indicator: args.kci,
        target: args.target,
        responsible_person: args.person,
        deadline: args.deadline.as_deref().map(parse_date).transpose()?,
        budget: args.budget,
        ..Default::default()
    };
    let has_extras = patch.key_control_indicator.is_some()
        || patch.target.is_some()
        || patch.responsible_person.is_some()
        || patch.deadline.is_some()
        || patch.budget.is_some();
    let control = if has_extras {
        reg.update_control_measure(&control.id.to_string(), patch)
            .map_err(|e| miette::miette!("{}", e))?
    } else {
        control
    };

    let code = reg
        .control_measure_code(&control)
        .map_err(|e| miette::miette!("{}", e))?
        .unwrap_or_default();
    if !global.quiet {
        println!(
            "{} Created control measure {} ({})",
            style("+").green(),
            style(&code).cyan(),
            control.id
        );
    } else {
        println!("{}", control.id);
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let reg = open_register(global)?;
    let control = reg
        .get_control_measure(&args.id)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("control measure '{}' not found", args.id))?;
    print_entity(&control, global.format)
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    let control = reg
        .update_control_measure(
            &args.id,
            ControlMeasureUpdate {
                description: args.description,
                key_control_indicator: args.kci,
                target: args.target,
                responsible_person: args.person,
                deadline: args.deadline.as_deref().map(parse_date).transpose()?,
                budget: args.budget,
            },
        )
        .map_err(|e| miette::miette!("{}", e))?;
    if !global.quiet {
        println!("{} Updated {}", style("+").green(), control.id);
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {} control measure(s)?", args.ids.len()))
            .default(false)
            .interact()
            .map_err(|e| miette::miette!("{}", e))?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut failures = 0usize;
    for (id, result) in reg.delete_control_measures(&args.ids) {
        match result {
            Ok(()) => {
                if !global.quiet {
                    println!("{} Deleted {}", style("-").red(), id);
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("{} {}: {}", style("!").yellow(), id, e);
            }
        }
    }
    if failures > 0 {
        return Err(miette::miette!("{} deletion(s) failed", failures));
    }
    Ok(())
}

fn run_guidance(args: GuidanceArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    let guidance = reg
        .guidance_for_cause(&args.cause)
        .map_err(|e| miette::miette!("{}", e))?;

    if guidance.recommended.is_empty() {
        println!("{}", guidance.advice);
        return Ok(());
    }
    let types: Vec<String> = guidance
        .recommended
        .iter()
        .map(|t| format!("{:?}", t).to_lowercase())
        .collect();
    println!("Recommended: {}", style(types.join(", ")).cyan());
    println!("{}", guidance.advice);

    let existing = reg.controls_for_cause(&args.cause);
    if !existing.is_empty() && !global.quiet {
        println!("Existing controls: {}", existing.len());
    }
    Ok(())
}
