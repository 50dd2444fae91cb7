//! `rrt monitor` command - exposure recording

use console::style;
use dialoguer::Input;
use miette::Result;

use crate::cli::helpers::{
    format_short_id, open_register, print_empty, print_entity, print_structured_list,
    refresh_lenient, truncate_str,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::register::monitoring::{ExposureDraft, MonitoredControlDraft};

#[derive(clap::Subcommand, Debug)]
pub enum MonitorCommands {
    /// Record (or re-record) an exposure for a cause in a session
    Record(RecordArgs),

    /// List exposure records in a session
    List(ListArgs),

    /// Show one exposure record
    Show(ShowArgs),

    /// Delete an exposure record
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct RecordArgs {
    /// Monitoring session ID
    #[arg(long, short = 's')]
    pub session: String,

    /// Risk cause ID
    #[arg(long, short = 'c')]
    pub cause: String,

    /// Observed exposure value
    #[arg(long)]
    pub value: Option<f64>,

    /// Unit of the exposure value
    #[arg(long)]
    pub unit: Option<String>,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Control realization, as CTRL_ID=REALIZATION (repeatable)
    #[arg(long = "control")]
    pub controls: Vec<String>,

    /// Prompt interactively for each of the cause's controls
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Monitoring session ID
    #[arg(long, short = 's')]
    pub session: String,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Session ID
    #[arg(long, short = 's')]
    pub session: String,

    /// Risk cause ID
    #[arg(long, short = 'c')]
    pub cause: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Exposure record ID
    pub id: String,
}

pub fn run(cmd: MonitorCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MonitorCommands::Record(args) => run_record(args, global),
        MonitorCommands::List(args) => run_list(args, global),
        MonitorCommands::Show(args) => run_show(args, global),
        MonitorCommands::Delete(args) => run_delete(args, global),
    }
}

fn parse_control_arg(s: &str) -> Result<MonitoredControlDraft> {
    let (id, realization) = s
        .split_once('=')
        .ok_or_else(|| miette::miette!("expected CTRL_ID=REALIZATION, got '{}'", s))?;
    Ok(MonitoredControlDraft {
        control_measure_id: id.trim().to_string(),
        realization_kci: Some(realization.trim().to_string()),
        ..Default::default()
    })
}

fn run_record(args: RecordArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    let mut controls: Vec<MonitoredControlDraft> = args
        .controls
        .iter()
        .map(|s| parse_control_arg(s))
        .collect::<Result<_>>()?;

    if args.interactive {
        for control in reg
            .controls_for_cause(&args.cause)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
        {
            let prompt = format!(
                "Realization for '{}' (target {})",
                truncate_str(&control.description, 40),
                control.target.as_deref().unwrap_or("-")
            );
            let realization: String = Input::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| miette::miette!("{}", e))?;
            if realization.trim().is_empty() {
                continue;
            }
            controls.push(MonitoredControlDraft {
                control_measure_id: control.id.to_string(),
                realization_kci: Some(realization),
                ..Default::default()
            });
        }
    }

    let exposure = reg
        .record_exposure(
            &args.session,
            &args.cause,
            ExposureDraft {
                exposure_value: args.value,
                exposure_unit: args.unit,
                exposure_notes: args.notes,
                controls,
            },
        )
        .map_err(|e| miette::miette!("{}", e))?;

    if !global.quiet {
        println!(
            "{} Recorded exposure {} ({} control(s))",
            style("+").green(),
            exposure.id,
            exposure.monitored_controls.len()
        );
        for mc in &exposure.monitored_controls {
            let pct = mc
                .performance_percentage
                .map(|p| format!("{}%", p))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {} performance {}",
                format_short_id(&mc.control_measure_id),
                style(pct).cyan()
            );
        }
    } else {
        println!("{}", exposure.id);
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    let exposures: Vec<_> = reg
        .exposures_for_session(&args.session)
        .into_iter()
        .cloned()
        .collect();

    if args.count {
        println!("{}", exposures.len());
        return Ok(());
    }
    if exposures.is_empty() {
        print_empty(global.format, "exposure records", "rrt monitor record");
        return Ok(());
    }
    if print_structured_list(&exposures, global.format)? {
        return Ok(());
    }
    if global.format == OutputFormat::Id {
        for exposure in &exposures {
            println!("{}", exposure.id);
        }
        return Ok(());
    }

    println!("{}", style("ID\tCAUSE\tVALUE\tCONTROLS").bold());
    for exposure in &exposures {
        let value = match (&exposure.exposure_value, &exposure.exposure_unit) {
            (Some(v), Some(u)) => format!("{} {}", v, u),
            (Some(v), None) => v.to_string(),
            _ => "-".to_string(),
        };
        println!(
            "{}\t{}\t{}\t{}",
            format_short_id(&exposure.id),
            format_short_id(&exposure.risk_cause_id),
            value,
            exposure.monitored_controls.len()
        );
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    let exposure = reg
        .exposures()
        .iter()
        .find(|e| {
            e.monitoring_session_id.to_string() == args.session
                && e.risk_cause_id.to_string() == args.cause
        })
        .cloned()
        .ok_or_else(|| {
            miette::miette!(
                "no exposure recorded for cause '{}' in session '{}'",
                args.cause,
                args.session
            )
        })?;
    print_entity(&exposure, global.format)
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    reg.delete_exposure(&args.id)
        .map_err(|e| miette::miette!("{}", e))?;
    if !global.quiet {
        println!("{} Deleted exposure {}", style("-").red(), args.id);
    }
    Ok(())
}
