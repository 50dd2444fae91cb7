//! `rrt cause` command - risk cause management and analysis

use std::str::FromStr;

use console::style;
use dialoguer::Confirm;
use miette::Result;

use crate::cli::helpers::{
    format_short_id, open_register, print_empty, print_entity, print_structured_list,
    refresh_lenient, truncate_str,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::RiskSource;
use crate::register::RiskCauseUpdate;
use crate::scoring::{Impact, Likelihood};
use crate::suggest::{CsvSuggestionSource, SuggestionSource};

#[derive(clap::Subcommand, Debug)]
pub enum CauseCommands {
    /// List risk causes
    List(ListArgs),

    /// Create a new risk cause under a potential risk
    New(NewArgs),

    /// Show a risk cause's details
    Show(ShowArgs),

    /// Update a risk cause
    Update(UpdateArgs),

    /// Record likelihood and impact, showing score and control guidance
    Analyze(AnalyzeArgs),

    /// Delete risk causes (best-effort across multiple ids)
    Delete(DeleteArgs),

    /// Import causes from a suggestion catalog
    Import(ImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only causes under this potential risk
    #[arg(long, short = 'r')]
    pub risk: Option<String>,

    /// Only causes not yet analyzed
    #[arg(long)]
    pub unanalyzed: bool,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Parent potential risk ID
    #[arg(long, short = 'r')]
    pub risk: String,

    /// Cause description
    #[arg(long, short = 'd')]
    pub description: String,

    /// Cause origin (internal or external)
    #[arg(long, short = 's', default_value = "internal")]
    pub source: String,

    /// Key risk indicator
    #[arg(long)]
    pub kri: Option<String>,

    /// Tolerated deviation for the indicator
    #[arg(long)]
    pub tolerance: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Risk cause ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Risk cause ID
    pub id: String,

    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// New origin (internal or external)
    #[arg(long, short = 's')]
    pub source: Option<String>,

    /// New key risk indicator
    #[arg(long)]
    pub kri: Option<String>,

    /// New tolerance
    #[arg(long)]
    pub tolerance: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Risk cause ID
    pub id: String,

    /// Likelihood (very_low/low/medium/high/very_high or 1-5)
    #[arg(long, short = 'l')]
    pub likelihood: String,

    /// Impact (very_low/low/medium/high/very_high or 1-5)
    #[arg(long, short = 'i')]
    pub impact: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Risk cause IDs
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Parent potential risk ID
    #[arg(long, short = 'r')]
    pub risk: String,

    /// CSV catalog path (description,category,source)
    #[arg(long)]
    pub catalog: std::path::PathBuf,

    /// Topic to filter suggestions by
    #[arg(long, short = 't', default_value = "")]
    pub topic: String,

    /// Maximum number of suggestions to import
    #[arg(long, short = 'n', default_value = "10")]
    pub count: usize,
}

pub fn run(cmd: CauseCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CauseCommands::List(args) => run_list(args, global),
        CauseCommands::New(args) => run_new(args, global),
        CauseCommands::Show(args) => run_show(args, global),
        CauseCommands::Update(args) => run_update(args, global),
        CauseCommands::Analyze(args) => run_analyze(args, global),
        CauseCommands::Delete(args) => run_delete(args, global),
        CauseCommands::Import(args) => run_import(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    let causes: Vec<_> = reg
        .risk_causes()
        .iter()
        .filter(|c| {
            args.risk
                .as_deref()
                .map_or(true, |r| c.potential_risk_id.to_string() == r)
        })
        .filter(|c| !args.unanalyzed || c.score().is_none())
        .cloned()
        .collect();

    if args.count {
        println!("{}", causes.len());
        return Ok(());
    }
    if causes.is_empty() {
        print_empty(global.format, "risk causes", "rrt cause new");
        return Ok(());
    }
    if print_structured_list(&causes, global.format)? {
        return Ok(());
    }
    if global.format == OutputFormat::Id {
        for cause in &causes {
            println!("{}", cause.id);
        }
        return Ok(());
    }

    println!(
        "{}",
        style("CODE\tID\tSCORE\tLEVEL\tDESCRIPTION").bold()
    );
    for cause in &causes {
        let code = reg
            .risk_cause_code(cause)
            .map_err(|e| miette::miette!("{}", e))?
            .unwrap_or_else(|| "-".to_string());
        let score = cause
            .score()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let level = cause
            .risk_level()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}\t{}\t{}\t{}\t{}",
            code,
            format_short_id(&cause.id),
            score,
            level,
            truncate_str(&cause.description, 48)
        );
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    let source = RiskSource::from_str(&args.source).map_err(|e| miette::miette!("{}", e))?;

    let cause = reg
        .add_risk_cause(&args.risk, args.description, source)
        .map_err(|e| miette::miette!("{}", e))?;
    let cause = if args.kri.is_some() || args.tolerance.is_some() {
        reg.update_risk_cause(
            &cause.id.to_string(),
            RiskCauseUpdate {
                key_risk_indicator: args.kri,
                risk_tolerance: args.tolerance,
                ..Default::default()
            },
        )
        .map_err(|e| miette::miette!("{}", e))?
    } else {
        cause
    };

    let code = reg
        .risk_cause_code(&cause)
        .map_err(|e| miette::miette!("{}", e))?
        .unwrap_or_default();
    if !global.quiet {
        println!(
            "{} Created risk cause {} ({})",
            style("+").green(),
            style(&code).cyan(),
            cause.id
        );
    } else {
        println!("{}", cause.id);
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let reg = open_register(global)?;
    let cause = reg
        .get_risk_cause(&args.id)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("risk cause '{}' not found", args.id))?;
    print_entity(&cause, global.format)
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    let source = args
        .source
        .as_deref()
        .map(RiskSource::from_str)
        .transpose()
        .map_err(|e| miette::miette!("{}", e))?;

    let cause = reg
        .update_risk_cause(
            &args.id,
            RiskCauseUpdate {
                description: args.description,
                source,
                key_risk_indicator: args.kri,
                risk_tolerance: args.tolerance,
            },
        )
        .map_err(|e| miette::miette!("{}", e))?;
    if !global.quiet {
        println!("{} Updated {}", style("+").green(), cause.id);
    }
    Ok(())
}

fn run_analyze(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;

    let likelihood =
        Likelihood::from_str(&args.likelihood).map_err(|e| miette::miette!("{}", e))?;
    let impact = Impact::from_str(&args.impact).map_err(|e| miette::miette!("{}", e))?;

    let cause = reg
        .analyze_risk_cause(&args.id, likelihood, impact)
        .map_err(|e| miette::miette!("{}", e))?;

    let score = cause.score().unwrap_or(0);
    let level = cause.risk_level();
    let guidance = reg
        .guidance_for_cause(&args.id)
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "Score: {}  Level: {}",
        style(score).cyan(),
        style(
            level
                .map(|l| l.to_string())
                .unwrap_or_else(|| "-".to_string())
        )
        .cyan()
    );
    println!("{}", guidance.advice);
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} risk cause(s) with their controls and exposures?",
                args.ids.len()
            ))
            .default(false)
            .interact()
            .map_err(|e| miette::miette!("{}", e))?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut failures = 0usize;
    for (id, result) in reg.delete_risk_causes(&args.ids) {
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

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;

    let source = CsvSuggestionSource::new(&args.catalog);
    let suggestions = source
        .suggest(&args.topic, args.count)
        .map_err(|e| miette::miette!("{}", e))?;
    if suggestions.is_empty() {
        println!("No suggestions matched '{}'.", args.topic);
        return Ok(());
    }

    let results = reg.import_risk_causes(&args.risk, suggestions);
    let imported = results.iter().filter(|r| r.is_ok()).count();
    let failures = results.len() - imported;
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        eprintln!("{} {}", style("!").yellow(), err);
    }
    if !global.quiet {
        println!(
            "{} Imported {} cause(s), {} failed",
            style("+").green(),
            imported,
            failures
        );
    }
    Ok(())
}
