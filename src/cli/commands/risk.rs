//! `rrt risk` command - potential risk management

use std::str::FromStr;

use console::style;
use dialoguer::Confirm;
use miette::Result;

use crate::cli::helpers::{
    format_short_id, open_register, print_empty, print_entity, print_structured_list,
    refresh_lenient, truncate_str,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::RiskCategory;
use crate::register::PotentialRiskUpdate;
use crate::suggest::{CsvSuggestionSource, SuggestionSource};

#[derive(clap::Subcommand, Debug)]
pub enum RiskCommands {
    /// List potential risks
    List(ListArgs),

    /// Create a new potential risk under a goal
    New(NewArgs),

    /// Show a potential risk's details
    Show(ShowArgs),

    /// Update a potential risk
    Update(UpdateArgs),

    /// Delete potential risks (best-effort across multiple ids)
    Delete(DeleteArgs),

    /// Import risks from a suggestion catalog
    Import(ImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only risks under this goal
    #[arg(long, short = 'g')]
    pub goal: Option<String>,

    /// Filter by category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Parent goal ID
    #[arg(long, short = 'g')]
    pub goal: String,

    /// What could go wrong
    #[arg(long, short = 'd')]
    pub description: String,

    /// Risk category (policy, legal, reputation, compliance, financial, fraud, operational)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Risk owner
    #[arg(long)]
    pub owner: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Potential risk ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Potential risk ID
    pub id: String,

    /// New description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// New category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// New owner
    #[arg(long)]
    pub owner: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Potential risk IDs
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Parent goal ID
    #[arg(long, short = 'g')]
    pub goal: String,

    /// CSV catalog path (description,category,source)
    #[arg(long)]
    pub catalog: std::path::PathBuf,

    /// Topic to filter suggestions by (substring match)
    #[arg(long, short = 't', default_value = "")]
    pub topic: String,

    /// Maximum number of suggestions to import
    #[arg(long, short = 'n', default_value = "10")]
    pub count: usize,
}

pub fn run(cmd: RiskCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        RiskCommands::List(args) => run_list(args, global),
        RiskCommands::New(args) => run_new(args, global),
        RiskCommands::Show(args) => run_show(args, global),
        RiskCommands::Update(args) => run_update(args, global),
        RiskCommands::Delete(args) => run_delete(args, global),
        RiskCommands::Import(args) => run_import(args, global),
    }
}

fn parse_category(s: &str) -> Result<RiskCategory> {
    RiskCategory::from_str(s).map_err(|e| miette::miette!("{}", e))
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    let category = args
        .category
        .as_deref()
        .map(parse_category)
        .transpose()?;

    let risks: Vec<_> = reg
        .potential_risks()
        .iter()
        .filter(|r| {
            args.goal
                .as_deref()
                .map_or(true, |g| r.goal_id.to_string() == g)
        })
        .filter(|r| category.is_none() || r.category == category)
        .cloned()
        .collect();

    if args.count {
        println!("{}", risks.len());
        return Ok(());
    }
    if risks.is_empty() {
        print_empty(global.format, "potential risks", "rrt risk new");
        return Ok(());
    }
    if print_structured_list(&risks, global.format)? {
        return Ok(());
    }
    if global.format == OutputFormat::Id {
        for risk in &risks {
            println!("{}", risk.id);
        }
        return Ok(());
    }

    println!("{}", style("CODE\tID\tCATEGORY\tDESCRIPTION").bold());
    for risk in &risks {
        let code = reg
            .potential_risk_code(risk)
            .map_err(|e| miette::miette!("{}", e))?
            .unwrap_or_else(|| "-".to_string());
        let category = risk
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}\t{}\t{}\t{}",
            code,
            format_short_id(&risk.id),
            category,
            truncate_str(&risk.description, 56)
        );
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    let risk = reg
        .add_potential_risk(&args.goal, args.description)
        .map_err(|e| miette::miette!("{}", e))?;

    let patch = PotentialRiskUpdate {
        category: args.category.as_deref().map(parse_category).transpose()?,
        owner: args.owner,
        ..Default::default()
    };
    let risk = if patch.category.is_some() || patch.owner.is_some() {
        reg.update_potential_risk(&risk.id.to_string(), patch)
            .map_err(|e| miette::miette!("{}", e))?
    } else {
        risk
    };

    let code = reg
        .potential_risk_code(&risk)
        .map_err(|e| miette::miette!("{}", e))?
        .unwrap_or_default();
    if !global.quiet {
        println!(
            "{} Created potential risk {} ({})",
            style("+").green(),
            style(&code).cyan(),
            risk.id
        );
    } else {
        println!("{}", risk.id);
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let reg = open_register(global)?;
    let risk = reg
        .get_potential_risk(&args.id)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("potential risk '{}' not found", args.id))?;
    print_entity(&risk, global.format)
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    let patch = PotentialRiskUpdate {
        description: args.description,
        category: args.category.as_deref().map(parse_category).transpose()?,
        owner: args.owner,
    };
    let risk = reg
        .update_potential_risk(&args.id, patch)
        .map_err(|e| miette::miette!("{}", e))?;
    if !global.quiet {
        println!("{} Updated {}", style("+").green(), risk.id);
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut reg = open_register(global)?;
    refresh_lenient(&mut reg, global);

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} potential risk(s) with all their causes, controls and exposures?",
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

    let results = reg.delete_potential_risks(&args.ids);
    let mut failures = 0usize;
    for (id, result) in results {
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

    let results = reg.import_potential_risks(&args.goal, suggestions);
    let mut imported = 0usize;
    let mut failures = 0usize;
    for result in results {
        match result {
            Ok(risk) => {
                imported += 1;
                if global.verbose {
                    println!(
                        "{} {}",
                        style("+").green(),
                        truncate_str(&risk.description, 64)
                    );
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("{} {}", style("!").yellow(), e);
            }
        }
    }
    if !global.quiet {
        println!(
            "{} Imported {} risk(s), {} failed",
            style("+").green(),
            imported,
            failures
        );
    }
    Ok(())
}
