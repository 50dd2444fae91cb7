//! Shared helper functions for CLI commands

use std::sync::Arc;

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::context::RegisterContext;
use crate::core::identity::EntityId;
use crate::core::project::Project;
use crate::register::RiskRegister;
use crate::store::YamlStore;

/// Resolve the project, build the context from config plus global overrides
/// and return an unloaded register. Callers decide when to refresh.
pub fn open_register(global: &GlobalOpts) -> Result<RiskRegister> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    }
    .map_err(|e| miette::miette!("{}", e))?;

    let config = Config::load();
    let user = global.user.clone().unwrap_or_else(|| config.user());
    let period = global.period.clone().unwrap_or_else(|| config.period());

    let store = Arc::new(YamlStore::new(project.register_dir()));
    Ok(RiskRegister::new(
        store,
        RegisterContext::new(user, period),
    ))
}

/// Refresh the register, degrading read failures to a warning so list views
/// still render what loaded
pub fn refresh_lenient(register: &mut RiskRegister, global: &GlobalOpts) {
    if let Err(e) = register.refresh() {
        if !global.quiet {
            eprintln!("{} {}", style("!").yellow(), e);
        }
    }
}

/// Format an EntityId for display, truncating if too long
pub fn format_short_id(id: &EntityId) -> String {
    let s = id.to_string();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s
    }
}

/// Truncate a string to max_len bytes, adding "..." if truncated. The cut
/// falls on a char boundary so multi-byte text never splits.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let budget = max_len.saturating_sub(3);
    let cut = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= budget)
        .last()
        .unwrap_or(0);
    format!("{}...", &s[..cut])
}

/// Print one entity as YAML or JSON per the requested format (Auto = YAML)
pub fn print_entity<T: Serialize>(entity: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(entity).into_diagnostic()?
            );
        }
        _ => {
            print!("{}", serde_yml::to_string(entity).into_diagnostic()?);
        }
    }
    Ok(())
}

/// Print a list of entities for the structured formats; returns false when
/// the format is tabular and the caller should render rows itself
pub fn print_structured_list<T: Serialize>(
    items: &[T],
    format: OutputFormat,
) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&items).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Print "none found" in a format-aware way
pub fn print_empty(format: OutputFormat, kind: &str, hint: &str) {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
        OutputFormat::Id | OutputFormat::Tsv => {}
        OutputFormat::Auto => {
            println!("No {} found.", kind);
            println!();
            println!("Create one with: {}", style(hint).yellow());
        }
    }
}
