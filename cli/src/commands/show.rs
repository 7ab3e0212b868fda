use anyhow::{Context, Result};
use pagehash::ExperimentResults;

use crate::commands::report::print_report;
use crate::commands::CommandContext;
use crate::formatter::{format_json, OutputFormat};

pub fn show(ctx: &CommandContext, input: &str, record_counts: &[usize]) -> Result<()> {
    let results = ExperimentResults::load(input)
        .with_context(|| format!("Failed to load results from '{}'", input))?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&serde_json::to_value(&results)?, &ctx.format)?),
        _ => print_report(&results, record_counts),
    }
    Ok(())
}
