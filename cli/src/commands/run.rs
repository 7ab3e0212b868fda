use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use pagehash::{generate_keys, run_experiment, ExperimentConfig, ExperimentEvent};
use tracing::info;

use crate::commands::report::print_report;
use crate::commands::CommandContext;
use crate::formatter::{format_json, OutputFormat};

pub fn run(ctx: &CommandContext, config: &ExperimentConfig, output: Option<&str>) -> Result<()> {
    config.validate()?;
    ctx.info(&format!(
        "Comparing extensible vs linear hashing: capacity={}, n={:?}, alpha_max={:?}",
        config.page_capacity, config.record_counts, config.alpha_values
    ));

    let keys = generate_keys(config.max_records(), config.seed);
    info!(keys = keys.len(), seed = ?config.seed, "generated key permutation");

    let total = config.record_counts.len() * (1 + config.alpha_values.len());
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let results = run_experiment(config, &keys, |event| match event {
        ExperimentEvent::SeriesStarted { structure, alpha, .. } => match alpha {
            Some(alpha) => progress.set_message(format!("{} (alpha_max={})", structure, alpha)),
            None => progress.set_message(structure.to_string()),
        },
        ExperimentEvent::Sampled { .. } => progress.inc(1),
    })
    .context("Experiment failed")?;
    progress.finish_and_clear();

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&serde_json::to_value(&results)?, &ctx.format)?),
        _ => print_report(&results, &config.record_counts),
    }

    if let Some(path) = output {
        results
            .save(path)
            .with_context(|| format!("Failed to write results to '{}'", path))?;
        ctx.success(&format!("Results exported to '{}'", path));
    }
    Ok(())
}
