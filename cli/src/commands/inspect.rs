use anyhow::{Context, Result};
use pagehash::{generate_keys, ExtendibleHashing, ExtendibleOptions, HashIndex, LinearHashing, LinearOptions};
use serde_json::json;

use crate::commands::CommandContext;
use crate::formatter::format_json;

pub fn extendible(ctx: &CommandContext, options: ExtendibleOptions, count: usize, seed: Option<u64>) -> Result<()> {
    let mut index = ExtendibleHashing::with_options(options)?;
    fill(&mut index, count, seed)?;

    let details = json!({
        "global_depth": index.global_depth(),
        "directory_entries": index.directory_len(),
        "buckets": index.bucket_count(),
    });
    report(ctx, &index, details)
}

pub fn linear(ctx: &CommandContext, options: LinearOptions, count: usize, seed: Option<u64>) -> Result<()> {
    let mut index = LinearHashing::with_options(options)?;
    fill(&mut index, count, seed)?;

    let details = json!({
        "level": index.level(),
        "split_pointer": index.split_pointer(),
        "primary_buckets": index.primary_count(),
        "load_factor": index.load_factor(),
    });
    report(ctx, &index, details)
}

fn fill<I: HashIndex>(index: &mut I, count: usize, seed: Option<u64>) -> Result<()> {
    let keys = generate_keys(count, seed);
    index
        .insert_all(keys)
        .with_context(|| format!("Failed to insert {} keys into {} hashing", count, index.name()))?;
    index.verify().context("Structure failed verification")?;
    Ok(())
}

fn report<I: HashIndex>(ctx: &CommandContext, index: &I, details: serde_json::Value) -> Result<()> {
    let metrics = index.metrics();
    let mut value = json!({
        "structure": index.name(),
        "records": index.len(),
        "space_usage": index.space_usage(),
        "io_cost": metrics.io_cost,
        "page_reads": metrics.page_reads,
        "page_writes": metrics.page_writes,
        "pages_allocated": metrics.pages_allocated,
        "split_triggers": metrics.split_triggers,
        "splits_completed": metrics.splits_completed,
        "directory_doublings": metrics.directory_doublings,
        "level_advances": metrics.level_advances,
        "pages_recycled": metrics.pages_recycled,
        "avg_io_per_insert": metrics.avg_io_per_insert,
    });
    if let (Some(map), serde_json::Value::Object(extra)) = (value.as_object_mut(), details) {
        map.extend(extra);
    }

    println!("{}", format_json(&value, &ctx.format)?);
    ctx.success("Structure verified");
    Ok(())
}
