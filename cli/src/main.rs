use anyhow::Result;
use clap::{Parser, Subcommand};
use pagehash::core::constants::*;
use pagehash::{ExperimentConfig, ExtendibleOptions, LinearOptions};

mod commands;
mod formatter;
mod utils;

use commands::CommandContext;
use formatter::print_error;

#[derive(Parser)]
#[command(name = "pagehash")]
#[command(author, version, about = "Compare extendible and linear hashing over fixed-capacity pages", long_about = None)]
struct Cli {
    /// Output format: json, table, pretty
    #[arg(short, long, default_value = "pretty", global = true)]
    format: String,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "warn", global = true)]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the comparison over a shared random key permutation
    Run {
        /// Records per page
        #[arg(short, long, default_value_t = DEFAULT_PAGE_CAPACITY)]
        capacity: usize,
        /// Comma separated record counts to sample at
        #[arg(long, default_value = "1000,2000,5000,10000,20000")]
        counts: String,
        /// Comma separated alpha_max values for linear hashing
        #[arg(long, default_value = "0.6,0.75,0.9")]
        alphas: String,
        /// Seed for a reproducible key permutation
        #[arg(long)]
        seed: Option<u64>,
        /// Directory depth at which extendible hashing gives up
        #[arg(long, default_value_t = DEFAULT_MAX_GLOBAL_DEPTH)]
        max_depth: u8,
        /// Write the results JSON to this file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the tables for a previously exported results file
    Show {
        /// Results JSON file
        input: String,
        /// Record counts the samples were taken at
        #[arg(long, default_value = "1000,2000,5000,10000,20000")]
        counts: String,
    },

    /// Fill a single structure and print its metrics
    #[command(subcommand)]
    Inspect(InspectCommands),
}

#[derive(Subcommand)]
enum InspectCommands {
    /// Extendible hashing
    Extendible {
        /// Number of keys to insert
        #[arg(short = 'n', long, default_value_t = 10_000)]
        count: usize,
        #[arg(short, long, default_value_t = DEFAULT_PAGE_CAPACITY)]
        capacity: usize,
        #[arg(long, default_value_t = DEFAULT_MAX_GLOBAL_DEPTH)]
        max_depth: u8,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Linear hashing
    Linear {
        /// Number of keys to insert
        #[arg(short = 'n', long, default_value_t = 10_000)]
        count: usize,
        #[arg(short, long, default_value_t = DEFAULT_PAGE_CAPACITY)]
        capacity: usize,
        #[arg(short, long, default_value_t = DEFAULT_ALPHA_MAX)]
        alpha: f64,
        /// Buckets addressed at level 0
        #[arg(long, default_value_t = DEFAULT_INITIAL_BUCKETS)]
        initial_buckets: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let ctx = CommandContext::new(&cli.format);
    if let Err(err) = execute_command(&ctx, cli.command) {
        print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

fn execute_command(ctx: &CommandContext, command: Commands) -> Result<()> {
    match command {
        Commands::Run { capacity, counts, alphas, seed, max_depth, output } => {
            let config = ExperimentConfig {
                page_capacity: capacity,
                record_counts: utils::parse_list(&counts)?,
                alpha_values: utils::parse_list(&alphas)?,
                seed,
                max_global_depth: max_depth,
            };
            commands::run::run(ctx, &config, output.as_deref())
        }
        Commands::Show { input, counts } => {
            commands::show::show(ctx, &input, &utils::parse_list(&counts)?)
        }
        Commands::Inspect(cmd) => match cmd {
            InspectCommands::Extendible { count, capacity, max_depth, seed } => {
                let options = ExtendibleOptions {
                    page_capacity: capacity,
                    max_global_depth: max_depth,
                };
                commands::inspect::extendible(ctx, options, count, seed)
            }
            InspectCommands::Linear { count, capacity, alpha, initial_buckets, seed } => {
                let options = LinearOptions {
                    page_capacity: capacity,
                    alpha_max: alpha,
                    initial_buckets,
                };
                commands::inspect::linear(ctx, options, count, seed)
            }
        },
    }
}
