//! kexpand CLI tool.

use clap::{ArgAction, Parser, Subcommand};
use kexpand_core::ValueSources;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "kexpand", version)]
#[command(about = "Expand placeholder tokens in templates", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a template
    Expand {
        /// Template to expand (default: read from stdin)
        template: Option<PathBuf>,
        /// Files containing values to substitute
        #[arg(
            short,
            long = "file",
            value_name = "FILE",
            env = "KEXPAND_FILES",
            value_delimiter = ','
        )]
        files: Vec<PathBuf>,
        /// key=value pairs to substitute
        #[arg(short = 'k', long = "value", value_name = "KEY=VALUE")]
        values: Vec<String>,
        /// Ignore source files that are not found
        #[arg(short, long, env = "KEXPAND_IGNORE_MISSING_FILES")]
        ignore_missing_files: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    // Logs go to stderr; stdout carries only the expanded template
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Expand {
            template,
            files,
            values,
            ignore_missing_files,
        } => {
            let sources = ValueSources {
                files,
                values,
                ignore_missing_files,
            };
            commands::expand::run(
                &sources,
                template.as_deref(),
                std::io::stdin().lock(),
                std::io::stdout().lock(),
            )?;
        }
    }

    Ok(())
}
