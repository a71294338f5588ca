//! raya-box command-line tool
//!
//! Derives blueprints for the realm builtins, boxes literals with them and
//! shows the active configuration.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use raya_box::{BoxConfig, CONFIG_FILE_NAME};
use std::path::PathBuf;

use commands::boxing::BoxArgs;
use commands::Context;

#[derive(Parser)]
#[command(name = "raya-box")]
#[command(about = "Derive, box and inspect native value types", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./raya-box.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Color output: auto, always, never (overrides the config file)
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive a blueprint for a builtin and print its entries
    Inspect {
        /// Builtin constructor name (e.g. Number)
        builtin: String,
        /// Print the blueprint summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Box a literal with a builtin's derived blueprint
    Box {
        /// Builtin constructor name (e.g. Number)
        builtin: String,
        /// Literal to box: a number, true/false, or a string
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// Call the boxed type instead of constructing it
        #[arg(long)]
        bare: bool,
        /// Invoke a method on the boxed value: METHOD [ARGS...]
        #[arg(long, num_args = 1.., allow_hyphen_values = true, value_name = "METHOD")]
        call: Vec<String>,
        /// Summarize installation failures instead of printing them
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show version, builtins and configuration
    Info,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir()?;
    let config = BoxConfig::discover(cli.config.as_deref(), &cwd)?;
    let config_path = cli.config.clone().or_else(|| {
        let candidate = cwd.join(CONFIG_FILE_NAME);
        candidate.is_file().then_some(candidate)
    });

    if let Some(color) = cli.color.as_deref() {
        if !matches!(color, "auto" | "always" | "never") {
            anyhow::bail!("Invalid --color value '{}'. Must be one of auto, always, never", color);
        }
    }
    let choice = output::resolve_color_choice(Some(
        cli.color.as_deref().unwrap_or(config.report.choice.as_str()),
    ));

    let ctx = Context {
        config,
        config_path,
        choice,
    };

    match cli.command {
        Commands::Inspect { builtin, json } => commands::inspect::execute(&ctx, &builtin, json),
        Commands::Box {
            builtin,
            value,
            bare,
            call,
            quiet,
        } => commands::boxing::execute(
            &ctx,
            BoxArgs {
                builtin,
                value,
                bare,
                call,
                quiet,
            },
        ),
        Commands::Info => commands::info::execute(&ctx),
    }
}
