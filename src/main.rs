//! tablefsm - Command-line front end for the transition engine
//!
//! Loads a transition table (or the default lifecycle), then runs one-shot
//! commands or an interactive REPL against it.

mod codec;
mod commands;
mod config;
mod repl;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tablefsm")]
#[command(about = "Finite state machine over a runtime transition table")]
#[command(version)]
struct Cli {
    /// YAML config file
    #[arg(short, long, env = "TABLEFSM_CONFIG")]
    config: Option<PathBuf>,

    /// Transition table file (.json, .yaml or .yml)
    #[arg(short, long)]
    table: Option<PathBuf>,

    /// Current state after loading the table
    #[arg(long)]
    current_state: Option<String>,

    /// Previous state after loading the table
    #[arg(long)]
    previous_state: Option<String>,

    /// Tenant of the tracked entity
    #[arg(long)]
    tenant_id: Option<String>,

    /// User owning the tracked entity
    #[arg(long)]
    user_id: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    /// Applies command-line flags on top of `config`.
    fn apply_to(&self, config: &mut Config) {
        if let Some(ref table) = self.table {
            config.engine.table = Some(table.clone());
        }
        if let Some(ref state) = self.current_state {
            config.engine.current_state = Some(state.clone());
        }
        if let Some(ref state) = self.previous_state {
            config.engine.previous_state = Some(state.clone());
        }
        if let Some(ref tenant) = self.tenant_id {
            config.engine.tenant_id = Some(tenant.clone());
        }
        if let Some(ref user) = self.user_id {
            config.engine.user_id = Some(user.clone());
        }
        if self.no_color {
            config.output.color = false;
        }
        if self.pretty {
            config.output.pretty = true;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive REPL
    Repl,

    /// Print the transition table
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = TableFormat::Json)]
        format: TableFormat,
    },

    /// List registered states
    States,

    /// List conditions leaving a state
    Conditions {
        /// State to inspect (default: current state)
        #[arg(long)]
        from: Option<String>,
    },

    /// Apply conditions in order, stopping at the first failure
    Advance {
        /// Conditions to apply
        #[arg(required = true)]
        conditions: Vec<String>,
    },

    /// Load the table and print a summary
    Check,

    /// Print a JSON snapshot of the engine
    Snapshot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TableFormat {
    Json,
    Yaml,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    };
    if let Some(ref path) = cli.config {
        tracing::debug!("loaded config from {}", path.display());
    }
    cli.apply_to(&mut config);

    if let Err(e) = config.validate() {
        eprintln!("{}: {}", "Error".red(), e);
        std::process::exit(1);
    }
    if !config.output.color {
        colored::control::set_override(false);
    }

    let engine = match commands::build_engine(&config.engine) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    };

    match cli.command {
        None | Some(Commands::Repl) => {
            repl::run(engine, &config)?;
        }
        Some(cmd) => match commands::execute(&engine, cmd, &config.output) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("{}: {}", "Error".red(), e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
