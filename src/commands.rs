//! Command execution.

use crate::codec::{self, YamlCodec};
use crate::config::{EngineConfig, OutputConfig};
use crate::{Commands, TableFormat};
use colored::Colorize;
use serde::Serialize;
use tablefsm_core::{JsonCodec, Label, TableCodec, TransitionEngine};

/// Builds the engine described by `config`: the default lifecycle unless a
/// table file is configured.
pub fn build_engine(config: &EngineConfig) -> Result<TransitionEngine, Box<dyn std::error::Error>> {
    let mut engine = TransitionEngine::new();
    if let Some(owner) = config.owner() {
        engine = engine.with_owner(owner);
    }
    if let Some(ref path) = config.table {
        let description = codec::read_table(path)?;
        engine.setup(
            &description,
            config.current_state.as_deref(),
            config.previous_state.as_deref(),
        )?;
    }
    Ok(engine)
}

/// Executes a command and returns the formatted output.
pub fn execute(
    engine: &TransitionEngine,
    cmd: Commands,
    output: &OutputConfig,
) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Repl => unreachable!(),

        Commands::Show { format } => {
            let codec: Box<dyn TableCodec> = match format {
                TableFormat::Json => Box::new(JsonCodec {
                    pretty: output.pretty,
                }),
                TableFormat::Yaml => Box::new(YamlCodec),
            };
            Ok(engine.serialize_with(codec.as_ref())?)
        }

        Commands::States => Ok(format_states(engine)),

        Commands::Conditions { from } => {
            let state = from.unwrap_or_else(|| engine.current_state());
            Ok(format_conditions(&state, &engine.conditions_from_state(&state)))
        }

        Commands::Advance { conditions } => {
            for condition in &conditions {
                let from = engine.current_state();
                let to = engine.change_state(condition)?;
                println!("{}", format_step(&from, condition, &to));
            }
            Ok(format_position(engine))
        }

        Commands::Check => Ok(format!(
            "{} table: {} states, {} conditions, {} transitions (checksum: {})",
            "Valid".green(),
            engine.states().len(),
            engine.conditions().len(),
            engine.transition_count(),
            engine.checksum()?
        )),

        Commands::Snapshot => {
            let snapshot = engine.snapshot()?;
            Ok(format_json(&snapshot, output.pretty))
        }
    }
}

/// Formats one transition as `from --condition--> to`.
pub fn format_step(from: &str, condition: &str, to: &str) -> String {
    format!(
        "{} --{}--> {}",
        from.dimmed(),
        condition.yellow(),
        to.cyan().bold()
    )
}

/// Formats the tracked states.
pub fn format_position(engine: &TransitionEngine) -> String {
    let current = engine.current_state();
    let marker = if engine.is_final_state() {
        " (final)".dimmed().to_string()
    } else if engine.is_initial_state() {
        " (initial)".dimmed().to_string()
    } else {
        String::new()
    };
    format!(
        "current: {}{}\nprevious: {}",
        current.cyan().bold(),
        marker,
        engine.previous_state()
    )
}

pub fn format_states(engine: &TransitionEngine) -> String {
    let current = engine.current_state();
    let lines: Vec<String> = engine
        .states()
        .into_iter()
        .map(|state| {
            if Label::from(state.as_str()).matches(&current) {
                format!("* {}", state.cyan().bold())
            } else {
                format!("  {}", state)
            }
        })
        .collect();
    if lines.is_empty() {
        return "(no states)".dimmed().to_string();
    }
    lines.join("\n")
}

pub fn format_conditions(state: &str, conditions: &[String]) -> String {
    if conditions.is_empty() {
        return format!("{} {}", "No conditions from".dimmed(), state);
    }
    format!("{}: {}", state.cyan(), conditions.join(", "))
}

pub fn format_json<T: Serialize>(value: &T, pretty: bool) -> String {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.unwrap_or_else(|e| format!("<unserializable: {}>", e))
}
