//! Interactive REPL.

use crate::codec;
use crate::commands::{
    format_conditions, format_position, format_states, format_step,
};
use crate::config::Config;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::path::Path;
use tablefsm_core::{JsonCodec, TransitionEngine};

const HELP_TEXT: &str = r#"
Available commands:
  help                            Show this help

  state                           Show current and previous state
  next, continue                  Follow the Continue transition
  cancel                          Follow the Cancel transition
  apply <condition>               Follow a transition
  peek <condition>                Show where a transition leads without moving

  conditions [state]              Conditions leaving a state (default: current)
  states                          List registered states
  add-state <state>...            Register states
  add-condition <condition>...    Register conditions
  set <src> <cond> <dst> [replace]  Define a transition

  table                           Print the transition table
  load <file>                     Replace the table from a JSON or YAML file
  clear                           Remove all states, conditions and transitions
  reset                           Start over with the default lifecycle

  quit, exit                      Exit the REPL
"#;

pub fn run(mut engine: TransitionEngine, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "tablefsm".bold().cyan());

    let rl_config = rustyline::Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(rl_config)?;

    let history_path = &config.repl.history_file;
    let _ = rl.load_history(history_path);

    println!("Type 'help' for available commands.\n");

    loop {
        let prompt = format!("{} ", format!("{}>", engine.current_state()).cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match execute_repl_command(&mut engine, config, line) {
                    Ok(Some(output)) => println!("{}\n", output),
                    Ok(None) => break, // Exit command
                    Err(e) => println!("{}: {}\n", "Error".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(history_path) {
        tracing::warn!("failed to save history to {}: {}", history_path.display(), e);
    }

    Ok(())
}

fn execute_repl_command(
    engine: &mut TransitionEngine,
    config: &Config,
    line: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.is_empty() {
        return Ok(Some(String::new()));
    }

    let cmd = parts[0].to_lowercase();
    let args = &parts[1..];

    match cmd.as_str() {
        "help" | "?" => Ok(Some(HELP_TEXT.to_string())),

        "quit" | "exit" | "q" => Ok(None),

        "state" | "s" => Ok(Some(format_position(engine))),

        "next" | "continue" | "n" => {
            let from = engine.current_state();
            let to = engine.continue_transition()?;
            Ok(Some(format_step(&from, "Continue", &to)))
        }

        "cancel" => {
            let from = engine.current_state();
            let to = engine.cancel()?;
            Ok(Some(format_step(&from, "Cancel", &to)))
        }

        "apply" | "a" => {
            let Some(condition) = args.first() else {
                return Ok(Some("Usage: apply <condition>".to_string()));
            };
            let from = engine.current_state();
            let to = engine.change_state(condition)?;
            Ok(Some(format_step(&from, condition, &to)))
        }

        "peek" => {
            let Some(condition) = args.first() else {
                return Ok(Some("Usage: peek <condition>".to_string()));
            };
            let to = engine.next_state(condition)?;
            Ok(Some(format_step(&engine.current_state(), condition, &to)))
        }

        "conditions" | "c" => {
            let state = args
                .first()
                .map(|s| s.to_string())
                .unwrap_or_else(|| engine.current_state());
            Ok(Some(format_conditions(
                &state,
                &engine.conditions_from_state(&state),
            )))
        }

        "states" => Ok(Some(format_states(engine))),

        "add-state" => {
            if args.is_empty() {
                return Ok(Some("Usage: add-state <state>...".to_string()));
            }
            engine.add_states(args.iter().copied(), false)?;
            Ok(Some(format!("{} {}", "Added".green(), args.join(", "))))
        }

        "add-condition" => {
            if args.is_empty() {
                return Ok(Some("Usage: add-condition <condition>...".to_string()));
            }
            engine.add_conditions(args.iter().copied(), false)?;
            Ok(Some(format!("{} {}", "Added".green(), args.join(", "))))
        }

        "set" => {
            if args.len() < 3 {
                return Ok(Some(
                    "Usage: set <source> <condition> <target> [replace]".to_string(),
                ));
            }
            let replace = args.get(3).is_some_and(|a| a.eq_ignore_ascii_case("replace"));
            engine.set_transition(args[0], args[1], args[2], replace)?;
            Ok(Some(format!(
                "{} {}",
                "Set".green(),
                format_step(args[0], args[1], args[2])
            )))
        }

        "table" | "t" => Ok(Some(engine.serialize_with(&JsonCodec {
            pretty: config.output.pretty,
        })?)),

        "load" => {
            let Some(path) = args.first() else {
                return Ok(Some("Usage: load <file>".to_string()));
            };
            let description = codec::read_table(Path::new(path))?;
            engine.setup(&description, None, None)?;
            Ok(Some(format!(
                "{} {} transitions from {}",
                "Loaded".green(),
                engine.transition_count(),
                path
            )))
        }

        "clear" => {
            engine.clear();
            Ok(Some("Cleared".yellow().to_string()))
        }

        "reset" => {
            let mut fresh = TransitionEngine::new();
            if let Some(owner) = engine.owner().cloned() {
                fresh = fresh.with_owner(owner);
            }
            *engine = fresh;
            Ok(Some(format_position(engine)))
        }

        _ => Ok(Some(format!(
            "Unknown command: {}. Type 'help' for available commands.",
            cmd
        ))),
    }
}
