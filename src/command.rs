//! Interactive command parsing
//!
//! One command per input line, parsed with clap in multicall mode so the first
//! word selects the subcommand. Card arguments are the 1-based positions shown
//! as `Short #n`.

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(multicall = true, disable_help_subcommand = true)]
#[command(help_template = "Commands:\n{subcommands}")]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Set the topic without generating
    Topic {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Generate 5 strategies for the given text, or for the current topic
    #[command(visible_alias = "gen")]
    Generate {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Expand or collapse Short #N
    #[command(visible_alias = "toggle")]
    Open {
        #[arg(value_parser = short_number)]
        n: usize,
    },

    /// Generate the thumbnail for Short #N
    #[command(visible_alias = "img")]
    Image {
        #[arg(value_parser = short_number)]
        n: usize,
    },

    /// Retry a failed thumbnail for Short #N
    Retry {
        #[arg(value_parser = short_number)]
        n: usize,
    },

    /// Write the thumbnail of Short #N to PATH
    Save {
        #[arg(value_parser = short_number)]
        n: usize,
        #[arg(required = true, trailing_var_arg = true)]
        path: Vec<String>,
    },

    /// Print the current view
    Show,

    /// Clear topic, results and images
    Reset,

    /// Print this help
    #[command(alias = "?")]
    Help,

    /// Exit
    #[command(visible_aliases = ["exit", "q"])]
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, clap::Error> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(None);
        }

        CommandLine::try_parse_from(words).map(|cli| Some(cli.command))
    }

    /// Joins free-text arguments back into one string; empty when none were given.
    pub fn text(words: &[String]) -> String {
        words.join(" ")
    }

    /// Path argument of `save`, rejoined so paths may contain spaces.
    pub fn path(words: &[String]) -> PathBuf {
        PathBuf::from(words.join(" "))
    }
}

/// Rendered help listing every command.
pub fn help() -> String {
    CommandLine::command().render_help().to_string()
}

fn short_number(raw: &str) -> Result<usize, String> {
    let digits = raw.trim_start_matches('#');
    match digits.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a short number, got '{}'", raw)),
    }
}
