// ABOUTME: CLI front end: argument parsing, file I/O, exit-code dispatch

use clap::{Parser, Subcommand};
use loxi::config::EX_USAGE;
use std::path::PathBuf;
use std::process::ExitCode;

/// A tree-walking interpreter for a small dynamically-typed scripting language
#[derive(Parser, Debug)]
#[command(name = "loxi")]
#[command(version)]
#[command(about = "A tree-walking interpreter in the Lox family")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one line per token, then a trailing EOF token
    Tokenize { file: PathBuf },
    /// Parse a single expression and print its pretty form
    Parse { file: PathBuf },
    /// Parse and evaluate a single expression
    Evaluate { file: PathBuf },
    /// Parse and execute a whole program
    Run { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (file, dispatch): (&PathBuf, fn(&str) -> i32) = match &cli.command {
        Command::Tokenize { file } => (file, loxi::run_tokenize),
        Command::Parse { file } => (file, loxi::run_parse),
        Command::Evaluate { file } => (file, loxi::run_evaluate),
        Command::Run { file } => (file, loxi::run_program),
    };

    let source = match std::fs::read_to_string(file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Failed to read {}: {err}", file.display());
            return ExitCode::from(EX_USAGE as u8);
        }
    };

    ExitCode::from(dispatch(&source) as u8)
}
