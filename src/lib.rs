// ABOUTME: Library entry points for the four CLI sub-commands

pub mod ast;
pub mod builtins;
pub mod config;
pub mod env;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod value;

use interpreter::Interpreter;
use parser::Parser;
use scanner::Scanner;

/// `tokenize` sub-command (§6.1): prints one line per token, then the
/// trailing EOF. Lexical errors go to stderr; their presence sets exit 65
/// even though every valid token was still printed.
pub fn run_tokenize(source: &str) -> i32 {
    let (tokens, errors) = Scanner::new(source).scan();

    for token in &tokens {
        println!("{token}");
    }
    for error in &errors {
        eprintln!("{error}");
    }

    if errors.is_empty() {
        config::EX_OK
    } else {
        config::EX_DATAERR
    }
}

/// `parse` sub-command (§6.1): parses a single expression and prints its
/// fully parenthesized prefix form.
pub fn run_parse(source: &str) -> i32 {
    let (tokens, errors) = Scanner::new(source).scan();
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{error}");
        }
        return config::EX_DATAERR;
    }

    match Parser::new(tokens).parse_single_expression() {
        Ok(expr) => {
            println!("{expr}");
            config::EX_OK
        }
        Err(error) => {
            eprintln!("{error}");
            config::EX_DATAERR
        }
    }
}

/// `evaluate` sub-command (§6.1): parses and evaluates a single expression.
pub fn run_evaluate(source: &str) -> i32 {
    let (tokens, errors) = Scanner::new(source).scan();
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{error}");
        }
        return config::EX_DATAERR;
    }

    let expr = match Parser::new(tokens).parse_single_expression() {
        Ok(expr) => expr,
        Err(error) => {
            eprintln!("{error}");
            return config::EX_DATAERR;
        }
    };

    match Interpreter::new().evaluate_expression(&expr) {
        Ok(value) => {
            println!("{value}");
            config::EX_OK
        }
        Err(error) => {
            eprintln!("{error}");
            config::EX_SOFTWARE
        }
    }
}

/// `run` sub-command (§6.1): parses and executes a whole program.
pub fn run_program(source: &str) -> i32 {
    let (tokens, errors) = Scanner::new(source).scan();
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{error}");
        }
        return config::EX_DATAERR;
    }

    let program = match Parser::new(tokens).parse_program() {
        Ok(program) => program,
        Err(error) => {
            eprintln!("{error}");
            return config::EX_DATAERR;
        }
    };

    match Interpreter::new().interpret(&program) {
        Ok(()) => config::EX_OK,
        Err(error) => {
            eprintln!("{error}");
            config::EX_SOFTWARE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_reports_exit_65_on_scan_error() {
        assert_eq!(run_tokenize("@"), config::EX_DATAERR);
    }

    #[test]
    fn tokenize_exits_0_on_clean_source() {
        assert_eq!(run_tokenize("var x = 1;"), config::EX_OK);
    }

    #[test]
    fn parse_exits_65_on_syntax_error() {
        assert_eq!(run_parse("(1 + 2"), config::EX_DATAERR);
    }

    #[test]
    fn parse_exits_0_on_valid_expression() {
        assert_eq!(run_parse("1 + 2"), config::EX_OK);
    }

    #[test]
    fn evaluate_exits_70_on_runtime_error() {
        assert_eq!(run_evaluate("-\"x\""), config::EX_SOFTWARE);
    }

    #[test]
    fn run_exits_0_on_a_well_formed_program() {
        assert_eq!(run_program("print 1 + 2 * 3;"), config::EX_OK);
    }

    #[test]
    fn run_exits_70_on_undefined_variable() {
        assert_eq!(run_program("print x;"), config::EX_SOFTWARE);
    }
}
