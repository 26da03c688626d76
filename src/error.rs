// ABOUTME: Error types for the three pipeline phases (scan, parse, evaluate)

use thiserror::Error;

/// A lexical fault recorded during scanning. The scanner accumulates these
/// rather than aborting (§4.1); their presence after a full scan suppresses
/// every downstream phase.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error: {message}")]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

impl ScanError {
    pub fn unexpected_char(line: usize, ch: char) -> Self {
        ScanError {
            line,
            message: format!("Unexpected character: {ch}"),
        }
    }

    pub fn unterminated_string(line: usize) -> Self {
        ScanError {
            line,
            message: "Unterminated string.".to_string(),
        }
    }
}

/// A syntax fault. The parser reports the first one and aborts (§4.2).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", self.render())]
pub struct ParseError {
    pub line: usize,
    /// `None` when the offending token is the synthetic EOF.
    pub lexeme: Option<String>,
    pub message: String,
}

impl ParseError {
    fn render(&self) -> String {
        match &self.lexeme {
            Some(lexeme) => format!("[line {}] Error at '{}': {}", self.line, lexeme, self.message),
            None => format!("[line {}] Error at end: {}", self.line, self.message),
        }
    }
}

/// A runtime fault: type mismatch, arity mismatch, undefined name, or a
/// non-callable call target (§4.3/§7).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}\n[line {line}]")]
pub struct RuntimeError {
    pub line: usize,
    pub message: String,
}

impl RuntimeError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        RuntimeError {
            line,
            message: message.into(),
        }
    }

    pub fn operand_must_be_number(line: usize) -> Self {
        RuntimeError::new(line, "Operand must be a number.")
    }

    pub fn operands_must_be_numbers(line: usize) -> Self {
        RuntimeError::new(line, "Operands must be numbers.")
    }

    pub fn operands_must_be_numbers_or_strings(line: usize) -> Self {
        RuntimeError::new(line, "Operands must be two numbers or two strings.")
    }

    pub fn undefined_variable(line: usize, name: &str) -> Self {
        RuntimeError::new(line, format!("Undefined variable '{name}'."))
    }

    pub fn not_callable(line: usize) -> Self {
        RuntimeError::new(line, "Can only call functions.")
    }

    pub fn arity_mismatch(line: usize, expected: usize, got: usize) -> Self {
        RuntimeError::new(
            line,
            format!("Expected {expected} arguments but got {got}."),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_display() {
        let e = ScanError::unexpected_char(3, '@');
        assert_eq!(format!("{e}"), "[line 3] Error: Unexpected character: @");
    }

    #[test]
    fn unterminated_string_display() {
        let e = ScanError::unterminated_string(5);
        assert_eq!(format!("{e}"), "[line 5] Error: Unterminated string.");
    }

    #[test]
    fn parse_error_display_with_lexeme() {
        let e = ParseError {
            line: 2,
            lexeme: Some(")".to_string()),
            message: "Expect expression.".to_string(),
        };
        assert_eq!(format!("{e}"), "[line 2] Error at ')': Expect expression.");
    }

    #[test]
    fn parse_error_display_at_end() {
        let e = ParseError {
            line: 4,
            lexeme: None,
            message: "Expect ';' after value.".to_string(),
        };
        assert_eq!(
            format!("{e}"),
            "[line 4] Error at end: Expect ';' after value."
        );
    }

    #[test]
    fn runtime_error_display() {
        let e = RuntimeError::undefined_variable(7, "x");
        assert_eq!(format!("{e}"), "Undefined variable 'x'.\n[line 7]");
    }
}
