// ABOUTME: Recursive-descent parser over the token stream (§4.2)

use crate::ast::{Expr, FunctionDecl, LitValue, Stmt};
use crate::error::ParseError;
use crate::token::{Literal, Token, TokenKind};
use std::rc::Rc;

/// Grammar ceiling on function parameters and call arguments (§4.2).
pub const MAX_ARGS: usize = 127;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    function_depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            current: 0,
            function_depth: 0,
        }
    }

    /// `program → declaration* EOF`
    pub fn parse_program(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.declaration()?);
        }
        Ok(statements)
    }

    /// Entry point for the `parse`/`evaluate` sub-commands, which operate on
    /// a single bare expression rather than a whole program (§6.1).
    pub fn parse_single_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.expression()?;
        Ok(expr)
    }

    fn declaration(&mut self) -> Result<Stmt, ParseError> {
        if self.match_kind(&[TokenKind::Var]) {
            self.var_declaration()
        } else if self.check(TokenKind::Fun) && self.check_next(TokenKind::Identifier) {
            self.advance();
            self.function_declaration()
        } else {
            self.statement()
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;
        let initializer = if self.match_kind(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var { name, initializer })
    }

    fn function_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenKind::Identifier, "Expect function name.")?;
        let (params, body) = self.function_tail()?;
        Ok(Stmt::Function(Rc::new(FunctionDecl {
            name: name.lexeme,
            params,
            body,
        })))
    }

    /// Shared `"(" params? ")" block` tail for both `fun NAME(...)` declarations
    /// and anonymous `fun(...)` expressions.
    fn function_tail(&mut self) -> Result<(Vec<Token>, Vec<Stmt>), ParseError> {
        self.consume(TokenKind::LeftParen, "Expect '(' after function name.")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    return Err(self.error_at_current(&format!(
                        "Can't have more than {MAX_ARGS} parameters."
                    )));
                }
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
                if !self.match_kind(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;
        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.")?;
        self.function_depth += 1;
        let body = self.block();
        self.function_depth -= 1;
        Ok((params, body?))
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.match_kind(&[TokenKind::Print]) {
            self.print_statement()
        } else if self.match_kind(&[TokenKind::LeftBrace]) {
            Ok(Stmt::Block(self.block()?))
        } else if self.match_kind(&[TokenKind::If]) {
            self.if_statement()
        } else if self.match_kind(&[TokenKind::While]) {
            self.while_statement()
        } else if self.match_kind(&[TokenKind::For]) {
            self.for_statement()
        } else if self.match_kind(&[TokenKind::Return]) {
            self.return_statement()
        } else {
            self.expression_statement()
        }
    }

    fn print_statement(&mut self) -> Result<Stmt, ParseError> {
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.previous();
        if self.function_depth == 0 {
            return Err(ParseError {
                line: keyword.line,
                lexeme: Some(keyword.lexeme),
                message: "Can't return from top-level code.".to_string(),
            });
        }
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_kind(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    /// Desugars `for (init; cond; update) body` into
    /// `{ init; while (cond) { body; update; } }` (§4.2).
    fn for_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.match_kind(&[TokenKind::Semicolon]) {
            None
        } else if self.check(TokenKind::Var) {
            self.advance();
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(TokenKind::Semicolon) {
            Expr::Literal(LitValue::Bool(true))
        } else {
            self.expression()?
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.logic_or()?;

        if self.match_kind(&[TokenKind::Equal]) {
            let equals = self.previous();
            let value = self.assignment()?;

            if let Expr::Variable(name) = expr {
                return Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                });
            }

            return Err(ParseError {
                line: equals.line,
                lexeme: Some(equals.lexeme),
                message: "Invalid assignment target.".to_string(),
            });
        }

        Ok(expr)
    }

    fn logic_or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.logic_and()?;
        while self.match_kind(&[TokenKind::Or]) {
            let op = self.previous();
            let right = self.logic_and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;
        while self.match_kind(&[TokenKind::And]) {
            let op = self.previous();
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;
        while self.match_kind(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
            let op = self.previous();
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        while self.match_kind(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let op = self.previous();
            let right = self.term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;
        while self.match_kind(&[TokenKind::Plus, TokenKind::Minus]) {
            let op = self.previous();
            let right = self.factor()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        while self.match_kind(&[TokenKind::Star, TokenKind::Slash]) {
            let op = self.previous();
            let right = self.unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.match_kind(&[TokenKind::Bang, TokenKind::Minus]) {
            let op = self.previous();
            let right = self.unary()?;
            return Ok(Expr::Unary {
                op,
                right: Box::new(right),
            });
        }
        self.call()
    }

    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            if self.match_kind(&[TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    return Err(self.error_at_current(&format!(
                        "Can't have more than {MAX_ARGS} arguments."
                    )));
                }
                arguments.push(self.expression()?);
                if !self.match_kind(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.match_kind(&[TokenKind::False]) {
            return Ok(Expr::Literal(LitValue::Bool(false)));
        }
        if self.match_kind(&[TokenKind::True]) {
            return Ok(Expr::Literal(LitValue::Bool(true)));
        }
        if self.match_kind(&[TokenKind::Nil]) {
            return Ok(Expr::Literal(LitValue::Nil));
        }
        if self.match_kind(&[TokenKind::Number]) {
            return match self.previous().literal {
                Literal::Num(n) => Ok(Expr::Literal(LitValue::Number(n))),
                _ => unreachable!("NUMBER token must carry a numeric literal"),
            };
        }
        if self.match_kind(&[TokenKind::String]) {
            return match self.previous().literal {
                Literal::Str(s) => Ok(Expr::Literal(LitValue::Str(s))),
                _ => unreachable!("STRING token must carry a string literal"),
            };
        }
        if self.match_kind(&[TokenKind::Identifier]) {
            return Ok(Expr::Variable(self.previous()));
        }
        if self.match_kind(&[TokenKind::Fun]) {
            return self.function_expression();
        }
        if self.match_kind(&[TokenKind::LeftParen]) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }

        Err(self.error_at_current("Expect expression."))
    }

    /// `funExpr → "fun" IDENT? "(" params? ")" block`
    fn function_expression(&mut self) -> Result<Expr, ParseError> {
        let name = if self.check(TokenKind::Identifier) {
            self.advance().lexeme
        } else {
            String::new()
        };
        let (params, body) = self.function_tail()?;
        Ok(Expr::Function(Rc::new(FunctionDecl { name, params, body })))
    }

    // --- token stream helpers -------------------------------------------

    fn match_kind(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(*kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn check_next(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.current + 1)
            .map(|t| t.kind == kind)
            .unwrap_or(false)
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> Token {
        self.tokens[self.current].clone()
    }

    fn previous(&self) -> Token {
        self.tokens[self.current - 1].clone()
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.error_at_current(message))
    }

    fn error_at_current(&self, message: &str) -> ParseError {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            ParseError {
                line: token.line,
                lexeme: None,
                message: message.to_string(),
            }
        } else {
            ParseError {
                line: token.line,
                lexeme: Some(token.lexeme),
                message: message.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;

    fn parse_expr(source: &str) -> Expr {
        let (tokens, errors) = Scanner::new(source).scan();
        assert!(errors.is_empty());
        Parser::new(tokens).parse_single_expression().unwrap()
    }

    fn parse_program(source: &str) -> Vec<Stmt> {
        let (tokens, errors) = Scanner::new(source).scan();
        assert!(errors.is_empty());
        Parser::new(tokens).parse_program().unwrap()
    }

    #[test]
    fn precedence_nests_binary_operators_correctly() {
        let expr = parse_expr("1 + 2 * 3");
        assert_eq!(format!("{expr}"), "(+ 1 (* 2 3))");
    }

    #[test]
    fn grouping_pretty_prints() {
        let expr = parse_expr("(1 + 2) * 3");
        assert_eq!(format!("{expr}"), "(* (group (+ 1 2)) 3)");
    }

    #[test]
    fn unary_and_comparison() {
        let expr = parse_expr("-1 <= 2");
        assert_eq!(format!("{expr}"), "(<= (- 1) 2)");
    }

    #[test]
    fn assignment_requires_variable_target() {
        let (tokens, _) = Scanner::new("1 = 2;").scan();
        let mut parser = Parser::new(tokens);
        let err = parser.parse_program().unwrap_err();
        assert_eq!(err.message, "Invalid assignment target.");
    }

    #[test]
    fn for_loop_desugars_to_block_with_while() {
        let stmts = parse_program("for (var i = 0; i < 3; i = i + 1) print i;");
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::Block(inner) => {
                assert_eq!(inner.len(), 2);
                assert!(matches!(inner[0], Stmt::Var { .. }));
                assert!(matches!(inner[1], Stmt::While { .. }));
            }
            other => panic!("expected desugared block, got {other:?}"),
        }
    }

    #[test]
    fn missing_semicolon_reports_parse_error() {
        let (tokens, _) = Scanner::new("print 1").scan();
        let mut parser = Parser::new(tokens);
        let err = parser.parse_program().unwrap_err();
        assert_eq!(err.lexeme, None);
        assert_eq!(err.message, "Expect ';' after value.");
    }

    #[test]
    fn return_outside_function_is_a_parse_error() {
        let (tokens, _) = Scanner::new("return 1;").scan();
        let err = Parser::new(tokens).parse_program().unwrap_err();
        assert_eq!(err.message, "Can't return from top-level code.");
    }

    #[test]
    fn too_many_call_arguments_is_rejected() {
        let args = (0..MAX_ARGS + 1)
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let source = format!("f({args});");
        let (tokens, _) = Scanner::new(&source).scan();
        let mut parser = Parser::new(tokens);
        let err = parser.parse_program().unwrap_err();
        assert!(err.message.contains("Can't have more than 127 arguments"));
    }
}

