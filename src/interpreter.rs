// ABOUTME: Tree-walking evaluator: executes statements, evaluates expressions

use crate::ast::{Expr, FunctionDecl, LitValue, Stmt};
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::token::TokenKind;
use crate::value::Value;
use std::rc::Rc;

/// Non-local control flow threaded out of statement execution (§9): a
/// `return` unwinds to the call frame that established the active function,
/// carrying its value back through every intervening block.
enum Signal {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    globals: Rc<Environment>,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::new();
        crate::builtins::register(&globals);
        Interpreter { globals }
    }

    /// Runs a whole program (`run` sub-command, §6.1).
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        let env = self.globals.clone();
        for stmt in statements {
            self.execute(stmt, &env)?;
        }
        Ok(())
    }

    /// Evaluates a single bare expression (`evaluate` sub-command, §6.1).
    pub fn evaluate_expression(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        let env = self.globals.clone();
        self.evaluate(expr, &env)
    }

    fn execute(&mut self, stmt: &Stmt, env: &Rc<Environment>) -> Result<Signal, RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr, env)?;
                Ok(Signal::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr, env)?;
                println!("{value}");
                Ok(Signal::Normal)
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr, env)?,
                    None => Value::Nil,
                };
                env.define(name.lexeme.clone(), value);
                Ok(Signal::Normal)
            }
            Stmt::Block(statements) => {
                let block_env = Environment::with_parent(env.clone());
                self.execute_block(statements, &block_env)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition, env)?.is_truthy() {
                    self.execute(then_branch, env)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch, env)
                } else {
                    Ok(Signal::Normal)
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition, env)?.is_truthy() {
                    match self.execute(body, env)? {
                        Signal::Normal => {}
                        signal @ Signal::Return(_) => return Ok(signal),
                    }
                }
                Ok(Signal::Normal)
            }
            Stmt::Function(decl) => {
                let function = Value::UserFunction {
                    decl: decl.clone(),
                    closure: env.clone(),
                };
                env.define(decl.name.clone(), function);
                Ok(Signal::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr, env)?,
                    None => Value::Nil,
                };
                Ok(Signal::Return(value))
            }
        }
    }

    /// Executes a block's statements, restoring control to the caller on
    /// every exit path (normal fall-through, error, or `return`) without
    /// leaking the block's environment (§5).
    fn execute_block(
        &mut self,
        statements: &[Stmt],
        env: &Rc<Environment>,
    ) -> Result<Signal, RuntimeError> {
        for stmt in statements {
            match self.execute(stmt, env)? {
                Signal::Normal => {}
                signal @ Signal::Return(_) => return Ok(signal),
            }
        }
        Ok(Signal::Normal)
    }

    fn evaluate(&mut self, expr: &Expr, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit) => Ok(match lit {
                LitValue::Nil => Value::Nil,
                LitValue::Bool(b) => Value::Bool(*b),
                LitValue::Number(n) => Value::Number(*n),
                LitValue::Str(s) => Value::Text(s.clone()),
            }),
            Expr::Grouping(inner) => self.evaluate(inner, env),
            Expr::Variable(name) => env
                .get(&name.lexeme)
                .ok_or_else(|| RuntimeError::undefined_variable(name.line, &name.lexeme)),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value, env)?;
                env.assign(&name.lexeme, value.clone(), name.line)?;
                Ok(value)
            }
            Expr::Unary { op, right } => {
                let right = self.evaluate(right, env)?;
                match op.kind {
                    TokenKind::Minus => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::operand_must_be_number(op.line)),
                    },
                    TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
                    _ => unreachable!("unary parser never produces this token kind"),
                }
            }
            Expr::Logical { left, op, right } => {
                let left_value = self.evaluate(left, env)?;
                match op.kind {
                    TokenKind::Or if left_value.is_truthy() => Ok(left_value),
                    TokenKind::Or => self.evaluate(right, env),
                    TokenKind::And if !left_value.is_truthy() => Ok(left_value),
                    TokenKind::And => self.evaluate(right, env),
                    _ => unreachable!("logical parser never produces this token kind"),
                }
            }
            Expr::Binary { left, op, right } => {
                let left = self.evaluate(left, env)?;
                let right = self.evaluate(right, env)?;
                self.evaluate_binary(op.kind, op.line, left, right)
            }
            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren.line, arguments, env),
            Expr::Function(decl) => Ok(self.make_closure(decl.clone(), env)),
        }
    }

    fn evaluate_binary(
        &mut self,
        op: TokenKind,
        line: usize,
        left: Value,
        right: Value,
    ) -> Result<Value, RuntimeError> {
        match op {
            TokenKind::Plus => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Text(a), Value::Text(b)) => Ok(Value::Text(a + &b)),
                _ => Err(RuntimeError::operands_must_be_numbers_or_strings(line)),
            },
            TokenKind::Minus => numeric_binary(left, right, line, |a, b| a - b),
            TokenKind::Star => numeric_binary(left, right, line, |a, b| a * b),
            TokenKind::Slash => numeric_binary(left, right, line, |a, b| a / b),
            TokenKind::Greater => comparison_binary(left, right, line, |a, b| a > b),
            TokenKind::GreaterEqual => comparison_binary(left, right, line, |a, b| a >= b),
            TokenKind::Less => comparison_binary(left, right, line, |a, b| a < b),
            TokenKind::LessEqual => comparison_binary(left, right, line, |a, b| a <= b),
            TokenKind::EqualEqual => Ok(Value::Bool(left == right)),
            TokenKind::BangEqual => Ok(Value::Bool(left != right)),
            _ => unreachable!("binary parser never produces this token kind"),
        }
    }

    fn evaluate_call(
        &mut self,
        callee: &Expr,
        line: usize,
        arguments: &[Expr],
        env: &Rc<Environment>,
    ) -> Result<Value, RuntimeError> {
        let callee = self.evaluate(callee, env)?;
        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(self.evaluate(arg, env)?);
        }

        match callee {
            Value::NativeFunction { arity, func, .. } => {
                if args.len() != arity {
                    return Err(RuntimeError::arity_mismatch(line, arity, args.len()));
                }
                func(&args)
            }
            Value::UserFunction { decl, closure } => {
                if args.len() != decl.params.len() {
                    return Err(RuntimeError::arity_mismatch(line, decl.params.len(), args.len()));
                }
                let call_env = Environment::with_parent(closure.clone());
                for (param, arg) in decl.params.iter().zip(args) {
                    call_env.define(param.lexeme.clone(), arg);
                }
                match self.execute_block(&decl.body, &call_env)? {
                    Signal::Normal => Ok(Value::Nil),
                    Signal::Return(value) => Ok(value),
                }
            }
            _ => Err(RuntimeError::not_callable(line)),
        }
    }

    /// Builds the `Value::UserFunction` closure for a `fun` expression,
    /// binding the function to itself in a private scope so a named
    /// function literal can recurse (§4.2 "Function expressions").
    fn make_closure(&mut self, decl: Rc<FunctionDecl>, env: &Rc<Environment>) -> Value {
        if decl.name.is_empty() {
            return Value::UserFunction {
                decl,
                closure: env.clone(),
            };
        }

        let self_env = Environment::with_parent(env.clone());
        let function = Value::UserFunction {
            decl,
            closure: self_env.clone(),
        };
        if let Value::UserFunction { decl, .. } = &function {
            self_env.define(decl.name.clone(), function.clone());
        }
        function
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn numeric_binary(
    left: Value,
    right: Value,
    line: usize,
    op: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(op(a, b))),
        _ => Err(RuntimeError::operands_must_be_numbers(line)),
    }
}

fn comparison_binary(
    left: Value,
    right: Value,
    line: usize,
    op: fn(f64, f64) -> bool,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(op(a, b))),
        _ => Err(RuntimeError::operands_must_be_numbers(line)),
    }
}
