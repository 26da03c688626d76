// ABOUTME: Native functions seeded into the global environment at startup

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::value::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Registers every native function into the global scope. Looked up last,
/// after user globals, and never shadowed by them (§4.3).
pub fn register(env: &Environment) {
    env.define(
        "clock".to_string(),
        Value::NativeFunction {
            name: "clock",
            arity: 0,
            func: clock,
        },
    );
}

fn clock(_args: &[Value]) -> Result<Value, RuntimeError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    Ok(Value::Number(now.as_secs_f64()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_returns_a_number() {
        let result = clock(&[]).unwrap();
        assert!(matches!(result, Value::Number(n) if n > 0.0));
    }

    #[test]
    fn clock_is_registered_in_the_global_environment() {
        let env = Environment::new();
        register(&env);
        assert!(matches!(env.get("clock"), Some(Value::NativeFunction { arity: 0, .. })));
    }
}
