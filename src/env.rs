// ABOUTME: Environment chain holding variable bindings for lexical scopes

use crate::error::RuntimeError;
use crate::value::Value;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One scope record: a name-to-value map plus an optional parent link.
/// Environments are shared between closures and `parallel` branches, so each
/// node guards its own map with a lock.
pub struct Environment {
    values: Mutex<HashMap<String, Value>>,
    enclosing: Option<Arc<Environment>>,
}

impl Environment {
    /// Creates a new root environment with no parent.
    pub fn new() -> Arc<Self> {
        Arc::new(Environment {
            values: Mutex::new(HashMap::new()),
            enclosing: None,
        })
    }

    /// Creates a child environment nested inside `enclosing`.
    pub fn with_enclosing(enclosing: Arc<Environment>) -> Arc<Self> {
        Arc::new(Environment {
            values: Mutex::new(HashMap::new()),
            enclosing: Some(enclosing),
        })
    }

    /// Defines a binding in THIS scope; shadowing an outer binding is allowed
    /// and observable.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.values.lock().insert(name.into(), value);
    }

    /// Looks a name up in this scope, then the enclosing chain.
    pub fn get(&self, name: &str) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.lock().get(name) {
            return Ok(value.clone());
        }

        if let Some(ref enclosing) = self.enclosing {
            return enclosing.get(name);
        }

        Err(RuntimeError::UndefinedVariable(name.to_string()))
    }

    /// Rebinds the nearest existing binding for `name`; fails if the name is
    /// unbound in every reachable scope.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        {
            let mut values = self.values.lock();
            if values.contains_key(name) {
                values.insert(name.to_string(), value);
                return Ok(());
            }
        }

        if let Some(ref enclosing) = self.enclosing {
            return enclosing.assign(name, value);
        }

        Err(RuntimeError::UndefinedVariable(name.to_string()))
    }
}

impl fmt::Debug for Environment {
    // Values can reach back into this environment through closures, so only
    // the local binding names are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.values.lock().keys().cloned().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_enclosing", &self.enclosing.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let env = Environment::new();
        env.define("x", Value::Int(42));

        assert_eq!(env.get("x"), Ok(Value::Int(42)));
    }

    #[test]
    fn test_undefined_variable() {
        let env = Environment::new();
        assert_eq!(
            env.get("missing"),
            Err(RuntimeError::UndefinedVariable("missing".to_string()))
        );
    }

    #[test]
    fn test_shadowing() {
        let parent = Environment::new();
        parent.define("x", Value::Int(42));

        let child = Environment::with_enclosing(parent.clone());
        child.define("x", Value::Int(100));

        assert_eq!(child.get("x"), Ok(Value::Int(100)));
        assert_eq!(parent.get("x"), Ok(Value::Int(42)));
    }

    #[test]
    fn test_parent_lookup() {
        let parent = Environment::new();
        parent.define("x", Value::Str("hi".to_string()));

        let child = Environment::with_enclosing(parent);
        assert_eq!(child.get("x"), Ok(Value::Str("hi".to_string())));
    }

    #[test]
    fn test_assign_updates_nearest_binding() {
        let grandparent = Environment::new();
        grandparent.define("a", Value::Int(1));

        let parent = Environment::with_enclosing(grandparent.clone());
        let child = Environment::with_enclosing(parent);

        child.assign("a", Value::Int(2)).unwrap();
        assert_eq!(grandparent.get("a"), Ok(Value::Int(2)));
        assert_eq!(child.get("a"), Ok(Value::Int(2)));
    }

    #[test]
    fn test_assign_unbound_name_fails() {
        let env = Environment::new();
        assert_eq!(
            env.assign("nope", Value::Null),
            Err(RuntimeError::UndefinedVariable("nope".to_string()))
        );
    }

    #[test]
    fn test_multiple_levels() {
        let grandparent = Environment::new();
        grandparent.define("a", Value::Int(1));

        let parent = Environment::with_enclosing(grandparent);
        parent.define("b", Value::Int(2));

        let child = Environment::with_enclosing(parent);
        child.define("c", Value::Int(3));

        assert_eq!(child.get("a"), Ok(Value::Int(1)));
        assert_eq!(child.get("b"), Ok(Value::Int(2)));
        assert_eq!(child.get("c"), Ok(Value::Int(3)));
    }
}
