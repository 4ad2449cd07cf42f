//! Name/value environment.
//!
//! There is no parent-chain delegation: scope extension works by taking a
//! full snapshot of everything visible, binding into the copy, and dropping
//! the copy when the call or form returns. `bind` mutates in place, which is
//! what lets `define` produce bindings that persist across top-level forms.

use std::collections::HashMap;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
        }
    }

    /// Insert or replace a binding in this environment.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// An independent shallow copy: same value references, but bindings made
    /// in the copy never affect the original, and vice versa.
    pub fn snapshot(&self) -> Environment {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_and_lookup() {
        let mut env = Environment::new();
        assert_eq!(env.lookup("x"), None);
        env.bind("x", Value::Integer(1));
        assert_eq!(env.lookup("x"), Some(&Value::Integer(1)));

        // Rebinding shadows the previous value.
        env.bind("x", Value::Integer(2));
        assert_eq!(env.lookup("x"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_snapshot_is_independent_both_ways() {
        let mut outer = Environment::new();
        outer.bind("a", Value::Integer(1));

        let mut inner = outer.snapshot();
        assert_eq!(inner.lookup("a"), Some(&Value::Integer(1)));

        inner.bind("a", Value::Integer(10));
        inner.bind("b", Value::Integer(2));
        assert_eq!(outer.lookup("a"), Some(&Value::Integer(1)));
        assert_eq!(outer.lookup("b"), None);

        outer.bind("c", Value::Integer(3));
        assert_eq!(inner.lookup("c"), None);
    }
}
