//! Runtime values.
//!
//! `Value` is a closed tagged union: the evaluator and the built-ins match
//! on it exhaustively, so a shape mismatch is an explicit `TypeError`
//! return, never a cast failure. Pairs and procedure bodies are shared
//! through `Rc` so that environment snapshots stay shallow copies.

use std::fmt;
use std::rc::Rc;

use crate::ast::Expr;
use crate::builtins::{Builtin, SpecialForm};

#[derive(Debug, Clone)]
pub enum Value {
    /// Machine integer.
    Integer(i64),
    Boolean(bool),
    /// The void placeholder: the result of `define`, of an empty program,
    /// and the content of empty pair slots.
    Nil,
    /// Cons cell. The all-nil pair is the canonical empty list; a pair with
    /// only one nil slot is *not* empty.
    Pair(Rc<(Value, Value)>),
    /// Fixed-arity procedure created by `(lambda (a b ...) body)`. Invoked
    /// with exactly `params.len()` evaluated arguments, bound positionally.
    Lambda {
        params: Vec<String>,
        body: Rc<Expr>,
    },
    /// Variadic procedure created by `(lambda args body)`: all evaluated
    /// arguments are collected into a list bound to the one rest parameter.
    VariadicLambda {
        param: String,
        body: Rc<Expr>,
    },
    /// Native procedure from the built-ins registry.
    Builtin(&'static Builtin),
    /// Built-in operator that receives its argument expressions unevaluated.
    Form(&'static SpecialForm),
}

impl Value {
    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::Pair(Rc::new((car, cdr)))
    }

    /// The canonical empty list, the pair `(nil, nil)`.
    pub fn empty_list() -> Value {
        Value::cons(Value::Nil, Value::Nil)
    }

    /// True exactly for the all-nil pair.
    pub fn is_empty_list(&self) -> bool {
        matches!(self, Value::Pair(cell) if cell.0 == Value::Nil && cell.1 == Value::Nil)
    }

    /// Right-fold `values` into nested pairs terminated by the empty list.
    pub fn list(values: &[Value]) -> Value {
        let mut result = Value::empty_list();
        for v in values.iter().rev() {
            result = Value::cons(v.clone(), result);
        }
        result
    }

    /// Short tag used in type-error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
            Value::Nil => "nil",
            Value::Pair(_) => "pair",
            Value::Lambda { .. } | Value::VariadicLambda { .. } => "procedure",
            Value::Builtin(_) => "builtin procedure",
            Value::Form(_) => "special form",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Value::Nil => write!(f, "nil"),
            Value::Pair(cell) => {
                if self.is_empty_list() {
                    write!(f, "()")
                } else {
                    write!(f, "({} . {})", cell.0, cell.1)
                }
            }
            Value::Lambda { .. } | Value::VariadicLambda { .. } => write!(f, "#<procedure>"),
            Value::Builtin(op) => write!(f, "#<builtin:{}>", op.id),
            Value::Form(form) => write!(f, "#<special-form:{}>", form.id),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Pair(a), Value::Pair(b)) => a == b,
            (
                Value::Lambda {
                    params: p1,
                    body: b1,
                },
                Value::Lambda {
                    params: p2,
                    body: b2,
                },
            ) => p1 == p2 && b1 == b2,
            (
                Value::VariadicLambda {
                    param: p1,
                    body: b1,
                },
                Value::VariadicLambda {
                    param: p2,
                    body: b2,
                },
            ) => p1 == p2 && b1 == b2,
            // Native entries compare by registry id, not function pointer.
            (Value::Builtin(a), Value::Builtin(b)) => a.id == b.id,
            (Value::Form(a), Value::Form(b)) => a.id == b.id,
            _ => false, // Different variants are never equal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_is_exactly_the_all_nil_pair() {
        assert!(Value::empty_list().is_empty_list());
        assert!(!Value::cons(Value::Nil, Value::Integer(1)).is_empty_list());
        assert!(!Value::cons(Value::Integer(1), Value::Nil).is_empty_list());
        assert!(!Value::Nil.is_empty_list());
    }

    #[test]
    fn test_list_right_folds_into_pairs() {
        let l = Value::list(&[Value::Integer(1), Value::Integer(2)]);
        assert_eq!(
            l,
            Value::cons(
                Value::Integer(1),
                Value::cons(Value::Integer(2), Value::empty_list())
            )
        );
        assert_eq!(Value::list(&[]), Value::empty_list());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(-7).to_string(), "-7");
        assert_eq!(Value::Boolean(true).to_string(), "#t");
        assert_eq!(Value::Boolean(false).to_string(), "#f");
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::empty_list().to_string(), "()");
        assert_eq!(
            Value::list(&[Value::Integer(1), Value::Integer(2)]).to_string(),
            "(1 . (2 . ()))"
        );
    }
}
