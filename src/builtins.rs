//! Built-in bindings seeding the root environment.
//!
//! The registries themselves are immutable statics built once; every fresh
//! environment is seeded from them, and `define` only ever mutates the
//! environment copy, never the registries. Special forms are ordinary
//! bindings too, so they are looked up (and shadowable) like any other
//! identifier, with handlers that receive their arguments unevaluated.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ast::Expr;
use crate::environment::Environment;
use crate::evaluator::{eval_begin, eval_cond, eval_define, eval_if, eval_lambda, eval_let};
use crate::value::Value;
use crate::EvalError;

/// Expected number of arguments for a built-in procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly n arguments required.
    Exact(usize),
    /// Any number of arguments (0 or more).
    Any,
}

impl Arity {
    pub fn validate(&self, arg_count: usize) -> Result<(), EvalError> {
        match self {
            Arity::Exact(n) if arg_count != *n => Err(EvalError::ArityMismatch {
                expected: *n,
                got: arg_count,
            }),
            _ => Ok(()),
        }
    }
}

/// A native procedure: arguments arrive already evaluated.
#[derive(Debug)]
pub struct Builtin {
    pub id: &'static str,
    pub arity: Arity,
    pub func: fn(&[Value]) -> Result<Value, EvalError>,
}

/// A built-in operator that controls evaluation of its own arguments.
#[derive(Debug)]
pub struct SpecialForm {
    pub id: &'static str,
    pub handler: fn(&[Expr], &mut Environment) -> Result<Value, EvalError>,
}

// Macro to generate the fixed-arity integer procedures.
macro_rules! int_binary {
    ($name:ident, $op_str:expr, |$a:ident, $b:ident| $body:expr) => {
        fn $name(args: &[Value]) -> Result<Value, EvalError> {
            match args {
                [Value::Integer($a), Value::Integer($b)] => {
                    let ($a, $b) = (*$a, *$b);
                    $body
                }
                [a, b] => Err(EvalError::TypeError(format!(
                    concat!($op_str, ": expected integers, got {} and {}"),
                    a.type_name(),
                    b.type_name()
                ))),
                _ => Err(EvalError::ArityMismatch {
                    expected: 2,
                    got: args.len(),
                }),
            }
        }
    };
}

int_binary!(builtin_sub, "-", |a, b| Ok(Value::Integer(a.wrapping_sub(b))));
int_binary!(builtin_div, "/", |a, b| {
    if b == 0 {
        Err(EvalError::DivisionByZero)
    } else {
        Ok(Value::Integer(a.wrapping_div(b)))
    }
});
int_binary!(builtin_remainder, "remainder", |a, b| {
    if b == 0 {
        Err(EvalError::DivisionByZero)
    } else {
        Ok(Value::Integer(a.wrapping_rem(b)))
    }
});
int_binary!(builtin_gt, ">", |a, b| Ok(Value::Boolean(a > b)));
int_binary!(builtin_ge, ">=", |a, b| Ok(Value::Boolean(a >= b)));
int_binary!(builtin_lt, "<", |a, b| Ok(Value::Boolean(a < b)));
int_binary!(builtin_le, "<=", |a, b| Ok(Value::Boolean(a <= b)));
int_binary!(builtin_eq, "=", |a, b| Ok(Value::Boolean(a == b)));

/// Variadic `+`: identity 0, left-to-right fold.
fn builtin_add(args: &[Value]) -> Result<Value, EvalError> {
    let mut sum = 0i64;
    for arg in args {
        match arg {
            Value::Integer(n) => sum = sum.wrapping_add(*n),
            other => {
                return Err(EvalError::TypeError(format!(
                    "+: expected integers, got {}",
                    other.type_name()
                )));
            }
        }
    }
    Ok(Value::Integer(sum))
}

/// Variadic `*`: identity 1, left-to-right fold.
fn builtin_mul(args: &[Value]) -> Result<Value, EvalError> {
    let mut product = 1i64;
    for arg in args {
        match arg {
            Value::Integer(n) => product = product.wrapping_mul(*n),
            other => {
                return Err(EvalError::TypeError(format!(
                    "*: expected integers, got {}",
                    other.type_name()
                )));
            }
        }
    }
    Ok(Value::Integer(product))
}

fn builtin_not(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Boolean(b)] => Ok(Value::Boolean(!b)),
        [other] => Err(EvalError::TypeError(format!(
            "not: expected a boolean, got {}",
            other.type_name()
        ))),
        _ => Err(EvalError::ArityMismatch {
            expected: 1,
            got: args.len(),
        }),
    }
}

// `and`/`or` are procedures, not short-circuit forms: both arguments are
// evaluated eagerly before they run.
macro_rules! bool_binary {
    ($name:ident, $op_str:expr, |$a:ident, $b:ident| $body:expr) => {
        fn $name(args: &[Value]) -> Result<Value, EvalError> {
            match args {
                [Value::Boolean($a), Value::Boolean($b)] => {
                    let ($a, $b) = (*$a, *$b);
                    Ok(Value::Boolean($body))
                }
                [a, b] => Err(EvalError::TypeError(format!(
                    concat!($op_str, ": expected booleans, got {} and {}"),
                    a.type_name(),
                    b.type_name()
                ))),
                _ => Err(EvalError::ArityMismatch {
                    expected: 2,
                    got: args.len(),
                }),
            }
        }
    };
}

bool_binary!(builtin_and, "and", |a, b| a && b);
bool_binary!(builtin_or, "or", |a, b| a || b);

fn builtin_cons(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [a, b] => Ok(Value::cons(a.clone(), b.clone())),
        _ => Err(EvalError::ArityMismatch {
            expected: 2,
            got: args.len(),
        }),
    }
}

fn builtin_car(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Pair(cell)] => Ok(cell.0.clone()),
        [other] => Err(EvalError::TypeError(format!(
            "car: expected a pair, got {}",
            other.type_name()
        ))),
        _ => Err(EvalError::ArityMismatch {
            expected: 1,
            got: args.len(),
        }),
    }
}

fn builtin_cdr(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Pair(cell)] => Ok(cell.1.clone()),
        [other] => Err(EvalError::TypeError(format!(
            "cdr: expected a pair, got {}",
            other.type_name()
        ))),
        _ => Err(EvalError::ArityMismatch {
            expected: 1,
            got: args.len(),
        }),
    }
}

/// True only for the all-nil pair; a pair with a single nil slot is not
/// the empty list.
fn builtin_null(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [pair @ Value::Pair(_)] => Ok(Value::Boolean(pair.is_empty_list())),
        [other] => Err(EvalError::TypeError(format!(
            "null?: expected a pair, got {}",
            other.type_name()
        ))),
        _ => Err(EvalError::ArityMismatch {
            expected: 1,
            got: args.len(),
        }),
    }
}

fn builtin_list(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::list(args))
}

/// Process-wide pseudo-random source, seeded once.
static RNG: LazyLock<Mutex<StdRng>> = LazyLock::new(|| Mutex::new(StdRng::from_entropy()));

/// `(random n)`: uniform integer in `[0, n)`; the bound must be positive.
fn builtin_random(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Integer(n)] if *n > 0 => {
            let mut rng = RNG.lock().unwrap_or_else(PoisonError::into_inner);
            Ok(Value::Integer(rng.gen_range(0..*n)))
        }
        [Value::Integer(n)] => Err(EvalError::TypeError(format!(
            "random: expected a positive integer bound, got {n}"
        ))),
        [other] => Err(EvalError::TypeError(format!(
            "random: expected an integer, got {}",
            other.type_name()
        ))),
        _ => Err(EvalError::ArityMismatch {
            expected: 1,
            got: args.len(),
        }),
    }
}

static BUILTINS: LazyLock<HashMap<&'static str, Builtin>> = LazyLock::new(|| {
    let ops = [
        Builtin { id: "+", arity: Arity::Any, func: builtin_add },
        Builtin { id: "*", arity: Arity::Any, func: builtin_mul },
        Builtin { id: "-", arity: Arity::Exact(2), func: builtin_sub },
        Builtin { id: "/", arity: Arity::Exact(2), func: builtin_div },
        Builtin { id: "remainder", arity: Arity::Exact(2), func: builtin_remainder },
        Builtin { id: ">", arity: Arity::Exact(2), func: builtin_gt },
        Builtin { id: ">=", arity: Arity::Exact(2), func: builtin_ge },
        Builtin { id: "<", arity: Arity::Exact(2), func: builtin_lt },
        Builtin { id: "<=", arity: Arity::Exact(2), func: builtin_le },
        Builtin { id: "=", arity: Arity::Exact(2), func: builtin_eq },
        Builtin { id: "not", arity: Arity::Exact(1), func: builtin_not },
        Builtin { id: "and", arity: Arity::Exact(2), func: builtin_and },
        Builtin { id: "or", arity: Arity::Exact(2), func: builtin_or },
        Builtin { id: "cons", arity: Arity::Exact(2), func: builtin_cons },
        Builtin { id: "car", arity: Arity::Exact(1), func: builtin_car },
        Builtin { id: "cdr", arity: Arity::Exact(1), func: builtin_cdr },
        Builtin { id: "null?", arity: Arity::Exact(1), func: builtin_null },
        Builtin { id: "list", arity: Arity::Any, func: builtin_list },
        Builtin { id: "random", arity: Arity::Exact(1), func: builtin_random },
    ];
    ops.into_iter().map(|op| (op.id, op)).collect()
});

static SPECIAL_FORMS: LazyLock<HashMap<&'static str, SpecialForm>> = LazyLock::new(|| {
    let forms = [
        SpecialForm { id: "define", handler: eval_define },
        SpecialForm { id: "lambda", handler: eval_lambda },
        SpecialForm { id: "if", handler: eval_if },
        SpecialForm { id: "cond", handler: eval_cond },
        SpecialForm { id: "begin", handler: eval_begin },
        SpecialForm { id: "let", handler: eval_let },
    ];
    forms.into_iter().map(|form| (form.id, form)).collect()
});

/// A fresh environment seeded with every built-in procedure and special
/// form. One is created per program execution (or REPL session).
pub fn default_env() -> Environment {
    let mut env = Environment::new();
    for op in BUILTINS.values() {
        env.bind(op.id, Value::Builtin(op));
    }
    for form in SPECIAL_FORMS.values() {
        env.bind(form.id, Value::Form(form));
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Integer(n)
    }

    #[test]
    fn test_arity_validation() {
        assert!(Arity::Exact(2).validate(2).is_ok());
        assert_eq!(
            Arity::Exact(2).validate(3).unwrap_err(),
            EvalError::ArityMismatch { expected: 2, got: 3 }
        );
        assert!(Arity::Any.validate(0).is_ok());
        assert!(Arity::Any.validate(17).is_ok());
    }

    #[test]
    fn test_variadic_arithmetic_identities() {
        assert_eq!(builtin_add(&[]).unwrap(), int(0));
        assert_eq!(builtin_mul(&[]).unwrap(), int(1));
        assert_eq!(builtin_add(&[int(5), int(2)]).unwrap(), int(7));
        assert_eq!(builtin_mul(&[int(2), int(3), int(4)]).unwrap(), int(24));
        assert!(matches!(
            builtin_add(&[int(1), Value::Boolean(true)]).unwrap_err(),
            EvalError::TypeError(_)
        ));
    }

    #[test]
    fn test_integer_binary_ops() {
        assert_eq!(builtin_sub(&[int(5), int(2)]).unwrap(), int(3));
        assert_eq!(builtin_div(&[int(10), int(5)]).unwrap(), int(2));
        assert_eq!(builtin_remainder(&[int(33), int(7)]).unwrap(), int(5));
        assert_eq!(builtin_gt(&[int(4), int(1)]).unwrap(), Value::Boolean(true));
        assert_eq!(builtin_le(&[int(4), int(1)]).unwrap(), Value::Boolean(false));
        assert_eq!(builtin_eq(&[int(1), int(1)]).unwrap(), Value::Boolean(true));
        assert!(matches!(
            builtin_sub(&[int(1), Value::Nil]).unwrap_err(),
            EvalError::TypeError(_)
        ));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            builtin_div(&[int(1), int(0)]).unwrap_err(),
            EvalError::DivisionByZero
        );
        assert_eq!(
            builtin_remainder(&[int(1), int(0)]).unwrap_err(),
            EvalError::DivisionByZero
        );
    }

    #[test]
    fn test_boolean_ops_are_eager_procedures() {
        assert_eq!(builtin_not(&[Value::Boolean(true)]).unwrap(), Value::Boolean(false));
        assert_eq!(
            builtin_and(&[Value::Boolean(true), Value::Boolean(false)]).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            builtin_or(&[Value::Boolean(false), Value::Boolean(true)]).unwrap(),
            Value::Boolean(true)
        );
        assert!(matches!(
            builtin_and(&[int(1), Value::Boolean(true)]).unwrap_err(),
            EvalError::TypeError(_)
        ));
    }

    #[test]
    fn test_pair_ops() {
        let pair = builtin_cons(&[int(1), int(2)]).unwrap();
        assert_eq!(builtin_car(&[pair.clone()]).unwrap(), int(1));
        assert_eq!(builtin_cdr(&[pair]).unwrap(), int(2));
        assert!(matches!(
            builtin_car(&[int(1)]).unwrap_err(),
            EvalError::TypeError(_)
        ));

        let l = builtin_list(&[int(1), int(2)]).unwrap();
        assert_eq!(
            l,
            Value::cons(int(1), Value::cons(int(2), Value::empty_list()))
        );
    }

    #[test]
    fn test_null_is_strict_about_the_all_nil_pair() {
        assert_eq!(
            builtin_null(&[Value::empty_list()]).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            builtin_null(&[Value::cons(Value::Nil, int(1))]).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            builtin_null(&[Value::cons(int(1), Value::Nil)]).unwrap(),
            Value::Boolean(false)
        );
        assert!(matches!(
            builtin_null(&[Value::Nil]).unwrap_err(),
            EvalError::TypeError(_)
        ));
    }

    #[test]
    fn test_random_stays_in_range() {
        for _ in 0..100 {
            match builtin_random(&[int(6)]).unwrap() {
                Value::Integer(n) => assert!((0..6).contains(&n)),
                other => panic!("random returned {other}"),
            }
        }
        assert_eq!(builtin_random(&[int(1)]).unwrap(), int(0));
        assert!(matches!(
            builtin_random(&[int(0)]).unwrap_err(),
            EvalError::TypeError(_)
        ));
        assert!(matches!(
            builtin_random(&[int(-3)]).unwrap_err(),
            EvalError::TypeError(_)
        ));
    }

    #[test]
    fn test_default_env_seeds_everything() {
        let env = default_env();
        for id in [
            "+", "*", "-", "/", "remainder", ">", ">=", "<", "<=", "=", "not", "and", "or",
            "cons", "car", "cdr", "null?", "list", "random",
        ] {
            assert!(
                matches!(env.lookup(id), Some(Value::Builtin(_))),
                "missing builtin {id}"
            );
        }
        for id in ["define", "lambda", "if", "cond", "begin", "let"] {
            assert!(
                matches!(env.lookup(id), Some(Value::Form(_))),
                "missing special form {id}"
            );
        }
    }
}
