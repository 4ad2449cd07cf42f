//! A small interpreter for a Scheme-like expression language.
//!
//! Source text flows through three stages: [`lexer::lex`] turns it into a
//! token sequence, [`parser::parse`] assembles the tokens into a forest of
//! nested list expressions, and [`evaluator::eval`] interprets each
//! expression against a name/value environment. [`exec`] wires the stages
//! together for whole programs.

use thiserror::Error;

/// Lexing failure: no token class matched at `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized token at offset {offset}: {found:?}")]
pub struct LexError {
    pub offset: usize,
    /// The unmatched remainder of the input.
    pub found: String,
}

/// Parenthesis imbalance detected while assembling list expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// More `(` than `)`. Retryable: supplying more tokens can complete
    /// the expression, which is how the interactive mode buffers input.
    #[error("incomplete expression: missing closing parenthesis")]
    IncompleteExpression,
    /// More `)` than `(`. The input is malformed and no amount of further
    /// tokens can repair it.
    #[error("overcomplete expression: unexpected closing parenthesis")]
    OvercompleteExpression,
}

/// Evaluation failure kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unbound identifier: {0}")]
    UnboundIdentifier(String),
    #[error("type error: {0}")]
    TypeError(String),
    #[error("arity mismatch: expected {expected} arguments, got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("cannot evaluate an empty application")]
    EmptyApplication,
    #[error("not callable: {0}")]
    NotCallable(String),
    #[error("no branch matched in 'cond' expression")]
    NoBranchMatched,
    #[error("malformed special form: {0}")]
    MalformedSpecialForm(String),
    #[error("division by zero")]
    DivisionByZero,
}

/// Any failure from the lex/parse/eval pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

pub mod ast;
pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::Expr;
pub use environment::Environment;
pub use value::Value;

/// Run a whole program: lex, parse, then evaluate every top-level
/// expression in order against one fresh default environment, returning the
/// value of the last one ([`Value::Nil`] for an empty program).
///
/// The first error from any stage short-circuits the run.
pub fn exec(src: &str) -> Result<Value, Error> {
    let tokens = lexer::lex(src)?;
    let exprs = parser::parse(&tokens)?;
    let mut env = builtins::default_env();
    let mut retval = Value::Nil;
    for expr in &exprs {
        retval = evaluator::eval(expr, &mut env)?;
    }
    Ok(retval)
}
