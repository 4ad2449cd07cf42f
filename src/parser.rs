//! Token-sequence parser.
//!
//! Maintains an owned stack of in-progress list buffers, starting with one
//! empty buffer for the implicit top level. `(` opens a new buffer, `)`
//! closes the current one and nests it into its parent, comments are
//! skipped, and everything else is an atom. Imbalance is detected in both
//! directions: a close with no open parent is `OvercompleteExpression`
//! (unfixable), leftover open buffers at the end are `IncompleteExpression`
//! (fixable by more tokens, which the interactive mode relies on).

use crate::ast::Expr;
use crate::lexer;
use crate::ParseError;

/// Parse `tokens` into the ordered sequence of top-level expressions.
pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Expr>, ParseError> {
    let mut stack: Vec<Vec<Expr>> = vec![Vec::new()];
    for token in tokens {
        let token = token.as_ref();
        match token {
            "(" => stack.push(Vec::new()),
            ")" => {
                let child = match stack.pop() {
                    Some(buf) => buf,
                    None => return Err(ParseError::OvercompleteExpression),
                };
                // The stack must stay non-empty after the pop: the popped
                // buffer needs a parent to nest into.
                match stack.last_mut() {
                    Some(parent) => parent.push(Expr::List(child)),
                    None => return Err(ParseError::OvercompleteExpression),
                }
            }
            t if lexer::is_comment(t) => continue,
            t => {
                if let Some(top) = stack.last_mut() {
                    top.push(Expr::atom(t));
                }
            }
        }
    }
    if stack.len() > 1 {
        return Err(ParseError::IncompleteExpression);
    }
    Ok(stack.pop().unwrap_or_default())
}
