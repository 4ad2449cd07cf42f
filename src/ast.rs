//! Parsed syntax: an expression is either an atom (a bare token string) or
//! a list expression (an ordered sequence of sub-expressions). No position
//! information is carried; classification of atoms into literals and
//! identifiers happens at evaluation time.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Atom(String),
    List(Vec<Expr>),
}

impl Expr {
    /// Convenience constructor for atom expressions.
    pub fn atom(token: impl Into<String>) -> Expr {
        Expr::Atom(token.into())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Atom(token) => write!(f, "{token}"),
            Expr::List(elements) => {
                write!(f, "(")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_surface_syntax() {
        let expr = Expr::List(vec![
            Expr::atom("+"),
            Expr::atom("1"),
            Expr::List(vec![Expr::atom("*"), Expr::atom("2"), Expr::atom("3")]),
        ]);
        assert_eq!(expr.to_string(), "(+ 1 (* 2 3))");
        assert_eq!(Expr::List(vec![]).to_string(), "()");
        assert_eq!(Expr::atom("#t").to_string(), "#t");
    }
}
