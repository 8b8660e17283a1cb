//! Expression evaluation for the colon command line.
//!
//! `:eval` and `:echo` need to evaluate user supplied expression text against
//! an optional variable environment. This module provides that capability as
//! the [`Evaluator`] trait, and [`Interpreter`], a small tree-walking
//! interpreter over a Python-flavored expression grammar:
//! - Literals: ints, floats, strings, `True`/`False`/`None`, lists, tuples, dicts
//! - Arithmetic, comparison (chainable) and short-circuit boolean operators
//! - Subscripts and a fixed set of builtin functions
//! - Name lookup through locals, then globals

mod ast;
mod builtins;
mod interpreter;
mod lexer;
mod parser;
mod value;

pub use ast::{BinaryOp, CompareOp, Expr, LogicalOp, UnaryOp};
pub use interpreter::Interpreter;
pub use parser::ExprParser;
pub use value::{format_float, Scope, Value};

/// Failure raised while parsing or evaluating an expression.
///
/// The display text is the message shown on the command line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("{0}")]
    Syntax(String),

    #[error("name '{0}' is not defined")]
    Name(String),

    #[error("{0}")]
    Type(String),

    #[error("{0}")]
    Value(String),

    #[error("{0}")]
    ZeroDivision(String),

    #[error("{0}")]
    Index(String),

    /// Missing dict key; carries the quoted key.
    #[error("{0}")]
    Key(String),

    #[error("integer overflow")]
    Overflow,
}

/// Evaluates expression source text in an optional variable environment.
pub trait Evaluator {
    fn evaluate(
        &self,
        source: &str,
        globals: Option<&Scope>,
        locals: Option<&Scope>,
    ) -> Result<Value, EvalError>;
}
