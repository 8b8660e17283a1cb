//! Helpers for a small toolkit-driven GUI with a colon command line.
//!
//! This crate provides:
//! - Colon command parsing and dispatch (`:eval(...)`, `:echo ...`, `:start`, `:q`)
//! - An embedded expression interpreter backing `:eval` and `:echo`
//! - Quit and command line key predicates over an explicit session
//! - The badwolf named color palette
//! - JSON settings for session flags, window size and theme colors

pub mod command;
pub mod config;
pub mod error;
pub mod expr;
pub mod input;
pub mod palette;
pub mod window;

// Re-export main types
pub use command::{
    dispatch, extract_argument, ArgumentDiagnostic, CommandDispatcher, ExtractedArgument,
    Response, ResponseKind,
};
pub use config::{Settings, Theme};
pub use error::{MakeupError, Result};
pub use expr::{EvalError, Evaluator, Interpreter, Scope, Value};
pub use input::{InputEvent, Key, Modifiers, PressedKeys, Session};
pub use palette::{Color, Rgb};
pub use window::Window;
