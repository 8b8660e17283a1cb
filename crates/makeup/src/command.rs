//! Colon command line: argument extraction and command dispatch.

mod argument;
mod dispatch;
mod response;


pub use argument::{extract_argument, ArgumentDiagnostic, ExtractedArgument};
pub use dispatch::{dispatch, Command, CommandDispatcher, COMMAND_PREFIX};
pub use response::{Response, ResponseKind, START_MESSAGE};
