//! Colon command dispatch.

use super::argument::{extract_argument, ExtractedArgument};
use super::response::Response;
use crate::expr::{EvalError, Evaluator, Interpreter, Scope, Value};

/// Every command line starts with this character.
pub const COMMAND_PREFIX: char = ':';

/// A command keyword with its raw arguments, prefix already removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `:eval(...)`; carries the whole command text for argument extraction.
    Eval(&'a str),
    Quit,
    /// `:echo <expression>`; carries the trimmed expression.
    Echo(&'a str),
    Start,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(body: &'a str) -> Self {
        if body.starts_with("eval") {
            Self::Eval(body)
        } else if body == "q" {
            Self::Quit
        } else if body.starts_with("echo") {
            Self::Echo(body.trim_start_matches(['e', 'c', 'h', 'o']).trim())
        } else if body == "start" {
            Self::Start
        } else {
            Self::Unknown(body)
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Eval(_) => "eval",
            Self::Quit => "q",
            Self::Echo(_) => "echo",
            Self::Start => "start",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Turns command lines into [`Response`]s.
///
/// `:echo` and argument-less `:eval` evaluate in the dispatcher's own scope,
/// which always binds `__name__`. Applications can add variables with
/// [`CommandDispatcher::with_variable`].
#[derive(Debug, Clone)]
pub struct CommandDispatcher<E = Interpreter> {
    evaluator: E,
    scope: Scope,
}

impl CommandDispatcher<Interpreter> {
    pub fn new() -> Self {
        Self::with_evaluator(Interpreter::new())
    }
}

impl Default for CommandDispatcher<Interpreter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator> CommandDispatcher<E> {
    pub fn with_evaluator(evaluator: E) -> Self {
        Self {
            evaluator,
            scope: Scope::new().with("__name__", module_path!()),
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.scope.set(name, value);
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn dispatch(&self, cmd: &str) -> Response {
        // Happens when the user erases the ':' and submits.
        if cmd.is_empty() {
            return Response::Silent;
        }
        let Some(body) = cmd.strip_prefix(COMMAND_PREFIX) else {
            return Response::Error("Start commands with colon (:)".to_string());
        };

        let command = Command::parse(body);
        log::debug!("dispatching :{} command", command.keyword());

        match command {
            Command::Eval(text) => self.eval_command(text),
            Command::Quit => Response::Quit,
            Command::Echo(expression) => {
                match self.evaluator.evaluate(expression, Some(&self.scope), None) {
                    Ok(value) => Response::Value(value.to_string()),
                    Err(err) => {
                        log::debug!("echo failed: {err}");
                        Response::Error(err.to_string())
                    }
                }
            }
            Command::Start => Response::Started,
            Command::Unknown(body) => {
                log::debug!("unrecognized command {body:?}");
                Response::Error("Command not recognized".to_string())
            }
        }
    }

    fn eval_command(&self, text: &str) -> Response {
        let arguments = match extract_argument(text) {
            ExtractedArgument::Empty => return Response::Silent,
            ExtractedArgument::Diagnostic(diagnostic) => {
                return Response::Error(diagnostic.to_string())
            }
            ExtractedArgument::Text(arguments) => arguments,
        };

        match self.eval_arguments(&arguments) {
            Ok(value) => Response::Value(value.to_string()),
            Err(err) => {
                log::debug!("eval failed: {err}");
                Response::Error(err.to_string())
            }
        }
    }

    /// Evaluates `'expression'[, globals[, locals]]`.
    fn eval_arguments(&self, arguments: &str) -> Result<Value, EvalError> {
        let (source, globals, locals) = match self.evaluator.evaluate(arguments, None, None)? {
            Value::Str(source) => (source, None, None),
            Value::Tuple(items) if items.len() <= 3 => {
                let mut items = items.into_iter();
                let source = match items.next() {
                    Some(Value::Str(source)) => source,
                    other => {
                        return Err(EvalError::Type(format!(
                            "eval() arg 1 must be a string, not {}",
                            other.map_or("tuple", |value| value.type_name())
                        )))
                    }
                };
                let globals = items.next().map(Scope::try_from).transpose()?;
                let locals = items.next().map(Scope::try_from).transpose()?;
                (source, globals, locals)
            }
            Value::Tuple(items) => {
                return Err(EvalError::Type(format!(
                    "eval expected at most 3 arguments, got {}",
                    items.len()
                )))
            }
            other => {
                return Err(EvalError::Type(format!(
                    "eval() arg 1 must be a string, not {}",
                    other.type_name()
                )))
            }
        };

        let globals = globals.as_ref().unwrap_or(&self.scope);
        self.evaluator
            .evaluate(&source, Some(globals), locals.as_ref())
    }
}

/// Dispatches `cmd` with a default [`CommandDispatcher`] and renders the
/// response text.
pub fn dispatch(cmd: &str) -> String {
    CommandDispatcher::new().dispatch(cmd).to_string()
}
