//! Tree-walking evaluation of parsed expressions.

use std::cmp::Ordering;

use super::ast::{BinaryOp, CompareOp, Expr, LogicalOp, UnaryOp};
use super::builtins;
use super::parser::ExprParser;
use super::value::{Scope, Value};
use super::{EvalError, Evaluator};

type Result<T> = std::result::Result<T, EvalError>;

/// Upper bound on the size of a sequence built by `*` repetition, counted in
/// nested elements plus string bytes.
const MAX_REPEAT_WEIGHT: usize = 1 << 20;

/// Stateless expression interpreter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates an already parsed expression.
    pub fn eval_expr(
        &self,
        expr: &Expr,
        globals: Option<&Scope>,
        locals: Option<&Scope>,
    ) -> Result<Value> {
        Frame { globals, locals }.eval(expr)
    }
}

impl Evaluator for Interpreter {
    fn evaluate(
        &self,
        source: &str,
        globals: Option<&Scope>,
        locals: Option<&Scope>,
    ) -> Result<Value> {
        let expr = ExprParser::parse(source)?;
        self.eval_expr(&expr, globals, locals)
    }
}

struct Frame<'a> {
    globals: Option<&'a Scope>,
    locals: Option<&'a Scope>,
}

impl Frame<'_> {
    fn eval(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Name(name) => self.lookup(name),
            Expr::List(items) => Ok(Value::List(self.eval_all(items)?)),
            Expr::Tuple(items) => Ok(Value::Tuple(self.eval_all(items)?)),
            Expr::Dict(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = match self.eval(key)? {
                        Value::Str(key) => key,
                        other => {
                            return Err(EvalError::Type(format!(
                                "dict keys must be str, not {}",
                                other.type_name()
                            )))
                        }
                    };
                    let value = self.eval(value)?;
                    Value::dict_insert(&mut out, key, value);
                }
                Ok(Value::Dict(out))
            }
            Expr::Unary { op, operand } => unary(*op, self.eval(operand)?),
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary(*op, left, right)
            }
            Expr::Compare { first, rest } => {
                let mut left = self.eval(first)?;
                for (op, operand) in rest {
                    let right = self.eval(operand)?;
                    if !compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            Expr::Logical { op, left, right } => {
                let left = self.eval(left)?;
                let decided = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.eval(right)
                }
            }
            Expr::Subscript { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                subscript(target, index)
            }
            Expr::Call { function, args } => builtins::call(function, self.eval_all(args)?),
        }
    }

    fn eval_all(&self, items: &[Expr]) -> Result<Vec<Value>> {
        items.iter().map(|item| self.eval(item)).collect()
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.locals.and_then(|scope| scope.get(name)) {
            return Ok(value.clone());
        }
        if let Some(value) = self.globals.and_then(|scope| scope.get(name)) {
            return Ok(value.clone());
        }
        if builtins::is_builtin(name) {
            return Err(EvalError::Type(format!(
                "builtin function '{name}' must be called"
            )));
        }
        Err(EvalError::Name(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub(super) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(super) fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(Self::Int(i64::from(*flag))),
            Value::Int(number) => Some(Self::Int(*number)),
            Value::Float(number) => Some(Self::Float(*number)),
            _ => None,
        }
    }

    pub(super) fn to_f64(self) -> f64 {
        match self {
            Self::Int(number) => number as f64,
            Self::Float(number) => number,
        }
    }
}

/// Integer view of a value, treating booleans as 0/1.
pub(super) fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::Int(number) => Some(*number),
        _ => None,
    }
}

fn unary(op: UnaryOp, operand: Value) -> Result<Value> {
    if op == UnaryOp::Not {
        return Ok(Value::Bool(!operand.is_truthy()));
    }

    let symbol = if op == UnaryOp::Minus { "-" } else { "+" };
    match (op, Number::of(&operand)) {
        (UnaryOp::Minus, Some(Number::Int(number))) => {
            number.checked_neg().map(Value::Int).ok_or(EvalError::Overflow)
        }
        (UnaryOp::Minus, Some(Number::Float(number))) => Ok(Value::Float(-number)),
        (_, Some(Number::Int(number))) => Ok(Value::Int(number)),
        (_, Some(Number::Float(number))) => Ok(Value::Float(number)),
        (_, None) => Err(EvalError::Type(format!(
            "bad operand type for unary {symbol}: '{}'",
            operand.type_name()
        ))),
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    match op {
        BinaryOp::Add => match (&left, &right) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            (Value::List(a), Value::List(b)) => Ok(Value::List(concat(a, b))),
            (Value::Tuple(a), Value::Tuple(b)) => Ok(Value::Tuple(concat(a, b))),
            (Value::Str(_), other) => Err(EvalError::Type(format!(
                "can only concatenate str (not \"{}\") to str",
                other.type_name()
            ))),
            _ => arithmetic(op, &left, &right),
        },
        BinaryOp::Mul => match (&left, &right) {
            (Value::Str(text), count) | (count, Value::Str(text)) if as_int(count).is_some() => {
                let count = repeat_count(text.len(), as_int(count).unwrap_or_default())?;
                Ok(Value::Str(text.repeat(count)))
            }
            (Value::List(items), count) | (count, Value::List(items))
                if as_int(count).is_some() =>
            {
                let count = repeat_count(items_weight(items), as_int(count).unwrap_or_default())?;
                Ok(Value::List(repeat_items(items, count)))
            }
            (Value::Tuple(items), count) | (count, Value::Tuple(items))
                if as_int(count).is_some() =>
            {
                let count = repeat_count(items_weight(items), as_int(count).unwrap_or_default())?;
                Ok(Value::Tuple(repeat_items(items, count)))
            }
            _ => arithmetic(op, &left, &right),
        },
        _ => arithmetic(op, &left, &right),
    }
}

fn concat(a: &[Value], b: &[Value]) -> Vec<Value> {
    a.iter().chain(b.iter()).cloned().collect()
}

fn repeat_items(items: &[Value], count: usize) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len() * count);
    for _ in 0..count {
        out.extend_from_slice(items);
    }
    out
}

/// Validates a repetition of an operand weighing `weight`. A single copy is
/// always allowed since it is no larger than the operand itself.
fn repeat_count(weight: usize, count: i64) -> Result<usize> {
    let count = usize::try_from(count.max(0)).map_err(|_| EvalError::Overflow)?;
    if count <= 1 {
        return Ok(count);
    }
    match weight.checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_WEIGHT => Ok(count),
        _ => Err(EvalError::Value("repeated sequence is too long".to_string())),
    }
}

/// Size of a value: one per element at any depth, plus string bytes.
fn weight(value: &Value) -> usize {
    match value {
        Value::Str(text) => 1usize.saturating_add(text.len()),
        Value::List(items) | Value::Tuple(items) => 1usize.saturating_add(items_weight(items)),
        Value::Dict(entries) => entries.iter().fold(1usize, |total, (key, value)| {
            total
                .saturating_add(key.len())
                .saturating_add(weight(value))
        }),
        _ => 1,
    }
}

fn items_weight(items: &[Value]) -> usize {
    items
        .iter()
        .fold(0usize, |total, item| total.saturating_add(weight(item)))
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    let (Some(a), Some(b)) = (Number::of(left), Number::of(right)) else {
        return Err(EvalError::Type(format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            op.symbol(),
            left.type_name(),
            right.type_name()
        )));
    };

    match (a, b) {
        (Number::Int(a), Number::Int(b)) => int_arithmetic(op, a, b),
        (a, b) => float_arithmetic(op, a.to_f64(), b.to_f64()),
    }
}

fn int_arithmetic(op: BinaryOp, a: i64, b: i64) -> Result<Value> {
    let checked = |result: Option<i64>| result.map(Value::Int).ok_or(EvalError::Overflow);
    match op {
        BinaryOp::Add => checked(a.checked_add(b)),
        BinaryOp::Sub => checked(a.checked_sub(b)),
        BinaryOp::Mul => checked(a.checked_mul(b)),
        BinaryOp::Div => {
            if b == 0 {
                return Err(EvalError::ZeroDivision("division by zero".to_string()));
            }
            Ok(Value::Float(a as f64 / b as f64))
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(EvalError::ZeroDivision(
                    "integer division or modulo by zero".to_string(),
                ));
            }
            let quotient = a.checked_div(b).ok_or(EvalError::Overflow)?;
            if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
                Ok(Value::Int(quotient - 1))
            } else {
                Ok(Value::Int(quotient))
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(EvalError::ZeroDivision(
                    "integer division or modulo by zero".to_string(),
                ));
            }
            let remainder = a.wrapping_rem(b);
            if remainder != 0 && ((remainder < 0) != (b < 0)) {
                Ok(Value::Int(remainder + b))
            } else {
                Ok(Value::Int(remainder))
            }
        }
        BinaryOp::Pow => {
            if b >= 0 {
                match a {
                    1 => return Ok(Value::Int(1)),
                    0 => return Ok(Value::Int(i64::from(b == 0))),
                    -1 => return Ok(Value::Int(if b % 2 == 0 { 1 } else { -1 })),
                    _ => {}
                }
                let exponent = u32::try_from(b).map_err(|_| EvalError::Overflow)?;
                return checked(a.checked_pow(exponent));
            }
            if a == 0 {
                return Err(EvalError::ZeroDivision(
                    "0.0 cannot be raised to a negative power".to_string(),
                ));
            }
            Ok(Value::Float((a as f64).powf(b as f64)))
        }
    }
}

fn float_arithmetic(op: BinaryOp, a: f64, b: f64) -> Result<Value> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(EvalError::ZeroDivision("float division by zero".to_string()));
            }
            a / b
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Err(EvalError::ZeroDivision(
                    "float floor division by zero".to_string(),
                ));
            }
            (a / b).floor()
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(EvalError::ZeroDivision("float modulo".to_string()));
            }
            let remainder = a % b;
            if remainder != 0.0 && ((remainder < 0.0) != (b < 0.0)) {
                remainder + b
            } else {
                remainder
            }
        }
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(EvalError::ZeroDivision(
                    "0.0 cannot be raised to a negative power".to_string(),
                ));
            }
            if a < 0.0 && b.fract() != 0.0 {
                return Err(EvalError::Value(
                    "negative number cannot be raised to a fractional power".to_string(),
                ));
            }
            a.powf(b)
        }
    };
    Ok(Value::Float(value))
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool> {
    match op {
        CompareOp::Eq => Ok(values_equal(left, right)),
        CompareOp::Ne => Ok(!values_equal(left, right)),
        _ => {
            let Some(ordering) = partial_order(op, left, right)? else {
                return Ok(false);
            };
            Ok(match op {
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Le => ordering != Ordering::Greater,
                CompareOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
    }
}

pub(super) fn values_equal(left: &Value, right: &Value) -> bool {
    if let (Some(a), Some(b)) = (Number::of(left), Number::of(right)) {
        return match (a, b) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.to_f64() == b.to_f64(),
        };
    }
    match (left, right) {
        (Value::None, Value::None) => true,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Dict(a), Value::Dict(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, value)| {
                    right
                        .dict_get(key)
                        .is_some_and(|other| values_equal(value, other))
                })
        }
        _ => false,
    }
}

/// Orders two values for `op`; `None` means unordered (a NaN was involved).
pub(super) fn partial_order(
    op: CompareOp,
    left: &Value,
    right: &Value,
) -> Result<Option<Ordering>> {
    if let (Some(a), Some(b)) = (Number::of(left), Number::of(right)) {
        return Ok(match (a, b) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.to_f64().partial_cmp(&b.to_f64()),
        });
    }
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
            for (x, y) in a.iter().zip(b) {
                if !values_equal(x, y) {
                    return partial_order(op, x, y);
                }
            }
            Ok(Some(a.len().cmp(&b.len())))
        }
        _ => Err(EvalError::Type(format!(
            "'{}' not supported between instances of '{}' and '{}'",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Subscripts
// ---------------------------------------------------------------------------

fn subscript(target: Value, index: Value) -> Result<Value> {
    match target {
        Value::List(items) => sequence_item(items, &index, "list"),
        Value::Tuple(items) => sequence_item(items, &index, "tuple"),
        Value::Str(text) => {
            let chars: Vec<Value> = text.chars().map(|ch| Value::Str(ch.to_string())).collect();
            sequence_item(chars, &index, "string")
        }
        Value::Dict(entries) => {
            let Value::Str(key) = index else {
                return Err(EvalError::Key(index.repr()));
            };
            entries
                .into_iter()
                .find(|(candidate, _)| *candidate == key)
                .map(|(_, value)| value)
                .ok_or_else(|| EvalError::Key(Value::Str(key).repr()))
        }
        other => Err(EvalError::Type(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

fn sequence_item(mut items: Vec<Value>, index: &Value, kind: &str) -> Result<Value> {
    let Some(position) = as_int(index) else {
        return Err(EvalError::Type(format!(
            "{kind} indices must be integers, not {}",
            index.type_name()
        )));
    };

    let len = items.len() as i64;
    let resolved = if position < 0 { position + len } else { position };
    if resolved < 0 || resolved >= len {
        return Err(EvalError::Index(format!("{kind} index out of range")));
    }
    Ok(items.swap_remove(resolved as usize))
}
