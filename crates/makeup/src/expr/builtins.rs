//! Builtin functions callable from expressions.

use std::cmp::Ordering;

use super::ast::CompareOp;
use super::interpreter::{as_int, partial_order, Number};
use super::value::Value;
use super::EvalError;

type Result<T> = std::result::Result<T, EvalError>;

const BUILTINS: &[&str] = &[
    "abs", "bool", "float", "int", "len", "max", "min", "round", "str",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

pub fn call(name: &str, args: Vec<Value>) -> Result<Value> {
    match name {
        "abs" => abs(one_arg(name, args)?),
        "bool" => Ok(Value::Bool(
            optional_arg(name, args)?.is_some_and(|value| value.is_truthy()),
        )),
        "float" => match optional_arg(name, args)? {
            None => Ok(Value::Float(0.0)),
            Some(value) => to_float(value),
        },
        "int" => match optional_arg(name, args)? {
            None => Ok(Value::Int(0)),
            Some(value) => to_int(value),
        },
        "len" => len(one_arg(name, args)?),
        "max" => extreme(name, args, Ordering::Greater),
        "min" => extreme(name, args, Ordering::Less),
        "round" => round(args),
        "str" => Ok(Value::Str(
            optional_arg(name, args)?
                .map(|value| value.to_string())
                .unwrap_or_default(),
        )),
        _ => Err(EvalError::Name(name.to_string())),
    }
}

fn one_arg(name: &str, mut args: Vec<Value>) -> Result<Value> {
    if args.len() != 1 {
        return Err(EvalError::Type(format!(
            "{name}() takes exactly one argument ({} given)",
            args.len()
        )));
    }
    Ok(args.remove(0))
}

fn optional_arg(name: &str, mut args: Vec<Value>) -> Result<Option<Value>> {
    match args.len() {
        0 => Ok(None),
        1 => Ok(Some(args.remove(0))),
        count => Err(EvalError::Type(format!(
            "{name}() takes at most 1 argument ({count} given)"
        ))),
    }
}

fn abs(value: Value) -> Result<Value> {
    match Number::of(&value) {
        Some(Number::Int(number)) => number
            .checked_abs()
            .map(Value::Int)
            .ok_or(EvalError::Overflow),
        Some(Number::Float(number)) => Ok(Value::Float(number.abs())),
        None => Err(EvalError::Type(format!(
            "bad operand type for abs(): '{}'",
            value.type_name()
        ))),
    }
}

fn len(value: Value) -> Result<Value> {
    let count = match &value {
        Value::Str(text) => text.chars().count(),
        Value::List(items) | Value::Tuple(items) => items.len(),
        Value::Dict(entries) => entries.len(),
        other => {
            return Err(EvalError::Type(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )))
        }
    };
    i64::try_from(count)
        .map(Value::Int)
        .map_err(|_| EvalError::Overflow)
}

fn iterate(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::List(items) | Value::Tuple(items) => Ok(items),
        Value::Str(text) => Ok(text.chars().map(|ch| Value::Str(ch.to_string())).collect()),
        Value::Dict(entries) => Ok(entries.into_iter().map(|(key, _)| Value::Str(key)).collect()),
        other => Err(EvalError::Type(format!(
            "'{}' object is not iterable",
            other.type_name()
        ))),
    }
}

/// `min`/`max`: the first element that no other element beats in `wanted`.
fn extreme(name: &str, args: Vec<Value>, wanted: Ordering) -> Result<Value> {
    let candidates = match args.len() {
        0 => {
            return Err(EvalError::Type(format!(
                "{name} expected at least 1 argument, got 0"
            )))
        }
        1 => iterate(args.into_iter().next().unwrap_or(Value::None))?,
        _ => args,
    };

    let op = if wanted == Ordering::Greater {
        CompareOp::Gt
    } else {
        CompareOp::Lt
    };
    let mut candidates = candidates.into_iter();
    let Some(mut best) = candidates.next() else {
        return Err(EvalError::Value(format!(
            "{name}() arg is an empty sequence"
        )));
    };
    for candidate in candidates {
        if partial_order(op, &candidate, &best)? == Some(wanted) {
            best = candidate;
        }
    }
    Ok(best)
}

fn round(args: Vec<Value>) -> Result<Value> {
    let mut args = args.into_iter();
    let (Some(value), digits, None) = (args.next(), args.next(), args.next()) else {
        return Err(EvalError::Type(
            "round() takes 1 or 2 arguments".to_string(),
        ));
    };

    let digits = match digits {
        None | Some(Value::None) => None,
        Some(other) => Some(as_int(&other).ok_or_else(|| {
            EvalError::Type(format!(
                "'{}' object cannot be interpreted as an integer",
                other.type_name()
            ))
        })?),
    };

    match (Number::of(&value), digits) {
        (Some(Number::Int(number)), None) => Ok(Value::Int(number)),
        (Some(Number::Int(number)), Some(digits)) => round_int(number, digits).map(Value::Int),
        (Some(Number::Float(number)), None) => float_to_int(number.round_ties_even()),
        (Some(Number::Float(number)), Some(digits)) => {
            let digits = i32::try_from(digits).map_err(|_| EvalError::Overflow)?;
            let scale = 10f64.powi(digits);
            if !scale.is_finite() || scale == 0.0 {
                return Ok(Value::Float(number));
            }
            Ok(Value::Float((number * scale).round_ties_even() / scale))
        }
        (None, _) => Err(EvalError::Type(format!(
            "type {} doesn't define __round__ method",
            value.type_name()
        ))),
    }
}

/// Rounds an integer to `digits` decimal places, half to even.
fn round_int(number: i64, digits: i64) -> Result<i64> {
    if digits >= 0 {
        return Ok(number);
    }
    let Some(step) = u32::try_from(-digits)
        .ok()
        .and_then(|power| 10i64.checked_pow(power))
    else {
        return Ok(0);
    };

    let remainder = number.rem_euclid(step);
    let base = number - remainder;
    let round_up = match (remainder * 2).cmp(&step) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => (base / step) % 2 != 0,
    };
    if round_up {
        base.checked_add(step).ok_or(EvalError::Overflow)
    } else {
        Ok(base)
    }
}

fn float_to_int(number: f64) -> Result<Value> {
    if number.is_nan() {
        return Err(EvalError::Value(
            "cannot convert float NaN to integer".to_string(),
        ));
    }
    if !number.is_finite() || number < i64::MIN as f64 || number >= i64::MAX as f64 {
        return Err(EvalError::Overflow);
    }
    Ok(Value::Int(number as i64))
}

fn to_int(value: Value) -> Result<Value> {
    match value {
        Value::Int(number) => Ok(Value::Int(number)),
        Value::Bool(flag) => Ok(Value::Int(i64::from(flag))),
        Value::Float(number) => float_to_int(number.trunc()),
        Value::Str(text) => text
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| {
                EvalError::Value(format!(
                    "invalid literal for int() with base 10: {}",
                    Value::Str(text.clone()).repr()
                ))
            }),
        other => Err(EvalError::Type(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn to_float(value: Value) -> Result<Value> {
    match value {
        Value::Float(number) => Ok(Value::Float(number)),
        Value::Int(number) => Ok(Value::Float(number as f64)),
        Value::Bool(flag) => Ok(Value::Float(if flag { 1.0 } else { 0.0 })),
        Value::Str(text) => text
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| {
                EvalError::Value(format!(
                    "could not convert string to float: {}",
                    Value::Str(text.clone()).repr()
                ))
            }),
        other => Err(EvalError::Type(format!(
            "float() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}
