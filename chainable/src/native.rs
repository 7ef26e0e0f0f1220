//! Built-in methods of `valu3` values.
//!
//! A plain [`Value`] is [`Dispatchable`]: strings, arrays, objects and numbers
//! each carry a small static method table. This lets a chain call `upcase` or
//! `join` on the current value without any context, and lets a value serve as
//! a context itself (an array context answers `[]` with the state as index).
use crate::dispatch::{Callback, Dispatchable};
use crate::error::ChainError;
use regex::Regex;
use valu3::prelude::*;

type NativeResult = Result<Value, ChainError>;
type NativeFn = fn(&Value, &[Value], Option<Callback<'_>>) -> NativeResult;

struct NativeMethod {
    name: &'static str,
    min: usize,
    max: usize,
    call: NativeFn,
}

impl NativeMethod {
    const fn new(name: &'static str, min: usize, max: usize, call: NativeFn) -> Self {
        Self {
            name,
            min,
            max,
            call,
        }
    }

    fn accepts(&self, arity: usize) -> bool {
        arity >= self.min && arity <= self.max
    }
}

const COMMON_METHODS: &[NativeMethod] = &[
    NativeMethod::new("to_string", 0, 0, common_to_string),
    NativeMethod::new("to_json", 0, 0, common_to_json),
    NativeMethod::new("is_null", 0, 0, common_is_null),
];

const STRING_METHODS: &[NativeMethod] = &[
    NativeMethod::new("upcase", 0, 0, string_upcase),
    NativeMethod::new("downcase", 0, 0, string_downcase),
    NativeMethod::new("capitalize", 0, 0, string_capitalize),
    NativeMethod::new("strip", 0, 0, string_strip),
    NativeMethod::new("trim", 0, 0, string_strip),
    NativeMethod::new("split", 0, 1, string_split),
    NativeMethod::new("chars", 0, 0, string_chars),
    NativeMethod::new("lines", 0, 0, string_lines),
    NativeMethod::new("len", 0, 0, string_len),
    NativeMethod::new("length", 0, 0, string_len),
    NativeMethod::new("size", 0, 0, string_len),
    NativeMethod::new("is_empty", 0, 0, string_is_empty),
    NativeMethod::new("reverse", 0, 0, string_reverse),
    NativeMethod::new("gsub", 2, 2, string_gsub),
    NativeMethod::new("replace", 2, 2, string_replace),
    NativeMethod::new("matches", 1, 1, string_matches),
    NativeMethod::new("contains", 1, 1, string_contains),
    NativeMethod::new("include", 1, 1, string_contains),
    NativeMethod::new("starts_with", 1, 1, string_starts_with),
    NativeMethod::new("ends_with", 1, 1, string_ends_with),
    NativeMethod::new("concat", 1, 1, string_concat),
    NativeMethod::new("+", 1, 1, string_concat),
    NativeMethod::new("to_number", 0, 0, string_to_number),
];

const ARRAY_METHODS: &[NativeMethod] = &[
    NativeMethod::new("first", 0, 0, array_first),
    NativeMethod::new("last", 0, 0, array_last),
    NativeMethod::new("len", 0, 0, array_len),
    NativeMethod::new("length", 0, 0, array_len),
    NativeMethod::new("size", 0, 0, array_len),
    NativeMethod::new("is_empty", 0, 0, array_is_empty),
    NativeMethod::new("join", 0, 1, array_join),
    NativeMethod::new("map", 0, 0, array_map),
    NativeMethod::new("filter", 0, 0, array_filter),
    NativeMethod::new("select", 0, 0, array_filter),
    NativeMethod::new("reject", 0, 0, array_reject),
    NativeMethod::new("find", 0, 0, array_find),
    NativeMethod::new("[]", 1, 1, array_index),
    NativeMethod::new("get", 1, 1, array_index),
    NativeMethod::new("at", 1, 1, array_index),
    NativeMethod::new("reverse", 0, 0, array_reverse),
    NativeMethod::new("contains", 1, 1, array_contains),
    NativeMethod::new("include", 1, 1, array_contains),
    NativeMethod::new("push", 1, 1, array_push),
    NativeMethod::new("concat", 1, 1, array_concat),
    NativeMethod::new("+", 1, 1, array_concat),
    NativeMethod::new("sum", 0, 0, array_sum),
];

const OBJECT_METHODS: &[NativeMethod] = &[
    NativeMethod::new("[]", 1, 1, object_get),
    NativeMethod::new("get", 1, 1, object_get),
    NativeMethod::new("has_key", 1, 1, object_has_key),
    NativeMethod::new("len", 0, 0, object_len),
    NativeMethod::new("length", 0, 0, object_len),
    NativeMethod::new("size", 0, 0, object_len),
    NativeMethod::new("is_empty", 0, 0, object_is_empty),
];

const NUMBER_METHODS: &[NativeMethod] = &[
    NativeMethod::new("+", 1, 1, number_add),
    NativeMethod::new("add", 1, 1, number_add),
    NativeMethod::new("-", 1, 1, number_sub),
    NativeMethod::new("sub", 1, 1, number_sub),
    NativeMethod::new("*", 1, 1, number_mul),
    NativeMethod::new("mul", 1, 1, number_mul),
    NativeMethod::new("/", 1, 1, number_div),
    NativeMethod::new("div", 1, 1, number_div),
    NativeMethod::new("abs", 0, 0, number_abs),
    NativeMethod::new("round", 0, 0, number_round),
    NativeMethod::new("floor", 0, 0, number_floor),
    NativeMethod::new("ceil", 0, 0, number_ceil),
];

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Null => "null",
        _ => "value",
    }
}

fn methods_for(value: &Value) -> &'static [NativeMethod] {
    match value {
        Value::String(_) => STRING_METHODS,
        Value::Number(_) => NUMBER_METHODS,
        Value::Array(_) => ARRAY_METHODS,
        Value::Object(_) => OBJECT_METHODS,
        _ => &[],
    }
}

/// Kind-specific methods shadow the common ones of the same name.
fn lookup(value: &Value, name: &str, arity: usize) -> Option<&'static NativeMethod> {
    methods_for(value)
        .iter()
        .chain(COMMON_METHODS.iter())
        .find(|method| method.name == name && method.accepts(arity))
}

impl Dispatchable for Value {
    fn supports(&self, name: &str, arity: usize) -> bool {
        lookup(self, name, arity).is_some()
    }

    fn responds_to(&self, name: &str) -> bool {
        methods_for(self)
            .iter()
            .chain(COMMON_METHODS.iter())
            .any(|method| method.name == name)
    }

    fn invoke(
        &self,
        name: &str,
        args: Vec<Value>,
        callback: Option<Callback<'_>>,
    ) -> Result<Value, ChainError> {
        match lookup(self, name, args.len()) {
            Some(method) => (method.call)(self, &args, callback),
            None => Err(ChainError::missing(name, args.len(), kind_of(self))),
        }
    }

    fn kind(&self) -> &'static str {
        kind_of(self)
    }
}

/// Plain text of a value: strings without quotes, everything else as displayed.
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.as_string(),
        other => other.to_string(),
    }
}

fn string_arg(name: &str, value: &Value) -> Result<String, ChainError> {
    match value {
        Value::String(s) => Ok(s.as_string()),
        other => Err(ChainError::invalid_argument(
            name,
            format!("expected a string, got {}", kind_of(other)),
        )),
    }
}

fn require_callback<'a>(
    name: &str,
    callback: Option<Callback<'a>>,
) -> Result<Callback<'a>, ChainError> {
    callback.ok_or_else(|| ChainError::invalid_argument(name, "a callback is required"))
}

fn items(value: &Value) -> &[Value] {
    match value {
        Value::Array(array) => &array.values,
        _ => &[],
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        other => other.as_bool().map(|b| *b).unwrap_or(true),
    }
}

fn common_to_string(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok(text(receiver).to_value())
}

fn common_to_json(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok(receiver.to_json(JsonMode::Inline).to_value())
}

fn common_is_null(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok(receiver.is_null().to_value())
}

fn string_upcase(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok(receiver.as_str().to_uppercase().to_value())
}

fn string_downcase(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok(receiver.as_str().to_lowercase().to_value())
}

fn string_capitalize(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let mut chars = receiver.as_str().chars();
    let capitalized = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    };

    Ok(capitalized.to_value())
}

fn string_strip(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok(receiver.as_str().trim().to_value())
}

fn string_split(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let target = receiver.as_str();
    let parts: Vec<Value> = match args.first() {
        Some(separator) => {
            let separator = string_arg("split", separator)?;
            if separator == " " {
                target.split_whitespace().map(|part| part.to_value()).collect()
            } else {
                target.split(separator.as_str()).map(|part| part.to_value()).collect()
            }
        }
        None => target.split_whitespace().map(|part| part.to_value()).collect(),
    };

    Ok(parts.to_value())
}

fn string_chars(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let chars: Vec<Value> = receiver
        .as_str()
        .chars()
        .map(|c| c.to_string().to_value())
        .collect();

    Ok(chars.to_value())
}

fn string_lines(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let lines: Vec<Value> = receiver.as_str().lines().map(|line| line.to_value()).collect();

    Ok(lines.to_value())
}

fn string_len(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok((receiver.as_str().chars().count() as i64).to_value())
}

fn string_is_empty(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok(receiver.as_str().is_empty().to_value())
}

fn string_reverse(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok(receiver.as_str().chars().rev().collect::<String>().to_value())
}

fn string_gsub(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let pattern = string_arg("gsub", &args[0])?;
    let replacement = string_arg("gsub", &args[1])?;
    let re = Regex::new(&pattern)?;

    Ok(re
        .replace_all(receiver.as_str(), replacement.as_str())
        .to_string()
        .to_value())
}

fn string_replace(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let from = string_arg("replace", &args[0])?;
    let to = string_arg("replace", &args[1])?;

    Ok(receiver.as_str().replace(from.as_str(), to.as_str()).to_value())
}

fn string_matches(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let pattern = string_arg("matches", &args[0])?;
    let re = Regex::new(&pattern)?;

    Ok(re.is_match(receiver.as_str()).to_value())
}

fn string_contains(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let other = string_arg("contains", &args[0])?;

    Ok(receiver.as_str().contains(other.as_str()).to_value())
}

fn string_starts_with(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let other = string_arg("starts_with", &args[0])?;

    Ok(receiver.as_str().starts_with(other.as_str()).to_value())
}

fn string_ends_with(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let other = string_arg("ends_with", &args[0])?;

    Ok(receiver.as_str().ends_with(other.as_str()).to_value())
}

fn string_concat(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok(format!("{}{}", receiver.as_str(), text(&args[0])).to_value())
}

fn string_to_number(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let raw = receiver.as_str().trim();

    if let Ok(int) = raw.parse::<i64>() {
        return Ok(int.to_value());
    }

    match raw.parse::<f64>() {
        Ok(float) => Ok(float.to_value()),
        Err(_) => Err(ChainError::invalid_argument(
            "to_number",
            format!("`{}` is not a number", raw),
        )),
    }
}

fn array_first(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok(items(receiver).first().cloned().unwrap_or(Value::Null))
}

fn array_last(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok(items(receiver).last().cloned().unwrap_or(Value::Null))
}

fn array_len(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok((items(receiver).len() as i64).to_value())
}

fn array_is_empty(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok(items(receiver).is_empty().to_value())
}

fn array_join(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let separator = match args.first() {
        Some(separator) => string_arg("join", separator)?,
        None => String::new(),
    };
    let parts: Vec<String> = items(receiver).iter().map(text).collect();

    Ok(parts.join(&separator).to_value())
}

fn array_map(receiver: &Value, _: &[Value], callback: Option<Callback<'_>>) -> NativeResult {
    let callback = require_callback("map", callback)?;
    let mapped = items(receiver)
        .iter()
        .map(|item| callback(item.clone()))
        .collect::<Result<Vec<Value>, ChainError>>()?;

    Ok(mapped.to_value())
}

fn array_filter(receiver: &Value, _: &[Value], callback: Option<Callback<'_>>) -> NativeResult {
    let callback = require_callback("filter", callback)?;
    let mut kept = Vec::new();

    for item in items(receiver) {
        if truthy(&callback(item.clone())?) {
            kept.push(item.clone());
        }
    }

    Ok(kept.to_value())
}

fn array_reject(receiver: &Value, _: &[Value], callback: Option<Callback<'_>>) -> NativeResult {
    let callback = require_callback("reject", callback)?;
    let mut kept = Vec::new();

    for item in items(receiver) {
        if !truthy(&callback(item.clone())?) {
            kept.push(item.clone());
        }
    }

    Ok(kept.to_value())
}

fn array_find(receiver: &Value, _: &[Value], callback: Option<Callback<'_>>) -> NativeResult {
    let callback = require_callback("find", callback)?;

    for item in items(receiver) {
        if truthy(&callback(item.clone())?) {
            return Ok(item.clone());
        }
    }

    Ok(Value::Null)
}

fn array_index(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let values = items(receiver);
    let index = match &args[0] {
        Value::Number(_) => args[0].to_i64(),
        _ => None,
    };
    let index = index.ok_or_else(|| {
        ChainError::invalid_argument(
            "[]",
            format!("expected an integer index, got {}", kind_of(&args[0])),
        )
    })?;

    // negative indexes count from the end
    let position = if index < 0 {
        values.len() as i64 + index
    } else {
        index
    };

    if position < 0 {
        return Ok(Value::Null);
    }

    Ok(values.get(position as usize).cloned().unwrap_or(Value::Null))
}

fn array_reverse(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let reversed: Vec<Value> = items(receiver).iter().rev().cloned().collect();

    Ok(reversed.to_value())
}

fn array_contains(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    Ok(items(receiver).iter().any(|item| item == &args[0]).to_value())
}

fn array_push(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let mut pushed = items(receiver).to_vec();
    pushed.push(args[0].clone());

    Ok(pushed.to_value())
}

fn array_concat(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let other = match &args[0] {
        Value::Array(_) => items(&args[0]),
        other => {
            return Err(ChainError::invalid_argument(
                "concat",
                format!("expected an array, got {}", kind_of(other)),
            ))
        }
    };
    let mut joined = items(receiver).to_vec();
    joined.extend(other.iter().cloned());

    Ok(joined.to_value())
}

fn array_sum(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let mut total = Numeric::Int(0);

    for item in items(receiver) {
        total = total.combine(numeric("sum", item)?, i64::checked_add, |a, b| a + b, "sum")?;
    }

    Ok(total.to_value())
}

fn object_get(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let key = text(&args[0]);

    Ok(receiver.get(key.as_str()).cloned().unwrap_or(Value::Null))
}

fn object_has_key(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let key = text(&args[0]);

    Ok(receiver.get(key.as_str()).is_some().to_value())
}

fn object_len(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let len = match receiver {
        Value::Object(object) => object.len(),
        _ => 0,
    };

    Ok((len as i64).to_value())
}

fn object_is_empty(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    let empty = match receiver {
        Value::Object(object) => object.len() == 0,
        _ => true,
    };

    Ok(empty.to_value())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(int) => int as f64,
            Numeric::Float(float) => float,
        }
    }

    /// Integer arithmetic while both sides are integers, float otherwise.
    fn combine(
        self,
        other: Numeric,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
        name: &str,
    ) -> Result<Numeric, ChainError> {
        match (self, other) {
            (Numeric::Int(left), Numeric::Int(right)) => {
                int_op(left, right).map(Numeric::Int).ok_or_else(|| {
                    ChainError::invalid_argument(name, "integer overflow or division by zero")
                })
            }
            (left, right) => Ok(Numeric::Float(float_op(left.as_f64(), right.as_f64()))),
        }
    }

    fn to_value(self) -> Value {
        match self {
            Numeric::Int(int) => int.to_value(),
            Numeric::Float(float) => float.to_value(),
        }
    }
}

fn numeric(name: &str, value: &Value) -> Result<Numeric, ChainError> {
    let parsed = match value {
        Value::Number(number) if number.is_float() => value.to_f64().map(Numeric::Float),
        Value::Number(_) => value
            .to_i64()
            .map(Numeric::Int)
            .or_else(|| value.to_f64().map(Numeric::Float)),
        _ => None,
    };

    parsed.ok_or_else(|| {
        ChainError::invalid_argument(name, format!("expected a number, got {}", kind_of(value)))
    })
}

fn arithmetic(
    name: &str,
    receiver: &Value,
    other: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, ChainError> {
    let left = numeric(name, receiver)?;
    let right = numeric(name, other)?;

    Ok(left.combine(right, int_op, float_op, name)?.to_value())
}

fn number_add(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    arithmetic("+", receiver, &args[0], i64::checked_add, |a, b| a + b)
}

fn number_sub(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    arithmetic("-", receiver, &args[0], i64::checked_sub, |a, b| a - b)
}

fn number_mul(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    arithmetic("*", receiver, &args[0], i64::checked_mul, |a, b| a * b)
}

fn number_div(receiver: &Value, args: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    arithmetic("/", receiver, &args[0], i64::checked_div, |a, b| a / b)
}

fn number_abs(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    match numeric("abs", receiver)? {
        Numeric::Int(int) => int
            .checked_abs()
            .map(|abs| abs.to_value())
            .ok_or_else(|| ChainError::invalid_argument("abs", "integer overflow")),
        Numeric::Float(float) => Ok(float.abs().to_value()),
    }
}

fn float_rounding(name: &str, receiver: &Value, op: fn(f64) -> f64) -> NativeResult {
    match numeric(name, receiver)? {
        Numeric::Int(int) => Ok(int.to_value()),
        Numeric::Float(float) => {
            let rounded = op(float);
            // i64::MAX as f64 is 2^63, one past the largest i64
            if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
                Ok((rounded as i64).to_value())
            } else {
                Err(ChainError::invalid_argument(
                    name,
                    format!("{} does not fit in an integer", float),
                ))
            }
        }
    }
}

fn number_round(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    float_rounding("round", receiver, f64::round)
}

fn number_floor(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    float_rounding("floor", receiver, f64::floor)
}

fn number_ceil(receiver: &Value, _: &[Value], _: Option<Callback<'_>>) -> NativeResult {
    float_rounding("ceil", receiver, f64::ceil)
}
