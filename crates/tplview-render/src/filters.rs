//! MiniJinja filter registration.

use minijinja::{Environment, Error, ErrorKind, Value};

/// Registers the preview filters on a minijinja environment.
///
/// These complement the MiniJinja built-ins with the string and arithmetic
/// helpers template authors coming from Liquid expect:
///
/// | Filter | Example | Result |
/// |--------|---------|--------|
/// | `prepend(s)` | `{{ "b" \| prepend("a") }}` | `ab` |
/// | `append(s)` | `{{ "a" \| append("b") }}` | `ab` |
/// | `plus(n)` | `{{ "100" \| plus(1) }}` | `101` |
/// | `minus(n)` | `{{ 5 \| minus(3) }}` | `2` |
/// | `size` | `{{ [1, 2] \| size }}` | `2` |
///
/// `plus` and `minus` accept numeric strings, since XML content only ever
/// contains strings.
pub fn register_filters(env: &mut Environment<'static>) {
    env.add_filter("prepend", |value: Value, prefix: Value| -> String {
        format!("{}{}", prefix, value)
    });

    env.add_filter("append", |value: Value, suffix: Value| -> String {
        format!("{}{}", value, suffix)
    });

    env.add_filter("plus", |value: Value, other: Value| -> Result<Value, Error> {
        arithmetic(&value, &other, "plus", i64::checked_add, |a, b| a + b)
    });

    env.add_filter("minus", |value: Value, other: Value| -> Result<Value, Error> {
        arithmetic(&value, &other, "minus", i64::checked_sub, |a, b| a - b)
    });

    env.add_filter("size", |value: Value| -> usize { value.len().unwrap_or(0) });
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

// Numbers go through their display form so `2.0` stays a float.
fn to_number(value: &Value) -> Option<Number> {
    let text = match value.as_str() {
        Some(s) => s.trim().to_string(),
        None if value.is_number() => value.to_string(),
        None => return None,
    };
    text.parse::<i64>()
        .map(Number::Int)
        .or_else(|_| text.parse::<f64>().map(Number::Float))
        .ok()
}

fn arithmetic(
    value: &Value,
    other: &Value,
    name: &str,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, Error> {
    let (a, b) = match (to_number(value), to_number(other)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("`{}` needs numbers, got {} and {}", name, value, other),
            ))
        }
    };

    if let (Number::Int(a), Number::Int(b)) = (a, b) {
        if let Some(result) = int_op(a, b) {
            return Ok(Value::from(result));
        }
    }
    Ok(Value::from(float_op(a.as_f64(), b.as_f64())))
}
