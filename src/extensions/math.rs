// ABOUTME: Math extension functions exposed to Toy programs

use super::Extension;
use crate::error::RuntimeError;
use crate::value::{NativeFn, Value};

pub struct MathExtension;

impl Extension for MathExtension {
    fn name(&self) -> &'static str {
        "math"
    }

    fn functions(&self) -> Vec<NativeFn> {
        vec![
            NativeFn {
                name: "math_pow",
                arity: 2,
                func: math_pow,
            },
            NativeFn {
                name: "math_sqrt",
                arity: 1,
                func: math_sqrt,
            },
            NativeFn {
                name: "math_abs",
                arity: 1,
                func: math_abs,
            },
        ]
    }
}

fn expect_number(function: &str, args: &[Value], position: usize) -> Result<f64, RuntimeError> {
    match args.get(position) {
        Some(Value::Int(n)) => Ok(*n as f64),
        Some(Value::Float(f)) => Ok(*f),
        Some(other) => Err(RuntimeError::extension(
            function,
            format!("expected a number, got {}", other.type_name()),
        )),
        None => Err(RuntimeError::extension(function, "missing argument")),
    }
}

/// base raised to the power of exponent
fn math_pow(args: &[Value]) -> Result<Value, RuntimeError> {
    let base = expect_number("math_pow", args, 0)?;
    let exponent = expect_number("math_pow", args, 1)?;
    Ok(Value::Float(base.powf(exponent)))
}

fn math_sqrt(args: &[Value]) -> Result<Value, RuntimeError> {
    let x = expect_number("math_sqrt", args, 0)?;
    Ok(Value::Float(x.sqrt()))
}

/// Absolute value; integers stay integers.
fn math_abs(args: &[Value]) -> Result<Value, RuntimeError> {
    match args.first() {
        Some(Value::Int(n)) => Ok(n
            .checked_abs()
            .map(Value::Int)
            .unwrap_or(Value::Float(-(*n as f64)))),
        Some(Value::Float(f)) => Ok(Value::Float(f.abs())),
        Some(other) => Err(RuntimeError::extension(
            "math_abs",
            format!("expected a number, got {}", other.type_name()),
        )),
        None => Err(RuntimeError::extension("math_abs", "missing argument")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow() {
        let result = math_pow(&[Value::Int(2), Value::Int(3)]).unwrap();
        assert_eq!(result, Value::Float(8.0));
        assert_eq!(format!("{}", result), "8");
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(
            math_sqrt(&[Value::Int(16)]).unwrap(),
            Value::Float(4.0)
        );
    }

    #[test]
    fn test_abs() {
        assert_eq!(math_abs(&[Value::Int(-5)]).unwrap(), Value::Int(5));
        assert_eq!(math_abs(&[Value::Float(-2.5)]).unwrap(), Value::Float(2.5));
    }

    #[test]
    fn test_type_error_carries_function_name() {
        let error = math_pow(&[Value::Str("x".to_string()), Value::Int(2)]).unwrap_err();
        assert_eq!(error.to_string(), "math_pow: expected a number, got string");
    }
}
