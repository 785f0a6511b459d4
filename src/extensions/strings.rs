// ABOUTME: String extension functions exposed to Toy programs

use super::Extension;
use crate::error::RuntimeError;
use crate::value::{NativeFn, Value};

pub struct StringExtension;

impl Extension for StringExtension {
    fn name(&self) -> &'static str {
        "string"
    }

    fn functions(&self) -> Vec<NativeFn> {
        vec![
            NativeFn {
                name: "string_length",
                arity: 1,
                func: string_length,
            },
            NativeFn {
                name: "string_contains",
                arity: 2,
                func: string_contains,
            },
            NativeFn {
                name: "string_replace",
                arity: 3,
                func: string_replace,
            },
        ]
    }
}

fn expect_string<'a>(
    function: &str,
    args: &'a [Value],
    position: usize,
) -> Result<&'a str, RuntimeError> {
    match args.get(position) {
        Some(Value::Str(s)) => Ok(s),
        Some(other) => Err(RuntimeError::extension(
            function,
            format!("expected a string, got {}", other.type_name()),
        )),
        None => Err(RuntimeError::extension(function, "missing argument")),
    }
}

fn string_length(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = expect_string("string_length", args, 0)?;
    Ok(Value::Int(s.chars().count() as i64))
}

fn string_contains(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = expect_string("string_contains", args, 0)?;
    let needle = expect_string("string_contains", args, 1)?;
    Ok(Value::Bool(s.contains(needle)))
}

/// Replaces every occurrence of `old` with `new`.
fn string_replace(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = expect_string("string_replace", args, 0)?;
    let old = expect_string("string_replace", args, 1)?;
    let new = expect_string("string_replace", args, 2)?;
    Ok(Value::Str(s.replace(old, new)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::Str(text.to_string())
    }

    #[test]
    fn test_length() {
        assert_eq!(string_length(&[s("hello")]).unwrap(), Value::Int(5));
        assert_eq!(string_length(&[s("")]).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_contains() {
        assert_eq!(
            string_contains(&[s("hello world"), s("world")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            string_contains(&[s("hello"), s("x")]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_replace() {
        assert_eq!(
            string_replace(&[s("a-b-c"), s("-"), s("+")]).unwrap(),
            s("a+b+c")
        );
    }

    #[test]
    fn test_type_error() {
        let error = string_length(&[Value::Int(1)]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "string_length: expected a string, got number"
        );
    }
}
