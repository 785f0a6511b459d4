// ABOUTME: Runtime error and non-local control-flow types for the evaluator

use crate::value::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),

    #[error("Undefined property '{0}'.")]
    UndefinedProperty(String),

    #[error("Only instances have properties.")]
    NotAnInstance,

    #[error("Can only call functions and classes.")]
    NotCallable,

    #[error("Expected {expected} arguments but got {got}.")]
    ArityMismatch { expected: usize, got: usize },

    #[error("Division by zero.")]
    DivisionByZero,

    #[error("Modulo by zero.")]
    ModuloByZero,

    /// Arithmetic on operands that survive no numeric coercion, e.g.
    /// "Cannot subtract string and null."
    #[error("Cannot {operation} {left} and {right}.")]
    InvalidOperands {
        operation: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("Cannot compare {left} and {right} with {operator}.")]
    InvalidComparison {
        operator: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("Operand must be a number for '{operator}'.")]
    NumberOperand { operator: String },

    #[error("Repeat count must be a number.")]
    RepeatCount,

    #[error("Cannot delete undefined variable '{0}'.")]
    DeleteUndefinedVariable(String),

    #[error("Cannot delete undefined property '{0}'.")]
    DeleteUndefinedProperty(String),

    #[error("Can only delete object properties.")]
    DeleteNonInstance,

    #[error("Invalid delete target.")]
    InvalidDeleteTarget,

    #[error("Cannot return from top-level code.")]
    TopLevelReturn,

    /// Failure raised inside a host extension function
    #[error("{function}: {message}")]
    Extension { function: String, message: String },
}

impl RuntimeError {
    pub fn extension(function: &str, message: impl Into<String>) -> Self {
        RuntimeError::Extension {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

/// Non-local exits threaded through the evaluator. `Return` is a control-flow
/// signal consumed at the innermost function call, not an error; `Failure`
/// aborts the current top-level statement.
#[derive(Debug, Clone)]
pub enum Unwind {
    Return(Value),
    Failure(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Failure(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RuntimeError::UndefinedVariable("y".to_string()).to_string(),
            "Undefined variable 'y'."
        );
        assert_eq!(RuntimeError::DivisionByZero.to_string(), "Division by zero.");
        assert_eq!(
            RuntimeError::ArityMismatch { expected: 2, got: 3 }.to_string(),
            "Expected 2 arguments but got 3."
        );
        assert_eq!(
            RuntimeError::InvalidOperands {
                operation: "subtract",
                left: "string",
                right: "null",
            }
            .to_string(),
            "Cannot subtract string and null."
        );
        assert_eq!(
            RuntimeError::extension("math_pow", "expected a number").to_string(),
            "math_pow: expected a number"
        );
    }
}
