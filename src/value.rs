// ABOUTME: Runtime value representation and callable objects for the evaluator

use crate::ast::{FunctionDecl, LambdaDecl};
use crate::env::Environment;
use crate::error::RuntimeError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Function(Arc<Function>),
    Lambda(Arc<Lambda>),
    Class(Arc<Class>),
    Instance(Arc<Instance>),
    Method(Arc<BoundMethod>),
    Extension(NativeFn),
}

/// A user-declared function: its AST declaration plus the environment that
/// was active at its declaration site.
#[derive(Debug)]
pub struct Function {
    pub declaration: Arc<FunctionDecl>,
    pub closure: Arc<Environment>,
}

impl Function {
    /// Produces a copy of this function whose closure has `this` bound to the
    /// receiver, so the body resolves `this` at call time.
    pub fn bind(&self, instance: Arc<Instance>) -> Arc<Function> {
        let environment = Environment::with_enclosing(self.closure.clone());
        environment.define("this", Value::Instance(instance));
        Arc::new(Function {
            declaration: self.declaration.clone(),
            closure: environment,
        })
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }
}

/// A lambda: an expression body plus its captured environment.
#[derive(Debug)]
pub struct Lambda {
    pub declaration: Arc<LambdaDecl>,
    pub closure: Arc<Environment>,
}

impl Lambda {
    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }
}

/// A class value: the constructor callable. Method lookup is a single-level
/// map lookup; there is no superclass chain.
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub methods: HashMap<String, Arc<Function>>,
}

impl Class {
    pub fn find_method(&self, name: &str) -> Option<Arc<Function>> {
        self.methods.get(name).cloned()
    }

    /// A class's arity is its `init` method's arity, or zero without one.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }
}

/// An object created by calling a class. Field state is shared by every
/// holder of the instance, so the map is guarded by its own lock.
#[derive(Debug)]
pub struct Instance {
    pub class: Arc<Class>,
    fields: Mutex<HashMap<String, Value>>,
}

impl Instance {
    pub fn new(class: Arc<Class>) -> Arc<Self> {
        Arc::new(Instance {
            class,
            fields: Mutex::new(HashMap::new()),
        })
    }

    /// Property reads search fields first, then the class's method table,
    /// returning a freshly bound method when one is found.
    pub fn get(instance: &Arc<Instance>, name: &str) -> Result<Value, RuntimeError> {
        if let Some(value) = instance.fields.lock().get(name) {
            return Ok(value.clone());
        }

        if let Some(method) = instance.class.find_method(name) {
            return Ok(Value::Method(Arc::new(BoundMethod {
                instance: instance.clone(),
                method,
            })));
        }

        Err(RuntimeError::UndefinedProperty(name.to_string()))
    }

    /// Property writes always land in the field map.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.fields.lock().insert(name.into(), value);
    }

    /// `delete` tombstones an existing field to null; a missing field fails.
    pub fn delete(&self, name: &str) -> Result<(), RuntimeError> {
        let mut fields = self.fields.lock();
        if fields.contains_key(name) {
            fields.insert(name.to_string(), Value::Null);
            Ok(())
        } else {
            Err(RuntimeError::DeleteUndefinedProperty(name.to_string()))
        }
    }
}

/// A method read off an instance; invoking it binds `this` to that instance.
#[derive(Debug)]
pub struct BoundMethod {
    pub instance: Arc<Instance>,
    pub method: Arc<Function>,
}

impl BoundMethod {
    pub fn arity(&self) -> usize {
        self.method.arity()
    }
}

/// A host-provided callable registered through the extension registry.
#[derive(Clone, Copy)]
pub struct NativeFn {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&[Value]) -> Result<Value, RuntimeError>,
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// A coerced numeric operand. Integer pairs keep integer arithmetic; anything
/// mixed promotes to float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(n) => n == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::Str(_) => "string",
            Value::Function(_) | Value::Lambda(_) | Value::Method(_) | Value::Extension(_) => {
                "function"
            }
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
        }
    }

    /// Truthiness is total: null is false, booleans are themselves, numbers
    /// are non-zero, strings are non-empty, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Lenient numeric coercion: numbers pass through, booleans count as
    /// 1 and 0, strings are parsed as floats. Everything else refuses.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Str(s) => s.trim().parse::<f64>().ok().map(Number::Float),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Structural equality: numbers compare numerically across the int/float
    /// split, nulls are equal to each other only, and callables, classes and
    /// instances compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Lambda(a), Value::Lambda(b)) => Arc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Arc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Arc::ptr_eq(a, b),
            (Value::Method(a), Value::Method(b)) => Arc::ptr_eq(a, b),
            (Value::Extension(a), Value::Extension(b)) => a.func == b.func,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => {
                // Whole-valued floats print in integer form
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::Function(function) => {
                write!(f, "<function {}>", function.declaration.name.lexeme)
            }
            Value::Lambda(_) => write!(f, "<lambda function>"),
            Value::Class(class) => write!(f, "<class {}>", class.name),
            Value::Instance(instance) => write!(f, "<instance of {}>", instance.class.name),
            Value::Method(method) => write!(
                f,
                "<method {} of <instance of {}>>",
                method.method.declaration.name.lexeme, method.instance.class.name
            ),
            Value::Extension(native) => write!(f, "<extension function {}>", native.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, TokenKind};

    fn class_named(name: &str) -> Arc<Class> {
        Arc::new(Class {
            name: name.to_string(),
            methods: HashMap::new(),
        })
    }

    #[test]
    fn test_number_display() {
        assert_eq!(format!("{}", Value::Int(42)), "42");
        assert_eq!(format!("{}", Value::Float(2.5)), "2.5");
        assert_eq!(format!("{}", Value::Float(4.0)), "4");
        assert_eq!(format!("{}", Value::Float(-0.0)), "0");
    }

    #[test]
    fn test_null_and_bool_display() {
        assert_eq!(format!("{}", Value::Null), "null");
        assert_eq!(format!("{}", Value::Bool(true)), "true");
        assert_eq!(format!("{}", Value::Bool(false)), "false");
    }

    #[test]
    fn test_string_display_is_raw() {
        assert_eq!(format!("{}", Value::Str("hi".to_string())), "hi");
    }

    #[test]
    fn test_class_and_instance_display() {
        let class = class_named("Person");
        assert_eq!(format!("{}", Value::Class(class.clone())), "<class Person>");
        let instance = Instance::new(class);
        assert_eq!(
            format!("{}", Value::Instance(instance)),
            "<instance of Person>"
        );
    }

    #[test]
    fn test_truthiness_table() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(-3).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(Value::Float(0.5).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(Value::Str("x".to_string()).is_truthy());
        assert!(Value::Class(class_named("C")).is_truthy());
        assert!(Value::Instance(Instance::new(class_named("C"))).is_truthy());
    }

    #[test]
    fn test_equality() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Null, Value::Int(0));
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Str("1".to_string()), Value::Int(1));

        let a = Instance::new(class_named("C"));
        let b = Instance::new(class_named("C"));
        assert_eq!(Value::Instance(a.clone()), Value::Instance(a.clone()));
        assert_ne!(Value::Instance(a), Value::Instance(b));
    }

    #[test]
    fn test_lenient_numeric_coercion() {
        assert_eq!(Value::Int(3).as_number(), Some(Number::Int(3)));
        assert_eq!(Value::Bool(true).as_number(), Some(Number::Int(1)));
        assert_eq!(
            Value::Str("2.5".to_string()).as_number(),
            Some(Number::Float(2.5))
        );
        assert_eq!(Value::Str("nope".to_string()).as_number(), None);
        assert_eq!(Value::Null.as_number(), None);
    }

    #[test]
    fn test_instance_fields_and_delete() {
        let instance = Instance::new(class_named("Box"));
        instance.set("data", Value::Int(7));
        assert_eq!(Instance::get(&instance, "data"), Ok(Value::Int(7)));

        instance.delete("data").unwrap();
        // Deleted fields read back as null rather than failing
        assert_eq!(Instance::get(&instance, "data"), Ok(Value::Null));

        assert_eq!(
            instance.delete("missing"),
            Err(RuntimeError::DeleteUndefinedProperty("missing".to_string()))
        );
    }

    #[test]
    fn test_undefined_property_read_fails() {
        let instance = Instance::new(class_named("Box"));
        assert_eq!(
            Instance::get(&instance, "ghost"),
            Err(RuntimeError::UndefinedProperty("ghost".to_string()))
        );
    }

    #[test]
    fn test_bound_method_display() {
        let declaration = Arc::new(crate::ast::FunctionDecl {
            name: Token::new(TokenKind::Identifier, "greet", None, 1),
            params: vec![],
            body: vec![],
        });
        let method = Arc::new(Function {
            declaration,
            closure: Environment::new(),
        });
        let mut methods = HashMap::new();
        methods.insert("greet".to_string(), method.clone());
        let class = Arc::new(Class {
            name: "Person".to_string(),
            methods,
        });
        let instance = Instance::new(class);
        let bound = Instance::get(&instance, "greet").unwrap();
        assert_eq!(
            format!("{}", bound),
            "<method greet of <instance of Person>>"
        );
    }
}
