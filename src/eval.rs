// ABOUTME: Tree-walking evaluator executing Toy statements against an environment chain

use crate::ast::{Expr, LiteralValue, Stmt};
use crate::env::Environment;
use crate::error::{RuntimeError, Unwind};
use crate::token::{Token, TokenKind};
use crate::value::{Class, Function, Instance, Lambda, Number, Value};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;

type Output = Arc<Mutex<Box<dyn Write + Send>>>;

/// Executes statements for side effects and evaluates expressions to values,
/// against a current environment that is rebound on scope entry and exit.
pub struct Interpreter {
    globals: Arc<Environment>,
    environment: Arc<Environment>,
    out: Output,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::with_output(Box::new(io::stdout()))
    }

    /// Builds an interpreter that writes `print` output to the given sink.
    pub fn with_output(out: Box<dyn Write + Send>) -> Self {
        let globals = Environment::new();
        Interpreter {
            environment: globals.clone(),
            globals,
            out: Arc::new(Mutex::new(out)),
        }
    }

    /// The fixed globals environment, shared across every run and REPL line.
    pub fn globals(&self) -> &Arc<Environment> {
        &self.globals
    }

    /// A sibling interpreter over the same globals, current environment, and
    /// output sink, for running a `parallel` branch on another thread.
    fn branch(&self) -> Interpreter {
        Interpreter {
            globals: self.globals.clone(),
            environment: self.environment.clone(),
            out: self.out.clone(),
        }
    }

    /// Runs a program. A runtime failure aborts the remaining top-level
    /// statements; a `return` reaching this level is itself a failure.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}
                Err(Unwind::Return(_)) => return Err(RuntimeError::TopLevelReturn),
                Err(Unwind::Failure(error)) => return Err(error),
            }
        }
        Ok(())
    }

    fn execute(&mut self, statement: &Stmt) -> Result<(), Unwind> {
        match statement {
            Stmt::Expression(expression) => {
                self.evaluate(expression)?;
                Ok(())
            }
            Stmt::Print(expression) => {
                let value = self.evaluate(expression)?;
                let _ = writeln!(self.out.lock(), "{}", value);
                Ok(())
            }
            Stmt::Let { name, initializer } => {
                let value = match initializer {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::Null,
                };
                self.environment.define(name.lexeme.clone(), value);
                Ok(())
            }
            Stmt::Block(statements) => {
                let environment = Environment::with_enclosing(self.environment.clone());
                self.execute_block(statements, environment)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
            Stmt::Function(declaration) => {
                let function = Value::Function(Arc::new(Function {
                    declaration: declaration.clone(),
                    closure: self.environment.clone(),
                }));
                self.environment.define(declaration.name.lexeme.clone(), function);
                Ok(())
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::Null,
                };
                Err(Unwind::Return(value))
            }
            Stmt::Class { name, methods } => {
                // Defined to null first so methods can mention the class name
                // and resolve it at call time.
                self.environment.define(name.lexeme.clone(), Value::Null);

                let mut table = HashMap::new();
                for method in methods {
                    let function = Arc::new(Function {
                        declaration: method.clone(),
                        closure: self.environment.clone(),
                    });
                    table.insert(method.name.lexeme.clone(), function);
                }

                let class = Value::Class(Arc::new(Class {
                    name: name.lexeme.clone(),
                    methods: table,
                }));
                self.environment.assign(&name.lexeme, class)?;
                Ok(())
            }
            Stmt::Parallel(body) => self.execute_parallel(body),
            Stmt::Repeat { count, body } => {
                let count = match self.evaluate(count)? {
                    Value::Int(n) => n,
                    Value::Float(f) => f as i64,
                    _ => return Err(RuntimeError::RepeatCount.into()),
                };

                for _ in 0..count.max(0) {
                    for statement in body {
                        self.execute(statement)?;
                    }
                }
                Ok(())
            }
            Stmt::Delete { target } => self.execute_delete(target),
        }
    }

    fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Arc<Environment>,
    ) -> Result<(), Unwind> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = statements
            .iter()
            .try_for_each(|statement| self.execute(statement));
        self.environment = previous;
        result
    }

    /// Schedules each body statement on the worker pool and waits for all of
    /// them. Branch failures are reported after the join; siblings are never
    /// cancelled.
    fn execute_parallel(&mut self, body: &[Stmt]) -> Result<(), Unwind> {
        let (sender, receiver) = crossbeam_channel::unbounded();

        rayon::scope(|scope| {
            for statement in body {
                let sender = sender.clone();
                let mut branch = self.branch();
                scope.spawn(move |_| {
                    if let Err(unwind) = branch.execute(statement) {
                        let _ = sender.send(unwind);
                    }
                });
            }
        });
        drop(sender);

        for unwind in receiver {
            let error = match unwind {
                Unwind::Failure(error) => error,
                Unwind::Return(_) => RuntimeError::TopLevelReturn,
            };
            eprintln!("Error in parallel execution: {}", error);
        }
        Ok(())
    }

    fn execute_delete(&mut self, target: &Expr) -> Result<(), Unwind> {
        match target {
            // A deleted binding is set to null in its owning scope; reads
            // afterwards yield null rather than failing.
            Expr::Variable { name } => {
                if self.environment.assign(&name.lexeme, Value::Null).is_err() {
                    return Err(RuntimeError::DeleteUndefinedVariable(name.lexeme.clone()).into());
                }
                Ok(())
            }
            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    instance.delete(&name.lexeme).map_err(Unwind::from)
                }
                _ => Err(RuntimeError::DeleteNonInstance.into()),
            },
            _ => Err(RuntimeError::InvalidDeleteTarget.into()),
        }
    }

    fn evaluate(&mut self, expression: &Expr) -> Result<Value, Unwind> {
        match expression {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Null => Value::Null,
                LiteralValue::Int(n) => Value::Int(*n),
                LiteralValue::Float(f) => Value::Float(*f),
                LiteralValue::Str(s) => Value::Str(s.clone()),
            }),
            Expr::Variable { name } => self.environment.get(&name.lexeme).map_err(Unwind::from),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.assign(&name.lexeme, value.clone())?;
                Ok(value)
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(operator, left, right).map_err(Unwind::from)
            }
            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                unary(operator, right).map_err(Unwind::from)
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                let callee = self.evaluate(callee)?;
                let mut evaluated = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    evaluated.push(self.evaluate(argument)?);
                }
                self.call_value(callee, evaluated)
            }
            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    Instance::get(&instance, &name.lexeme).map_err(Unwind::from)
                }
                _ => Err(RuntimeError::NotAnInstance.into()),
            },
            Expr::Set {
                object,
                name,
                value,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value = self.evaluate(value)?;
                    instance.set(name.lexeme.clone(), value.clone());
                    Ok(value)
                }
                _ => Err(RuntimeError::NotAnInstance.into()),
            },
            Expr::Lambda(declaration) => Ok(Value::Lambda(Arc::new(Lambda {
                declaration: declaration.clone(),
                closure: self.environment.clone(),
            }))),
        }
    }

    /// Evaluated callee and arguments in hand: check callability and arity,
    /// then dispatch on the callable kind.
    fn call_value(&mut self, callee: Value, arguments: Vec<Value>) -> Result<Value, Unwind> {
        let arity = match &callee {
            Value::Function(function) => function.arity(),
            Value::Lambda(lambda) => lambda.arity(),
            Value::Class(class) => class.arity(),
            Value::Method(method) => method.arity(),
            Value::Extension(native) => native.arity,
            _ => return Err(RuntimeError::NotCallable.into()),
        };

        if arguments.len() != arity {
            return Err(RuntimeError::ArityMismatch {
                expected: arity,
                got: arguments.len(),
            }
            .into());
        }

        match callee {
            Value::Function(function) => self.call_function(&function, &arguments),
            Value::Lambda(lambda) => self.call_lambda(&lambda, &arguments),
            Value::Method(bound) => {
                let function = bound.method.bind(bound.instance.clone());
                self.call_function(&function, &arguments)
            }
            Value::Class(class) => {
                let instance = Instance::new(class.clone());
                if let Some(init) = class.find_method("init") {
                    let bound = init.bind(instance.clone());
                    self.call_function(&bound, &arguments)?;
                }
                // The call always produces the instance.
                Ok(Value::Instance(instance))
            }
            Value::Extension(native) => (native.func)(&arguments).map_err(Unwind::from),
            _ => Err(RuntimeError::NotCallable.into()),
        }
    }

    fn call_function(&mut self, function: &Function, arguments: &[Value]) -> Result<Value, Unwind> {
        let environment = Environment::with_enclosing(function.closure.clone());
        for (param, argument) in function.declaration.params.iter().zip(arguments) {
            environment.define(param.lexeme.clone(), argument.clone());
        }

        match self.execute_block(&function.declaration.body, environment) {
            Ok(()) => Ok(Value::Null),
            Err(Unwind::Return(value)) => Ok(value),
            Err(failure) => Err(failure),
        }
    }

    fn call_lambda(&mut self, lambda: &Lambda, arguments: &[Value]) -> Result<Value, Unwind> {
        let environment = Environment::with_enclosing(lambda.closure.clone());
        for (param, argument) in lambda.declaration.params.iter().zip(arguments) {
            environment.define(param.lexeme.clone(), argument.clone());
        }

        let previous = std::mem::replace(&mut self.environment, environment);
        let result = self.evaluate(&lambda.declaration.body);
        self.environment = previous;
        result
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

// ===== Operators =====

fn binary(operator: &Token, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match operator.kind {
        TokenKind::Plus => Ok(plus(left, right)),
        TokenKind::Minus => arithmetic("subtract", operator.kind, left, right),
        TokenKind::Multiply => arithmetic("multiply", operator.kind, left, right),
        TokenKind::Divide => arithmetic("divide", operator.kind, left, right),
        TokenKind::Modulo => arithmetic("compute modulo of", operator.kind, left, right),
        TokenKind::Greater | TokenKind::GreaterEqual | TokenKind::Less | TokenKind::LessEqual => {
            comparison(operator, left, right)
        }
        TokenKind::Equal => Ok(Value::Bool(left == right)),
        TokenKind::NotEqual => Ok(Value::Bool(left != right)),
        _ => unreachable!("parser only produces binary operators"),
    }
}

/// `+` never fails: a string operand means concatenation, numeric operands
/// mean addition, and anything that refuses numeric coercion falls back to
/// concatenation of the stringified operands.
fn plus(left: Value, right: Value) -> Value {
    if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
        return Value::Str(format!("{}{}", left, right));
    }

    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => number_add(a, b),
        _ => Value::Str(format!("{}{}", left, right)),
    }
}

fn arithmetic(
    operation: &'static str,
    kind: TokenKind,
    left: Value,
    right: Value,
) -> Result<Value, RuntimeError> {
    let (a, b) = match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(RuntimeError::InvalidOperands {
                operation,
                left: left.type_name(),
                right: right.type_name(),
            });
        }
    };

    match kind {
        TokenKind::Minus => Ok(number_sub(a, b)),
        TokenKind::Multiply => Ok(number_mul(a, b)),
        TokenKind::Divide => {
            if b.is_zero() {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(Value::Float(a.as_f64() / b.as_f64()))
        }
        TokenKind::Modulo => {
            if b.is_zero() {
                return Err(RuntimeError::ModuloByZero);
            }
            Ok(number_mod(a, b))
        }
        _ => unreachable!("arithmetic handles only - * / %"),
    }
}

fn comparison(operator: &Token, left: Value, right: Value) -> Result<Value, RuntimeError> {
    let (a, b) = match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => (a.as_f64(), b.as_f64()),
        _ => {
            return Err(RuntimeError::InvalidComparison {
                operator: operator.lexeme.clone(),
                left: left.type_name(),
                right: right.type_name(),
            });
        }
    };

    let result = match operator.kind {
        TokenKind::Greater => a > b,
        TokenKind::GreaterEqual => a >= b,
        TokenKind::Less => a < b,
        TokenKind::LessEqual => a <= b,
        _ => unreachable!("comparison handles only > >= < <="),
    };
    Ok(Value::Bool(result))
}

fn unary(operator: &Token, right: Value) -> Result<Value, RuntimeError> {
    match operator.kind {
        TokenKind::Minus => match right {
            Value::Int(n) => Ok(n
                .checked_neg()
                .map(Value::Int)
                .unwrap_or(Value::Float(-(n as f64)))),
            Value::Float(f) => Ok(Value::Float(-f)),
            _ => Err(RuntimeError::NumberOperand {
                operator: operator.lexeme.clone(),
            }),
        },
        TokenKind::Not => Ok(Value::Bool(!right.is_truthy())),
        _ => unreachable!("parser only produces unary - and !"),
    }
}

// Integer pairs stay integers; overflow and mixed operands promote to float.

fn number_add(a: Number, b: Number) -> Value {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x
            .checked_add(y)
            .map(Value::Int)
            .unwrap_or(Value::Float(x as f64 + y as f64)),
        _ => Value::Float(a.as_f64() + b.as_f64()),
    }
}

fn number_sub(a: Number, b: Number) -> Value {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x
            .checked_sub(y)
            .map(Value::Int)
            .unwrap_or(Value::Float(x as f64 - y as f64)),
        _ => Value::Float(a.as_f64() - b.as_f64()),
    }
}

fn number_mul(a: Number, b: Number) -> Value {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x
            .checked_mul(y)
            .map(Value::Int)
            .unwrap_or(Value::Float(x as f64 * y as f64)),
        _ => Value::Float(a.as_f64() * b.as_f64()),
    }
}

/// Floored modulo: the result carries the sign of the divisor.
fn number_mod(a: Number, b: Number) -> Value {
    if let (Number::Int(x), Number::Int(y)) = (a, b) {
        if let Some(r) = x.checked_rem(y) {
            let r = if r != 0 && (r < 0) != (y < 0) { r + y } else { r };
            return Value::Int(r);
        }
    }
    let (x, y) = (a.as_f64(), b.as_f64());
    Value::Float(x - y * (x / y).floor())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run(source: &str) -> (String, Result<(), RuntimeError>) {
        let (tokens, lex_diagnostics) = Lexer::new(source).scan_tokens();
        assert!(lex_diagnostics.is_empty(), "lexical errors: {:?}", lex_diagnostics);
        let (statements, parse_diagnostics) = parser::parse(tokens);
        assert!(parse_diagnostics.is_empty(), "parse errors: {:?}", parse_diagnostics);

        let capture = Capture::default();
        let mut interpreter = Interpreter::with_output(Box::new(capture.clone()));
        let result = interpreter.interpret(&statements);
        let output = String::from_utf8(capture.0.lock().clone()).unwrap();
        (output, result)
    }

    fn run_ok(source: &str) -> String {
        let (output, result) = run(source);
        assert_eq!(result, Ok(()), "unexpected runtime failure");
        output
    }

    fn run_err(source: &str) -> RuntimeError {
        let (_, result) = run(source);
        result.expect_err("expected a runtime failure")
    }

    #[test]
    fn test_expression_evaluation() {
        assert_eq!(run_ok("print 2 * (3 + 4);"), "14\n");
    }

    #[test]
    fn test_while_loop() {
        let output = run_ok("let i = 0; while (i < 3) { print i; i = i + 1; }");
        assert_eq!(output, "0\n1\n2\n");
    }

    #[test]
    fn test_function_and_return() {
        let output = run_ok("function square(x) { return x * x; } print square(5);");
        assert_eq!(output, "25\n");
    }

    #[test]
    fn test_function_without_return_yields_null() {
        assert_eq!(run_ok("function f() { } print f();"), "null\n");
    }

    #[test]
    fn test_closure_counter() {
        let output = run_ok(
            "function make() { let n = 0; function inc() { n = n + 1; return n; } return inc; } \
             let c = make(); print c(); print c(); print c();",
        );
        assert_eq!(output, "1\n2\n3\n");
    }

    #[test]
    fn test_closure_sees_later_mutation() {
        let output = run_ok("let x = 1; function show() { print x; } x = 2; show();");
        assert_eq!(output, "2\n");
    }

    #[test]
    fn test_block_scoping_and_shadowing() {
        let output = run_ok("let x = 1; { let x = 2; print x; } print x;");
        assert_eq!(output, "2\n1\n");
    }

    #[test]
    fn test_class_with_init_and_method() {
        let output = run_ok(
            "class Greeter { init(n) { this.name = n; } hi() { print \"hi \" + this.name; } } \
             let g = new Greeter(\"world\"); g.hi();",
        );
        assert_eq!(output, "hi world\n");
    }

    #[test]
    fn test_class_without_init() {
        let output = run_ok(
            "class Person { greet() { print \"Hello, my name is \" + this.name; } } \
             let p = new Person(); p.name = \"Alice\"; p.greet();",
        );
        assert_eq!(output, "Hello, my name is Alice\n");
    }

    #[test]
    fn test_method_can_reference_class_name() {
        let output = run_ok(
            "class Maker { another() { return new Maker(); } } \
             let m = new Maker(); print m.another();",
        );
        assert_eq!(output, "<instance of Maker>\n");
    }

    #[test]
    fn test_instance_fields_shared_between_holders() {
        let output = run_ok(
            "class Box { } let a = new Box(); let b = a; a.data = 9; print b.data;",
        );
        assert_eq!(output, "9\n");
    }

    #[test]
    fn test_lambda_call() {
        assert_eq!(run_ok("let square = (x) => x * x; print square(4);"), "16\n");
    }

    #[test]
    fn test_lambda_captures_environment() {
        let output = run_ok("let n = 10; let addn = (x) => x + n; print addn(5);");
        assert_eq!(output, "15\n");
    }

    #[test]
    fn test_repeat() {
        assert_eq!(run_ok("repeat 3 times { print \"Hi\"; }"), "Hi\nHi\nHi\n");
    }

    #[test]
    fn test_repeat_truncates_and_clamps() {
        assert_eq!(run_ok("repeat 2.9 times { print 1; }"), "1\n1\n");
        assert_eq!(run_ok("repeat 0 - 3 times { print 1; }"), "");
    }

    #[test]
    fn test_repeat_count_must_be_number() {
        assert_eq!(run_err("repeat \"a\" times { }"), RuntimeError::RepeatCount);
    }

    #[test]
    fn test_delete_variable_reads_back_null() {
        assert_eq!(run_ok("let x = 1; delete(x); print x;"), "null\n");
    }

    #[test]
    fn test_delete_outer_variable_from_block() {
        assert_eq!(run_ok("let x = 1; { delete(x); } print x;"), "null\n");
    }

    #[test]
    fn test_delete_undefined_variable() {
        assert_eq!(
            run_err("delete(ghost);"),
            RuntimeError::DeleteUndefinedVariable("ghost".to_string())
        );
    }

    #[test]
    fn test_delete_property() {
        let output = run_ok(
            "class Box { } let b = new Box(); b.data = 5; delete(b.data); print b.data;",
        );
        assert_eq!(output, "null\n");
    }

    #[test]
    fn test_delete_undefined_property() {
        assert_eq!(
            run_err("class Box { } let b = new Box(); delete(b.ghost);"),
            RuntimeError::DeleteUndefinedProperty("ghost".to_string())
        );
    }

    #[test]
    fn test_delete_non_instance_and_invalid_target() {
        assert_eq!(run_err("delete(1 .x);"), RuntimeError::DeleteNonInstance);
        assert_eq!(run_err("delete(1 + 2);"), RuntimeError::InvalidDeleteTarget);
    }

    #[test]
    fn test_plus_coercions() {
        assert_eq!(run_ok("print \"x = \" + 4;"), "x = 4\n");
        assert_eq!(run_ok("print 1 + 2.5;"), "3.5\n");
        assert_eq!(run_ok("print \"a\" + null;"), "anull\n");
        // Non-numeric, non-string operands fall back to concatenation
        assert_eq!(run_ok("print null + null;"), "nullnull\n");
    }

    #[test]
    fn test_arithmetic_coerces_strings() {
        assert_eq!(run_ok("print \"10\" - 3;"), "7\n");
        assert_eq!(run_ok("print \"4\" * \"2.5\";"), "10\n");
    }

    #[test]
    fn test_arithmetic_rejects_null() {
        assert_eq!(
            run_err("1 - null;"),
            RuntimeError::InvalidOperands {
                operation: "subtract",
                left: "number",
                right: "null",
            }
        );
    }

    #[test]
    fn test_division_produces_float() {
        assert_eq!(run_ok("print 10 / 4;"), "2.5\n");
        assert_eq!(run_ok("print 8 / 2;"), "4\n");
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(run_err("1 / 0;"), RuntimeError::DivisionByZero);
        assert_eq!(run_err("1 % 0;"), RuntimeError::ModuloByZero);
    }

    #[test]
    fn test_modulo_follows_divisor_sign() {
        assert_eq!(run_ok("print 17 % 5;"), "2\n");
        assert_eq!(run_ok("print (0 - 7) % 3;"), "2\n");
    }

    #[test]
    fn test_comparisons_and_equality() {
        assert_eq!(run_ok("print 2 > 1; print 1 >= 2;"), "true\nfalse\n");
        assert_eq!(run_ok("print 1 == 1.0; print null == null;"), "true\ntrue\n");
        assert_eq!(run_ok("print null != 0;"), "true\n");
        assert_eq!(
            run_err("1 < null;"),
            RuntimeError::InvalidComparison {
                operator: "<".to_string(),
                left: "number",
                right: "null",
            }
        );
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(run_ok("print -3; print !0; print !\"x\";"), "-3\ntrue\nfalse\n");
        assert_eq!(
            run_err("-\"abc\";"),
            RuntimeError::NumberOperand {
                operator: "-".to_string(),
            }
        );
    }

    #[test]
    fn test_truthiness_in_conditions() {
        let output = run_ok(
            "if (\"\") { print \"yes\"; } else { print \"no\"; } \
             if (3) { print \"three\"; }",
        );
        assert_eq!(output, "no\nthree\n");
    }

    #[test]
    fn test_call_errors() {
        assert_eq!(run_err("let x = 1; x();"), RuntimeError::NotCallable);
        assert_eq!(
            run_err("function f(a) { } f(1, 2);"),
            RuntimeError::ArityMismatch {
                expected: 1,
                got: 2,
            }
        );
    }

    #[test]
    fn test_class_arity_follows_init() {
        assert_eq!(
            run_err("class C { init(a, b) { } } new C(1);"),
            RuntimeError::ArityMismatch {
                expected: 2,
                got: 1,
            }
        );
    }

    #[test]
    fn test_undefined_variable_and_property() {
        assert_eq!(
            run_err("print y;"),
            RuntimeError::UndefinedVariable("y".to_string())
        );
        assert_eq!(
            run_err("class Box { } let b = new Box(); print b.ghost;"),
            RuntimeError::UndefinedProperty("ghost".to_string())
        );
    }

    #[test]
    fn test_property_access_on_non_instance() {
        assert_eq!(run_err("let x = 1; print x.y;"), RuntimeError::NotAnInstance);
    }

    #[test]
    fn test_runtime_failure_aborts_rest_of_run() {
        let (output, result) = run("print 1; print y; print 2;");
        assert_eq!(output, "1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_top_level_return_fails() {
        assert_eq!(run_err("return 1;"), RuntimeError::TopLevelReturn);
    }

    #[test]
    fn test_stringify_callables() {
        let output = run_ok(
            "function f() { } print f; print (x) => x; \
             class C { } print C; print new C();",
        );
        assert_eq!(
            output,
            "<function f>\n<lambda function>\n<class C>\n<instance of C>\n"
        );
    }

    #[test]
    fn test_parallel_runs_all_branches() {
        let (output, result) = run("parallel { print 1; print 1; print 1; } print 2;");
        assert_eq!(result, Ok(()));
        let ones = output.lines().filter(|l| *l == "1").count();
        assert_eq!(ones, 3);
        assert_eq!(output.lines().last(), Some("2"));
    }

    #[test]
    fn test_parallel_branch_failure_spares_siblings() {
        // The failing branch is reported but the block and the statements
        // after it still complete.
        let (output, result) = run("parallel { print ghost; print 1; } print 2;");
        assert_eq!(result, Ok(()));
        assert!(output.contains('1'));
        assert_eq!(output.lines().last(), Some("2"));
    }
}
