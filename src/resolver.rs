// ABOUTME: Best-effort lint pass checking declarations, returns, and operand types

use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};
use crate::diagnostics::Diagnostic;
use crate::token::{Token, TokenKind};
use std::collections::HashSet;

/// Rough static type of an expression. The pass only distinguishes what it
/// needs for operand warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeHint {
    Number,
    Text,
    Null,
    Unknown,
    Undefined,
}

/// Walks the AST tracking a stack of declaration scopes and reports advisory
/// diagnostics. Nothing here stops execution; the driver decides whether to
/// surface the output.
pub struct Resolver {
    scopes: Vec<HashSet<String>>,
    function_depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Resolver {
    /// `globals` pre-declares names injected from outside the program, such
    /// as registered extension functions.
    pub fn new(globals: &[String]) -> Self {
        let mut root = HashSet::new();
        for name in globals {
            root.insert(name.clone());
        }
        Resolver {
            scopes: vec![root],
            function_depth: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn analyze(mut self, statements: &[Stmt]) -> Vec<Diagnostic> {
        for statement in statements {
            self.statement(statement);
        }
        self.diagnostics
    }

    fn enter_scope(&mut self) {
        self.scopes.push(HashSet::new());
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if !scope.insert(name.lexeme.clone()) {
                self.diagnostics.push(Diagnostic::semantic(
                    name.line,
                    format!(
                        "Redeclaration warning: Variable '{}' already declared in this scope at line {}",
                        name.lexeme, name.line
                    ),
                ));
            }
        }
    }

    fn is_declared(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains(name))
    }

    fn statement(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Expression(expression) | Stmt::Print(expression) => {
                self.expression(expression);
            }
            Stmt::Let { name, initializer } => {
                self.declare(name);
                if let Some(initializer) = initializer {
                    self.expression(initializer);
                }
            }
            Stmt::Block(statements) => {
                self.enter_scope();
                for statement in statements {
                    self.statement(statement);
                }
                self.exit_scope();
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expression(condition);
                self.statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.statement(else_branch);
                }
            }
            Stmt::While { condition, body } => {
                self.expression(condition);
                self.statement(body);
            }
            Stmt::Function(declaration) => {
                self.declare(&declaration.name);
                self.function(declaration, false);
            }
            Stmt::Return { keyword, value } => {
                if self.function_depth == 0 {
                    self.diagnostics.push(Diagnostic::semantic(
                        keyword.line,
                        format!(
                            "Error at line {}: Cannot return from top-level code",
                            keyword.line
                        ),
                    ));
                }
                if let Some(value) = value {
                    self.expression(value);
                }
            }
            Stmt::Class { name, methods } => {
                self.declare(name);
                for method in methods {
                    self.function(method, true);
                }
            }
            Stmt::Parallel(body) => {
                for statement in body {
                    self.statement(statement);
                }
            }
            Stmt::Repeat { count, body } => {
                self.expression(count);
                for statement in body {
                    self.statement(statement);
                }
            }
            Stmt::Delete { target } => {
                self.expression(target);
            }
        }
    }

    fn function(&mut self, declaration: &FunctionDecl, is_method: bool) {
        self.enter_scope();
        if is_method {
            if let Some(scope) = self.scopes.last_mut() {
                scope.insert("this".to_string());
            }
        }
        for param in &declaration.params {
            self.declare(param);
        }

        self.function_depth += 1;
        for statement in &declaration.body {
            self.statement(statement);
        }
        self.function_depth -= 1;
        self.exit_scope();
    }

    fn expression(&mut self, expression: &Expr) -> TypeHint {
        match expression {
            Expr::Literal(literal) => match literal {
                LiteralValue::Int(_) | LiteralValue::Float(_) => TypeHint::Number,
                LiteralValue::Str(_) => TypeHint::Text,
                LiteralValue::Null => TypeHint::Null,
            },
            Expr::Variable { name } => {
                if self.is_declared(&name.lexeme) {
                    TypeHint::Unknown
                } else {
                    self.diagnostics.push(Diagnostic::semantic(
                        name.line,
                        format!(
                            "Error at line {}: Variable '{}' is not defined",
                            name.line, name.lexeme
                        ),
                    ));
                    TypeHint::Undefined
                }
            }
            Expr::Assign { name, value } => {
                if !self.is_declared(&name.lexeme) {
                    self.diagnostics.push(Diagnostic::semantic(
                        name.line,
                        format!(
                            "Error at line {}: Variable '{}' is not defined",
                            name.line, name.lexeme
                        ),
                    ));
                }
                self.expression(value)
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.expression(left);
                let right = self.expression(right);
                self.check_operands(operator, left, right);
                TypeHint::Unknown
            }
            Expr::Unary { right, .. } => self.expression(right),
            Expr::Call {
                callee, arguments, ..
            } => {
                self.expression(callee);
                for argument in arguments {
                    self.expression(argument);
                }
                TypeHint::Unknown
            }
            Expr::Get { object, .. } => {
                self.expression(object);
                TypeHint::Unknown
            }
            Expr::Set { object, value, .. } => {
                self.expression(object);
                self.expression(value)
            }
            Expr::Lambda(declaration) => {
                self.enter_scope();
                for param in &declaration.params {
                    self.declare(param);
                }
                self.function_depth += 1;
                let body = self.expression(&declaration.body);
                self.function_depth -= 1;
                self.exit_scope();
                body
            }
        }
    }

    /// Warns about string/number mixes under the arithmetic operators. `+`
    /// concatenates such a mix at runtime, but it is still flagged as a
    /// likely mistake.
    fn check_operands(&mut self, operator: &Token, left: TypeHint, right: TypeHint) {
        let arithmetic = matches!(
            operator.kind,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Multiply | TokenKind::Divide
        );
        if !arithmetic {
            return;
        }

        let mix = match (left, right) {
            (TypeHint::Text, TypeHint::Number) => Some("string and number"),
            (TypeHint::Number, TypeHint::Text) => Some("number and string"),
            _ => None,
        };
        if let Some(mix) = mix {
            self.diagnostics.push(Diagnostic::semantic(
                operator.line,
                format!(
                    "Type error at line {}: Cannot {} {}",
                    operator.line, operator.lexeme, mix
                ),
            ));
        }
    }
}
