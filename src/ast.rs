// ABOUTME: Abstract syntax tree node definitions for the Toy language

use crate::token::Token;
use std::sync::Arc;

/// Literal value as written in the source. `Null` covers the `null` keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Unary {
        operator: Token,
        right: Box<Expr>,
    },
    Literal(LiteralValue),
    Variable {
        name: Token,
    },
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        /// Closing parenthesis, kept for error reporting
        paren: Token,
        arguments: Vec<Expr>,
    },
    Get {
        object: Box<Expr>,
        name: Token,
    },
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },
    Lambda(Arc<LambdaDecl>),
}

/// A lambda form `(params) => expr`. Shared between the AST and the runtime
/// value that closes over it.
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaDecl {
    pub params: Vec<Token>,
    pub body: Expr,
}

/// A named function or method declaration. Shared between the AST and every
/// runtime closure created from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
    Let {
        name: Token,
        initializer: Option<Expr>,
    },
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Function(Arc<FunctionDecl>),
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    Class {
        name: Token,
        methods: Vec<Arc<FunctionDecl>>,
    },
    Parallel(Vec<Stmt>),
    Repeat {
        count: Expr,
        body: Vec<Stmt>,
    },
    Delete {
        target: Expr,
    },
}
