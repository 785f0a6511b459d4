// ABOUTME: Recursive-descent parser producing the Toy AST with panic-mode recovery

use crate::ast::{Expr, FunctionDecl, LambdaDecl, LiteralValue, Stmt};
use crate::diagnostics::Diagnostic;
use crate::token::{Literal, Token, TokenKind};
use std::sync::Arc;

/// Internal unwinding signal for panic-mode recovery. The diagnostic has
/// already been recorded when this is raised.
struct ParseError;

type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    diagnostics: Vec<Diagnostic>,
}

/// Parse a token stream into statements. Any syntactic diagnostics are
/// returned alongside whatever statements survived recovery.
pub fn parse(tokens: Vec<Token>) -> (Vec<Stmt>, Vec<Diagnostic>) {
    Parser::new(tokens).run()
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            current: 0,
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self) -> (Vec<Stmt>, Vec<Diagnostic>) {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Ok(statement) => statements.push(statement),
                Err(ParseError) => self.synchronize(),
            }
        }
        (statements, self.diagnostics)
    }

    // ===== Declarations =====

    fn declaration(&mut self) -> ParseResult<Stmt> {
        if self.match_kind(TokenKind::Let) {
            return self.let_declaration();
        }
        if self.match_kind(TokenKind::Function) {
            let function = self.function_declaration("function")?;
            return Ok(Stmt::Function(function));
        }
        if self.match_kind(TokenKind::Class) {
            return self.class_declaration();
        }

        self.statement()
    }

    fn let_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;

        let initializer = if self.match_kind(TokenKind::Assign) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Let { name, initializer })
    }

    fn function_declaration(&mut self, kind: &str) -> ParseResult<Arc<FunctionDecl>> {
        let name = self.consume(TokenKind::Identifier, &format!("Expect {} name.", kind))?;

        self.consume(
            TokenKind::LeftParen,
            &format!("Expect '(' after {} name.", kind),
        )?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
            while self.match_kind(TokenKind::Comma) {
                if params.len() >= 255 {
                    let token = self.peek().clone();
                    self.error(&token, "Can't have more than 255 parameters.");
                }
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;

        self.consume(
            TokenKind::LeftBrace,
            &format!("Expect '{{' before {} body.", kind),
        )?;
        let body = self.block()?;

        Ok(Arc::new(FunctionDecl { name, params, body }))
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect class name.")?;

        self.consume(TokenKind::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            methods.push(self.function_declaration("method")?);
        }

        self.consume(TokenKind::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class { name, methods })
    }

    // ===== Statements =====

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.match_kind(TokenKind::Print) {
            return self.print_statement();
        }
        if self.match_kind(TokenKind::LeftBrace) {
            return Ok(Stmt::Block(self.block()?));
        }
        if self.match_kind(TokenKind::If) {
            return self.if_statement();
        }
        if self.match_kind(TokenKind::While) {
            return self.while_statement();
        }
        if self.match_kind(TokenKind::Return) {
            return self.return_statement();
        }
        if self.match_kind(TokenKind::Parallel) {
            return self.parallel_statement();
        }
        if self.match_kind(TokenKind::Repeat) {
            return self.repeat_statement();
        }
        if self.match_kind(TokenKind::Delete) {
            return self.delete_statement();
        }

        self.expression_statement()
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_kind(TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;

        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let value = if !self.check(TokenKind::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn parallel_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftBrace, "Expect '{' after 'parallel'.")?;
        let body = self.block()?;
        Ok(Stmt::Parallel(body))
    }

    fn repeat_statement(&mut self) -> ParseResult<Stmt> {
        let count = self.expression()?;
        self.consume(TokenKind::Times, "Expect 'times' after repeat count.")?;

        self.consume(TokenKind::LeftBrace, "Expect '{' after 'times'.")?;
        let body = self.block()?;

        Ok(Stmt::Repeat { count, body })
    }

    fn delete_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'delete'.")?;
        let target = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
        self.consume(TokenKind::Semicolon, "Expect ';' after delete statement.")?;

        Ok(Stmt::Delete { target })
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    // ===== Expressions =====

    fn expression(&mut self) -> ParseResult<Expr> {
        if self.check(TokenKind::LeftParen) && self.lambda_ahead() {
            return self.lambda_expression();
        }

        self.assignment()
    }

    /// Commit to a lambda only when the upcoming tokens match
    /// `( identifier (, identifier)* ) =>` or `( ) =>`. A bare parenthesized
    /// expression such as `(x)` therefore stays an expression.
    fn lambda_ahead(&self) -> bool {
        let mut i = self.current + 1;

        if self.kind_at(i) == TokenKind::RightParen {
            return self.kind_at(i + 1) == TokenKind::Arrow;
        }

        loop {
            if self.kind_at(i) != TokenKind::Identifier {
                return false;
            }
            i += 1;
            match self.kind_at(i) {
                TokenKind::Comma => i += 1,
                TokenKind::RightParen => return self.kind_at(i + 1) == TokenKind::Arrow,
                _ => return false,
            }
        }
    }

    fn lambda_expression(&mut self) -> ParseResult<Expr> {
        self.consume(TokenKind::LeftParen, "Expect '(' for lambda parameters.")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
            while self.match_kind(TokenKind::Comma) {
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
            }
        }

        self.consume(TokenKind::RightParen, "Expect ')' after lambda parameters.")?;
        self.consume(TokenKind::Arrow, "Expect '=>' after lambda parameters.")?;

        let body = self.expression()?;

        Ok(Expr::Lambda(Arc::new(LambdaDecl { params, body })))
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.equality()?;

        if self.match_kind(TokenKind::Assign) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            match expr {
                Expr::Variable { name } => {
                    return Ok(Expr::Assign {
                        name,
                        value: Box::new(value),
                    });
                }
                Expr::Get { object, name } => {
                    return Ok(Expr::Set {
                        object,
                        name,
                        value: Box::new(value),
                    });
                }
                _ => {
                    self.error(&equals, "Invalid assignment target.");
                }
            }
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while self.match_kinds(&[TokenKind::Equal, TokenKind::NotEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while self.match_kinds(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while self.match_kinds(&[TokenKind::Plus, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while self.match_kinds(&[TokenKind::Multiply, TokenKind::Divide, TokenKind::Modulo]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.match_kinds(&[TokenKind::Minus, TokenKind::Not]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.match_kind(TokenKind::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if self.match_kind(TokenKind::Dot) {
                let name = self.consume(TokenKind::Identifier, "Expect property name after '.'.")?;
                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(TokenKind::RightParen) {
            arguments.push(self.expression()?);
            while self.match_kind(TokenKind::Comma) {
                if arguments.len() >= 255 {
                    let token = self.peek().clone();
                    self.error(&token, "Can't have more than 255 arguments.");
                }
                arguments.push(self.expression()?);
            }
        }

        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.match_kinds(&[TokenKind::Number, TokenKind::String]) {
            let value = match self.previous().literal.clone() {
                Some(Literal::Int(n)) => LiteralValue::Int(n),
                Some(Literal::Float(f)) => LiteralValue::Float(f),
                Some(Literal::Str(s)) => LiteralValue::Str(s),
                None => LiteralValue::Null,
            };
            return Ok(Expr::Literal(value));
        }
        if self.match_kind(TokenKind::Identifier) {
            return Ok(Expr::Variable {
                name: self.previous().clone(),
            });
        }
        if self.match_kind(TokenKind::LeftParen) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
            return Ok(expr);
        }
        if self.match_kind(TokenKind::New) {
            return self.new_expression();
        }
        if self.match_kind(TokenKind::Null) {
            return Ok(Expr::Literal(LiteralValue::Null));
        }
        if self.match_kind(TokenKind::This) {
            return Ok(Expr::Variable {
                name: self.previous().clone(),
            });
        }

        let token = self.peek().clone();
        Err(self.error(&token, "Expect expression."))
    }

    /// `new Name(args)` desugars to a call on the class variable.
    fn new_expression(&mut self) -> ParseResult<Expr> {
        let class_name = self.consume(TokenKind::Identifier, "Expect class name after 'new'.")?;
        self.consume(TokenKind::LeftParen, "Expect '(' after class name.")?;

        self.finish_call(Expr::Variable { name: class_name })
    }

    // ===== Helpers =====

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn match_kinds(&mut self, kinds: &[TokenKind]) -> bool {
        for &kind in kinds {
            if self.check(kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, kind: TokenKind) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek().kind == kind
    }

    fn kind_at(&self, index: usize) -> TokenKind {
        self.tokens
            .get(index)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }

        let token = self.peek().clone();
        Err(self.error(&token, message))
    }

    fn error(&mut self, token: &Token, message: &str) -> ParseError {
        let text = if token.kind == TokenKind::Eof {
            format!("Error at end: {}", message)
        } else {
            format!("Error at '{}': {}", token.lexeme, message)
        };
        self.diagnostics.push(Diagnostic::syntax(token.line, text));
        ParseError
    }

    /// Discard tokens until a likely statement boundary so one mistake does
    /// not drown the rest of the program in follow-on errors.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Function
                | TokenKind::Let
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {}
            }

            self.advance();
        }
    }
}
