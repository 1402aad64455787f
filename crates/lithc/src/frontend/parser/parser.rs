//! Recursive descent parser for Lithium

use std::sync::Arc;

use crate::common::{CompileError, CompileResult, DiagnosticReporter, Position, Span};
use crate::frontend::ast::*;
use crate::frontend::lexer::{Token, TokenKind};
use crate::types::PrimitiveType;

/// Recursive descent parser with precedence climbing for binary expressions
///
/// Syntax errors are reported to the shared reporter and the parser resumes
/// after the next newline, so `parse` always produces a `Program`.
pub struct Parser<'r> {
    tokens: Vec<Token>,
    pos: usize,
    /// Open `(` / `{` groups; newlines inside them are insignificant
    depth: usize,
    reporter: &'r mut DiagnosticReporter,
}

impl<'r> Parser<'r> {
    /// Create a parser over a scanned token sequence
    pub fn new(tokens: Vec<Token>, reporter: &'r mut DiagnosticReporter) -> Self {
        let mut tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|t| !matches!(t.kind, TokenKind::Comment(_)))
            .collect();

        if !tokens.last().is_some_and(Token::is_eof) {
            let (span, position) = tokens.last().map_or_else(
                || (Span::default(), Position::default()),
                |t| (Span::new(t.span.end, t.span.end), t.position.clone()),
            );
            tokens.push(Token::new(TokenKind::Eof, "", span, position));
        }

        Self {
            tokens,
            pos: 0,
            depth: 0,
            reporter,
        }
    }

    /// Parse a complete program, recovering from syntax errors line by line
    pub fn parse(&mut self) -> Program {
        let position = Position::start_of(Arc::clone(&self.current().position.source));
        let mut declarations = Vec::new();

        loop {
            self.skip_newlines();
            if self.at_end() {
                break;
            }
            match self.parse_declaration() {
                Ok(decl) => declarations.push(decl),
                Err(err) => {
                    self.reporter.report_error(err);
                    self.synchronize();
                }
            }
        }

        Program::new(declarations, position)
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn at_end(&self) -> bool {
        self.current().is_eof()
    }

    /// Consume the current token; end-of-input is never consumed
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .map_or(self.current().span, |i| self.tokens[i].span)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> CompileResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {kind}, found {}", self.current().kind)))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> CompileResult<String> {
        if let TokenKind::Identifier(name) = &self.current().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error(format!("expected {what}, found {}", self.current().kind)))
        }
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        let token = self.current();
        CompileError::parser(message, token.position.clone(), token.span)
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Run `f` inside a bracketed group
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> CompileResult<T>) -> CompileResult<T> {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Discard tokens up to and including the next newline
    fn synchronize(&mut self) {
        while !self.at_end() {
            if matches!(self.advance().kind, TokenKind::Newline) {
                return;
            }
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_declaration(&mut self) -> CompileResult<Decl> {
        let start = self.current().clone();

        let kind = match &start.kind {
            TokenKind::Fn => DeclKind::Function(self.parse_function()?),
            TokenKind::Let | TokenKind::Const => DeclKind::Variable(self.parse_var_decl()?),
            TokenKind::Include => DeclKind::Include(self.parse_include()?),
            TokenKind::From => self.parse_import()?,
            other => return Err(self.error(format!("expected declaration, found {other}"))),
        };
        let span = start.span.merge(self.previous_span());

        // Each declaration owns its line
        if !self.at_end() && !self.match_token(&TokenKind::Newline) {
            return Err(self.error(format!(
                "expected newline after declaration, found {}",
                self.current().kind
            )));
        }

        Ok(Decl::new(kind, start.position, span))
    }

    fn parse_function(&mut self) -> CompileResult<FunctionDecl> {
        self.expect(&TokenKind::Fn)?;
        let name = self.expect_identifier("function name")?;

        self.expect(&TokenKind::LParen)?;
        let params = self.nested(|p| {
            let mut params = Vec::new();
            p.skip_newlines();
            if !p.check(&TokenKind::RParen) {
                loop {
                    p.skip_newlines();
                    params.push(p.parse_param()?);
                    p.skip_newlines();
                    if !p.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            Ok(params)
        })?;
        self.expect(&TokenKind::RParen)?;

        let return_type = if self.match_token(&TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect(&TokenKind::LBrace)?;
        let body = self.nested(|p| {
            p.skip_newlines();
            let body = p.parse_expr()?;
            p.skip_newlines();
            Ok(body)
        })?;
        self.expect(&TokenKind::RBrace)?;

        let mut func = FunctionDecl::new(name, params, body);
        if let Some(ty) = return_type {
            func = func.with_return_type(ty);
        }
        Ok(func)
    }

    fn parse_param(&mut self) -> CompileResult<Param> {
        let position = self.current().position.clone();
        let name = self.expect_identifier("parameter name")?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        Ok(Param::new(name, ty, position))
    }

    fn parse_type(&mut self) -> CompileResult<PrimitiveType> {
        match self.current().kind.primitive_type() {
            Some(ty) => {
                self.advance();
                Ok(ty)
            }
            None => Err(self.error(format!("expected type, found {}", self.current().kind))),
        }
    }

    fn parse_var_decl(&mut self) -> CompileResult<VarDecl> {
        let is_const = matches!(self.advance().kind, TokenKind::Const);
        let name = self.expect_identifier("variable name")?;
        let mut var = VarDecl::new(name, is_const);

        if self.match_token(&TokenKind::Colon) {
            var = var.with_type(self.parse_type()?);
        }
        if self.match_token(&TokenKind::Assign) {
            var = var.with_initializer(self.parse_expr()?);
        }

        Ok(var)
    }

    fn parse_include(&mut self) -> CompileResult<IncludeDirective> {
        self.expect(&TokenKind::Include)?;
        if let TokenKind::String(path) = &self.current().kind {
            let path = path.clone();
            self.advance();
            Ok(IncludeDirective { path })
        } else {
            Err(self.error(format!(
                "expected file path string after 'include', found {}",
                self.current().kind
            )))
        }
    }

    /// `from <module> import <name>` or `from <module> import { <name>, ... }`
    fn parse_import(&mut self) -> CompileResult<DeclKind> {
        self.expect(&TokenKind::From)?;
        let module = self.expect_identifier("module name")?;

        // `import` is contextual, not reserved
        match &self.current().kind {
            TokenKind::Identifier(word) if word == "import" => {
                self.advance();
            }
            other => return Err(self.error(format!("expected 'import', found {other}"))),
        }

        if !self.match_token(&TokenKind::LBrace) {
            let name = self.expect_identifier("imported name")?;
            return Ok(DeclKind::Import(ImportStatement { module, name }));
        }

        let names = self.nested(|p| {
            let mut names = Vec::new();
            loop {
                p.skip_newlines();
                names.push(p.expect_identifier("imported name")?);
                p.skip_newlines();
                if !p.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            Ok(names)
        })?;
        self.expect(&TokenKind::RBrace)?;

        Ok(DeclKind::SelectiveImport(SelectiveImport { module, names }))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expr(&mut self) -> CompileResult<Expr> {
        self.parse_expr_with_precedence(0)
    }

    fn parse_expr_with_precedence(&mut self, min_prec: u8) -> CompileResult<Expr> {
        let mut left = self.parse_primary()?;

        loop {
            if self.depth > 0 {
                self.skip_newlines();
            }
            let kind = &self.current().kind;
            let (Some(prec), Some(op)) = (kind.binary_precedence(), BinaryOp::from_token(kind))
            else {
                break;
            };
            if prec < min_prec {
                break;
            }
            let next_min = if kind.is_right_associative() {
                prec
            } else {
                prec + 1
            };

            let op_token = self.advance();
            self.skip_newlines();
            let right = self.parse_expr_with_precedence(next_min)?;

            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                op_token.position,
                span,
            );
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> CompileResult<Expr> {
        if self.depth > 0 {
            self.skip_newlines();
        }
        let token = self.current().clone();

        let kind = match token.kind {
            TokenKind::Number(value) => {
                self.advance();
                let is_float = value.contains('.');
                ExprKind::Number { value, is_float }
            }
            TokenKind::String(value) => {
                self.advance();
                ExprKind::String(value)
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_call_args()?;
                    ExprKind::Call { name, args }
                } else {
                    ExprKind::Identifier(name)
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.nested(|p| {
                    let inner = p.parse_expr()?;
                    p.skip_newlines();
                    Ok(inner)
                })?;
                self.expect(&TokenKind::RParen)?;
                // Grouping leaves no node behind
                return Ok(Expr::new(
                    inner.kind,
                    inner.position,
                    token.span.merge(self.previous_span()),
                ));
            }
            other => return Err(self.error(format!("expected expression, found {other}"))),
        };

        Ok(Expr::new(
            kind,
            token.position,
            token.span.merge(self.previous_span()),
        ))
    }

    fn parse_call_args(&mut self) -> CompileResult<Vec<Expr>> {
        self.expect(&TokenKind::LParen)?;
        let args = self.nested(|p| {
            let mut args = Vec::new();
            p.skip_newlines();
            if !p.check(&TokenKind::RParen) {
                loop {
                    args.push(p.parse_expr()?);
                    p.skip_newlines();
                    if !p.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            Ok(args)
        })?;
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }
}
