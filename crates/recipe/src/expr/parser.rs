// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive-descent parser for the expression language.

use super::ast::{BinOp, CmpOp, Expr, UnaryOp};
use super::lexer::Token;
use super::ExprError;
use sf_core::Value;

pub struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            input,
            tokens,
            pos: 0,
        }
    }

    /// Parse a complete expression; trailing tokens are an error.
    pub fn parse(mut self) -> Result<Expr, ExprError> {
        if self.peek().is_none() {
            return Err(self.invalid("empty expression"));
        }
        let expr = self.parse_ternary()?;
        match self.peek() {
            None => Ok(expr),
            Some(tok) => Err(self.unexpected(&tok.clone())),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Token) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> ExprError {
        ExprError::Invalid {
            expression: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn not_allowed(&self, construct: impl Into<String>) -> ExprError {
        ExprError::NotAllowed {
            expression: self.input.to_string(),
            construct: construct.into(),
        }
    }

    /// Map an unexpected token to the most useful rejection: forbidden
    /// constructs get their own message, everything else is a syntax error.
    fn unexpected(&self, tok: &Token) -> ExprError {
        match tok {
            Token::Lambda => self.not_allowed("lambda expression"),
            Token::For => self.not_allowed("comprehension"),
            Token::Import => self.not_allowed("import"),
            Token::Yield => self.not_allowed("yield expression"),
            Token::Walrus => self.not_allowed("assignment expression"),
            Token::Assign => self.not_allowed("assignment"),
            Token::DoubleStar => self.not_allowed("operator `**`"),
            Token::Star => self.not_allowed("starred expression"),
            other => self.invalid(format!("unexpected {}", other.describe())),
        }
    }

    fn expect(&mut self, tok: Token, context: &str) -> Result<(), ExprError> {
        match self.advance() {
            Some(ref found) if *found == tok => Ok(()),
            Some(found) => match found {
                Token::Lambda
                | Token::For
                | Token::Import
                | Token::Yield
                | Token::Walrus
                | Token::Assign
                | Token::DoubleStar => Err(self.unexpected(&found)),
                _ => Err(self.invalid(format!(
                    "expected {} {}, found {}",
                    tok.describe(),
                    context,
                    found.describe()
                ))),
            },
            None => Err(self.invalid(format!("expected {} {}", tok.describe(), context))),
        }
    }

    // ternary := or_expr ('if' or_expr 'else' ternary)?
    fn parse_ternary(&mut self) -> Result<Expr, ExprError> {
        let then = self.parse_or()?;
        if !self.eat(&Token::If) {
            return Ok(then);
        }
        let cond = self.parse_or()?;
        self.expect(Token::Else, "after conditional expression")?;
        let otherwise = self.parse_ternary()?;
        Ok(Expr::Ternary {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::Or {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_not()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_not()?;
            lhs = Expr::And {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Not) {
            let operand = self.parse_not()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    // comparison := arith (cmp_op arith)?   -- chaining is rejected
    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let lhs = self.parse_arith()?;

        let op = match self.peek() {
            Some(Token::Eq) => Some(CmpOp::Eq),
            Some(Token::Ne) => Some(CmpOp::Ne),
            Some(Token::Lt) => Some(CmpOp::Lt),
            Some(Token::Le) => Some(CmpOp::Le),
            Some(Token::Gt) => Some(CmpOp::Gt),
            Some(Token::Ge) => Some(CmpOp::Ge),
            Some(Token::In) => Some(CmpOp::In),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let rhs = self.parse_arith()?;
            self.reject_chained_comparison()?;
            return Ok(Expr::Compare {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }

        // `not in`
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            self.expect(Token::In, "after `not`")?;
            let rhs = self.parse_arith()?;
            self.reject_chained_comparison()?;
            return Ok(Expr::Compare {
                op: CmpOp::NotIn,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }

        // `is null` / `is not null`
        if self.eat(&Token::Is) {
            let negated = self.eat(&Token::Not);
            self.expect(Token::Null, "after `is`")?;
            return Ok(Expr::IsNull {
                operand: Box::new(lhs),
                negated,
            });
        }

        Ok(lhs)
    }

    fn reject_chained_comparison(&self) -> Result<(), ExprError> {
        if matches!(
            self.peek(),
            Some(
                Token::Eq
                    | Token::Ne
                    | Token::Lt
                    | Token::Le
                    | Token::Gt
                    | Token::Ge
                    | Token::In
                    | Token::Is
            )
        ) {
            return Err(self.invalid("chained comparisons are not supported"));
        }
        Ok(())
    }

    fn parse_arith(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::DoubleSlash) => BinOp::FloorDiv,
                Some(Token::Percent) => BinOp::Mod,
                Some(Token::DoubleStar) => {
                    return Err(self.not_allowed("operator `**`"));
                }
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_factor()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Minus) {
            let operand = self.parse_factor()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        if self.eat(&Token::Plus) {
            let operand = self.parse_factor()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Pos,
                operand: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    // postfix := primary ('.' ident | '[' expr ']')*
    // A '(' here would be a call — rejected.
    fn parse_postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.pos += 1;
                    match self.advance() {
                        Some(Token::Ident(name)) => {
                            expr = Expr::Field {
                                base: Box::new(expr),
                                name,
                            };
                        }
                        Some(found) => return Err(self.unexpected(&found)),
                        None => return Err(self.invalid("expected field name after `.`")),
                    }
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    let index = self.parse_ternary()?;
                    self.expect(Token::RBracket, "to close index")?;
                    expr = Expr::Index {
                        base: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                Some(Token::LParen) => {
                    return Err(self.not_allowed("function call"));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let Some(tok) = self.advance() else {
            return Err(self.invalid("unexpected end of expression"));
        };
        match tok {
            Token::Int(i) => Ok(Expr::Literal(Value::Int(i))),
            Token::Float(f) => Ok(Expr::Literal(Value::Float(f))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::True => Ok(Expr::Literal(Value::Bool(true))),
            Token::False => Ok(Expr::Literal(Value::Bool(false))),
            Token::Null => Ok(Expr::Literal(Value::Null)),
            Token::Ident(name) => Ok(Expr::Name(name)),
            Token::LParen => {
                let inner = self.parse_ternary()?;
                if self.peek() == Some(&Token::For) {
                    return Err(self.not_allowed("generator expression"));
                }
                self.expect(Token::RParen, "to close parenthesized expression")?;
                Ok(inner)
            }
            Token::LBracket => self.parse_list(),
            Token::LBrace => self.parse_map(),
            other => Err(self.unexpected(&other)),
        }
    }

    fn parse_list(&mut self) -> Result<Expr, ExprError> {
        let mut items = Vec::new();
        if self.eat(&Token::RBracket) {
            return Ok(Expr::List(items));
        }
        loop {
            if self.peek() == Some(&Token::Star) {
                return Err(self.not_allowed("starred expression"));
            }
            items.push(self.parse_ternary()?);
            match self.peek() {
                Some(Token::For) => {
                    return Err(self.not_allowed("comprehension"));
                }
                Some(Token::Comma) => {
                    self.pos += 1;
                    if self.eat(&Token::RBracket) {
                        return Ok(Expr::List(items));
                    }
                }
                _ => {
                    self.expect(Token::RBracket, "to close list literal")?;
                    return Ok(Expr::List(items));
                }
            }
        }
    }

    fn parse_map(&mut self) -> Result<Expr, ExprError> {
        let mut items = Vec::new();
        if self.eat(&Token::RBrace) {
            return Ok(Expr::Map(items));
        }
        loop {
            if self.peek() == Some(&Token::DoubleStar) {
                return Err(self.not_allowed("starred expression"));
            }
            let key = self.parse_ternary()?;
            if self.peek() == Some(&Token::For) {
                // set comprehension
                return Err(self.not_allowed("comprehension"));
            }
            self.expect(Token::Colon, "after map key")?;
            let value = self.parse_ternary()?;
            items.push((key, value));
            match self.peek() {
                Some(Token::For) => {
                    return Err(self.not_allowed("comprehension"));
                }
                Some(Token::Comma) => {
                    self.pos += 1;
                    if self.eat(&Token::RBrace) {
                        return Ok(Expr::Map(items));
                    }
                }
                _ => {
                    self.expect(Token::RBrace, "to close map literal")?;
                    return Ok(Expr::Map(items));
                }
            }
        }
    }
}
