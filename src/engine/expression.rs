// ==========================================
// CAERS Core - Decimal Expression Evaluator
// ==========================================
// Shared by emission-factor formulas ("0.95*SU*A")
// and unit calculation variables ("2000*[lb]", "[J]/[s]")
// Grammar:
//   expr   := term (('+' | '-') term)*
//   term   := unary (('*' | '/') unary)*
//   unary  := ('-' | '+') unary | power
//   power  := primary ('^' unary)?
//   primary:= number | identifier | '[' unit ']' | '(' expr ')'
// ==========================================

use crate::engine::error::{CalculationError, CalculationResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

/// Pi at double precision, matching the constant formulas are authored against
pub const PI: Decimal = dec!(3.141592653589793);

// Exponents beyond this are rejected instead of looping
const MAX_EXPONENT: i64 = 64;

// Parentheses, signs and exponents nest at most this deep
const MAX_NESTING: usize = 32;

// Bounds the tree depth that evaluation recurses over
const MAX_TOKENS: usize = 256;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Decimal),
    Ident(String),
    Unit(String),
    Op(char),
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(Decimal),
    Variable(String),
    Unit(String),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

/// Named symbol referenced by an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol<'a> {
    /// Bare identifier: formula variable code or named derived unit
    Variable(&'a str),
    /// Bracketed base unit, name without brackets
    Unit(&'a str),
}

// ==========================================
// Expression
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Expr,
}

impl Expression {
    /// Parses an expression; the whole input must be consumed
    pub fn parse(source: &str) -> CalculationResult<Self> {
        let tokens = tokenize(source)?;
        if let Some((offset, _)) = tokens.get(MAX_TOKENS) {
            return Err(syntax_error(source, *offset, "expression too long"));
        }
        let mut parser = Parser {
            source,
            tokens: &tokens,
            pos: 0,
            depth: 0,
        };
        let root = parser.expr()?;
        if let Some((offset, token)) = parser.tokens.get(parser.pos) {
            return Err(syntax_error(source, *offset, &format!("unexpected token {:?}", token)));
        }
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Identifiers in first-appearance order, without duplicates; constants excluded
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_variables(&self.root, &mut out);
        out
    }

    /// Evaluates with symbol values supplied by `resolve`.
    ///
    /// Every unresolved variable is reported together in one
    /// `MissingVariables` error; an unresolved unit is `UnknownUnit`.
    pub fn evaluate<F>(&self, resolve: F) -> CalculationResult<Decimal>
    where
        F: Fn(Symbol<'_>) -> Option<Decimal>,
    {
        let missing: Vec<String> = self
            .variables()
            .into_iter()
            .filter(|name| resolve(Symbol::Variable(name)).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(CalculationError::MissingVariables {
                formula: self.source.clone(),
                missing,
            });
        }
        eval(&self.root, &resolve)
    }
}

fn is_constant(name: &str) -> bool {
    name.eq_ignore_ascii_case("pi")
}

fn collect_variables(expr: &Expr, out: &mut Vec<String>) {
    match expr {
        Expr::Variable(name) => {
            if !is_constant(name) && !out.iter().any(|n| n == name) {
                out.push(name.clone());
            }
        }
        Expr::Neg(inner) => collect_variables(inner, out),
        Expr::Binary(_, lhs, rhs) => {
            collect_variables(lhs, out);
            collect_variables(rhs, out);
        }
        Expr::Number(_) | Expr::Unit(_) => {}
    }
}

fn eval<F>(expr: &Expr, resolve: &F) -> CalculationResult<Decimal>
where
    F: Fn(Symbol<'_>) -> Option<Decimal>,
{
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Variable(name) if is_constant(name) => Ok(PI),
        Expr::Variable(name) => {
            resolve(Symbol::Variable(name)).ok_or_else(|| CalculationError::MissingVariables {
                formula: name.clone(),
                missing: vec![name.clone()],
            })
        }
        Expr::Unit(name) => {
            resolve(Symbol::Unit(name)).ok_or_else(|| CalculationError::UnknownUnit(format!("[{}]", name)))
        }
        Expr::Neg(inner) => Ok(-eval(inner, resolve)?),
        Expr::Binary(op, lhs, rhs) => {
            let a = eval(lhs, resolve)?;
            let b = eval(rhs, resolve)?;
            apply(*op, a, b)
        }
    }
}

fn apply(op: BinaryOp, a: Decimal, b: Decimal) -> CalculationResult<Decimal> {
    match op {
        BinaryOp::Add => a.checked_add(b).ok_or(CalculationError::Overflow),
        BinaryOp::Sub => a.checked_sub(b).ok_or(CalculationError::Overflow),
        BinaryOp::Mul => a.checked_mul(b).ok_or(CalculationError::Overflow),
        BinaryOp::Div => checked_div(a, b),
        BinaryOp::Pow => integer_pow(a, b),
    }
}

pub(crate) fn checked_div(a: Decimal, b: Decimal) -> CalculationResult<Decimal> {
    if b.is_zero() {
        return Err(CalculationError::DivisionByZero);
    }
    a.checked_div(b).ok_or(CalculationError::Overflow)
}

fn integer_pow(base: Decimal, exponent: Decimal) -> CalculationResult<Decimal> {
    if !exponent.fract().is_zero() {
        return Err(CalculationError::UnsupportedExponent(exponent.to_string()));
    }
    let n = i64::try_from(exponent.trunc())
        .map_err(|_| CalculationError::UnsupportedExponent(exponent.to_string()))?;
    if n.abs() > MAX_EXPONENT {
        return Err(CalculationError::UnsupportedExponent(exponent.to_string()));
    }

    let mut result = Decimal::ONE;
    for _ in 0..n.abs() {
        result = result.checked_mul(base).ok_or(CalculationError::Overflow)?;
    }
    if n < 0 {
        checked_div(Decimal::ONE, result)
    } else {
        Ok(result)
    }
}

// ==========================================
// Tokenizer
// ==========================================

fn syntax_error(source: &str, position: usize, message: &str) -> CalculationError {
    CalculationError::FormulaSyntax {
        formula: source.to_string(),
        position,
        message: message.to_string(),
    }
}

fn tokenize(source: &str) -> CalculationResult<Vec<(usize, Token)>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() || c == '.' {
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let mut scientific = false;
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    while j < chars.len() && chars[j].is_ascii_digit() {
                        j += 1;
                    }
                    i = j;
                    scientific = true;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let parsed = if scientific {
                Decimal::from_scientific(&text)
            } else {
                Decimal::from_str(&text)
            };
            let value = parsed.map_err(|e| syntax_error(source, start, &format!("bad number '{}': {}", text, e)))?;
            tokens.push((start, Token::Number(value)));
        } else if c.is_ascii_alphabetic() || c == '_' {
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push((start, Token::Ident(chars[start..i].iter().collect())));
        } else if c == '[' {
            let close = chars[i..]
                .iter()
                .position(|&ch| ch == ']')
                .ok_or_else(|| syntax_error(source, start, "unclosed '['"))?;
            let name: String = chars[i + 1..i + close].iter().collect();
            if name.trim().is_empty() {
                return Err(syntax_error(source, start, "empty unit"));
            }
            tokens.push((start, Token::Unit(name.trim().to_string())));
            i += close + 1;
        } else if matches!(c, '+' | '-' | '*' | '/' | '^') {
            tokens.push((start, Token::Op(c)));
            i += 1;
        } else if c == '(' {
            tokens.push((start, Token::LParen));
            i += 1;
        } else if c == ')' {
            tokens.push((start, Token::RParen));
            i += 1;
        } else {
            return Err(syntax_error(source, start, &format!("unexpected character '{}'", c)));
        }
    }

    Ok(tokens)
}

// ==========================================
// Parser
// ==========================================

struct Parser<'a> {
    source: &'a str,
    tokens: &'a [(usize, Token)],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(o, _)| *o)
            .unwrap_or_else(|| self.source.chars().count())
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> CalculationResult<T>) -> CalculationResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(syntax_error(self.source, self.offset(), "expression nested too deeply"));
        }
        self.depth += 1;
        let parsed = parse(self);
        self.depth -= 1;
        parsed
    }

    fn next_op(&mut self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                self.pos += 1;
                Some(*op)
            }
            _ => None,
        }
    }

    fn expr(&mut self) -> CalculationResult<Expr> {
        let mut lhs = self.term()?;
        while let Some(op) = self.next_op(&['+', '-']) {
            let rhs = self.term()?;
            let op = if op == '+' { BinaryOp::Add } else { BinaryOp::Sub };
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> CalculationResult<Expr> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.next_op(&['*', '/']) {
            let rhs = self.unary()?;
            let op = if op == '*' { BinaryOp::Mul } else { BinaryOp::Div };
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> CalculationResult<Expr> {
        match self.next_op(&['-', '+']) {
            Some('-') => Ok(Expr::Neg(Box::new(self.nested(Self::unary)?))),
            Some(_) => self.nested(Self::unary),
            None => self.power(),
        }
    }

    fn power(&mut self) -> CalculationResult<Expr> {
        let base = self.primary()?;
        if self.next_op(&['^']).is_some() {
            let exponent = self.nested(Self::unary)?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> CalculationResult<Expr> {
        let offset = self.offset();
        let token = self
            .peek()
            .ok_or_else(|| syntax_error(self.source, offset, "unexpected end of expression"))?;
        self.pos += 1;

        match token {
            Token::Number(value) => Ok(Expr::Number(*value)),
            Token::Ident(name) => Ok(Expr::Variable(name.clone())),
            Token::Unit(name) => Ok(Expr::Unit(name.clone())),
            Token::LParen => {
                let inner = self.nested(Self::expr)?;
                match self.peek() {
                    Some(Token::RParen) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(syntax_error(self.source, self.offset(), "expected ')'")),
                }
            }
            other => Err(syntax_error(self.source, offset, &format!("unexpected token {:?}", other))),
        }
    }
}
