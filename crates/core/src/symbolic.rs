//! Symbolic differentiation of single-variable expressions.
//!
//! Expressions use the service's syntax: `+ - * /`, powers written `**` (or
//! `^`), implicit multiplication after a number (`3x`), the constants `pi`
//! and `e`, and the functions `sin`, `cos`, `tan`, `exp`, `log` (natural),
//! `ln` and `sqrt`. The only variable is `x`.
//!
//! ```
//! use numera_core::symbolic::derivative;
//!
//! assert_eq!(derivative("x**3 - x - 2", 1).unwrap(), "3*x**2 - 1");
//! assert_eq!(derivative("x**3 - x - 2", 2).unwrap(), "6*x");
//! ```

use std::{fmt, iter::Peekable, str::CharIndices};

use thiserror::Error;

/// The variable expressions are written in.
pub const VARIABLE: &str = "x";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolicError {
    #[error("unexpected `{found}` at position {position}")]
    Unexpected { found: String, position: usize },

    #[error("expression ends unexpectedly")]
    UnexpectedEnd,

    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },

    #[error("unknown variable `{name}`, expressions use `x`")]
    UnknownVariable { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
    Sqrt,
}

impl Function {
    fn named(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "exp" => Self::Exp,
            "log" | "ln" => Self::Log,
            "sqrt" => Self::Sqrt,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Sqrt => "sqrt",
        }
    }
}

/// A parsed expression in `x`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Pi,
    Var,
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(Function, Box<Expr>),
}

/// Differentiates `expression` with respect to `x`, `order` times.
///
/// The result is simplified and written back in the service's syntax.
///
/// # Errors
///
/// Returns an error if the expression does not parse.
pub fn derivative(expression: &str, order: usize) -> Result<String, SymbolicError> {
    let mut expr = Expr::parse(expression)?;
    for _ in 0..order {
        expr = expr.derivative();
    }
    Ok(expr.to_string())
}

impl Expr {
    /// Parses an expression.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed input, unknown functions or any
    /// variable other than `x`.
    pub fn parse(input: &str) -> Result<Self, SymbolicError> {
        let mut parser = Parser::new(input)?;
        let expr = parser.sum()?;
        match parser.tokens.get(parser.next) {
            None => Ok(expr),
            Some(token) => Err(token.unexpected()),
        }
    }

    /// Returns the simplified derivative with respect to `x`.
    #[must_use]
    pub fn derivative(&self) -> Self {
        self.differentiate().simplify()
    }

    fn differentiate(&self) -> Self {
        use Expr::{Add, Call, Const, Div, Mul, Neg, Pi, Pow, Sub, Var};

        match self {
            Const(_) | Pi => Const(0.0),
            Var => Const(1.0),
            Neg(u) => Neg(u.differentiate().boxed()),
            Add(u, v) => Add(u.differentiate().boxed(), v.differentiate().boxed()),
            Sub(u, v) => Sub(u.differentiate().boxed(), v.differentiate().boxed()),
            Mul(u, v) if u.is_constant() => Mul(u.clone(), v.differentiate().boxed()),
            Mul(u, v) if v.is_constant() => Mul(u.differentiate().boxed(), v.clone()),
            Mul(u, v) => Add(
                Mul(u.differentiate().boxed(), v.clone()).boxed(),
                Mul(u.clone(), v.differentiate().boxed()).boxed(),
            ),
            Div(u, v) if v.is_constant() => Div(u.differentiate().boxed(), v.clone()),
            Div(u, v) => Div(
                Sub(
                    Mul(u.differentiate().boxed(), v.clone()).boxed(),
                    Mul(u.clone(), v.differentiate().boxed()).boxed(),
                )
                .boxed(),
                Pow(v.clone(), Const(2.0).boxed()).boxed(),
            ),
            Pow(base, exponent) if exponent.is_constant() => {
                let lowered = Sub(exponent.clone(), Const(1.0).boxed());
                Mul(
                    Mul(exponent.clone(), Pow(base.clone(), lowered.boxed()).boxed()).boxed(),
                    base.differentiate().boxed(),
                )
            }
            Pow(base, exponent) if base.is_constant() => Mul(
                Mul(self.clone().boxed(), Call(Function::Log, base.clone()).boxed()).boxed(),
                exponent.differentiate().boxed(),
            ),
            // d(u^v) = u^v * (v' ln u + v u' / u)
            Pow(base, exponent) => Mul(
                self.clone().boxed(),
                Add(
                    Mul(
                        exponent.differentiate().boxed(),
                        Call(Function::Log, base.clone()).boxed(),
                    )
                    .boxed(),
                    Div(
                        Mul(exponent.clone(), base.differentiate().boxed()).boxed(),
                        base.clone(),
                    )
                    .boxed(),
                )
                .boxed(),
            ),
            Call(function, u) => {
                let outer = match function {
                    Function::Sin => Call(Function::Cos, u.clone()),
                    Function::Cos => Neg(Call(Function::Sin, u.clone()).boxed()),
                    Function::Tan => Div(
                        Const(1.0).boxed(),
                        Pow(Call(Function::Cos, u.clone()).boxed(), Const(2.0).boxed()).boxed(),
                    ),
                    Function::Exp => self.clone(),
                    Function::Log => Div(Const(1.0).boxed(), u.clone()),
                    Function::Sqrt => Div(
                        Const(1.0).boxed(),
                        Mul(Const(2.0).boxed(), self.clone().boxed()).boxed(),
                    ),
                };
                Mul(outer.boxed(), u.differentiate().boxed())
            }
        }
    }

    /// Folds constants and removes identity operations, bottom-up.
    #[must_use]
    pub fn simplify(&self) -> Self {
        use Expr::{Add, Call, Const, Div, Mul, Neg, Pow, Sub};

        match self {
            Neg(u) => match u.simplify() {
                Const(a) => Const(-a),
                Neg(inner) => *inner,
                Mul(a, b) if matches!(*a, Const(_)) => Mul(a.negated().boxed(), b).simplify(),
                other => Neg(other.boxed()),
            },
            Add(u, v) => match (u.simplify(), v.simplify()) {
                (Const(a), Const(b)) => Const(a + b),
                (Const(z), other) | (other, Const(z)) if z == 0.0 => other,
                (lhs, Neg(rhs)) => Sub(lhs.boxed(), rhs),
                (lhs, rhs) if rhs.is_negative() => Sub(lhs.boxed(), rhs.negated().boxed()),
                (lhs, rhs) => Add(lhs.boxed(), rhs.boxed()),
            },
            Sub(u, v) => match (u.simplify(), v.simplify()) {
                (Const(a), Const(b)) => Const(a - b),
                (lhs, Const(z)) if z == 0.0 => lhs,
                (Const(z), rhs) if z == 0.0 => Neg(rhs.boxed()).simplify(),
                (lhs, Neg(rhs)) => Add(lhs.boxed(), rhs),
                (lhs, rhs) if rhs.is_negative() => Add(lhs.boxed(), rhs.negated().boxed()),
                (lhs, rhs) => Sub(lhs.boxed(), rhs.boxed()),
            },
            Mul(u, v) => match (u.simplify(), v.simplify()) {
                (Const(a), Const(b)) => Const(a * b),
                (Const(z), _) | (_, Const(z)) if z == 0.0 => Const(0.0),
                (Const(one), other) | (other, Const(one)) if one == 1.0 => other,
                (Const(minus), other) | (other, Const(minus)) if minus == -1.0 => {
                    Neg(other.boxed()).simplify()
                }
                (Const(a), Mul(lhs, rest)) => match *lhs {
                    Const(b) => Mul(Const(a * b).boxed(), rest).simplify(),
                    lhs => Mul(Const(a).boxed(), Mul(lhs.boxed(), rest).boxed()),
                },
                (Const(a), Neg(rest)) => Mul(Const(-a).boxed(), rest).simplify(),
                (other, Const(c)) => Mul(Const(c).boxed(), other.boxed()).simplify(),
                (Neg(a), b) => Neg(Mul(a, b.boxed()).boxed()).simplify(),
                (a, b) => Mul(a.boxed(), b.boxed()),
            },
            Div(u, v) => match (u.simplify(), v.simplify()) {
                (Const(a), Const(b)) if b != 0.0 => Const(a / b),
                (Const(z), _) if z == 0.0 => Const(0.0),
                (lhs, Const(one)) if one == 1.0 => lhs,
                (lhs, rhs) => Div(lhs.boxed(), rhs.boxed()),
            },
            Pow(base, exponent) => match (base.simplify(), exponent.simplify()) {
                (_, Const(z)) if z == 0.0 => Const(1.0),
                (base, Const(one)) if one == 1.0 => base,
                (Const(a), Const(b)) if a > 0.0 => Const(a.powf(b)),
                (base, exponent) => Pow(base.boxed(), exponent.boxed()),
            },
            Call(function, u) => Call(*function, u.simplify().boxed()),
            leaf => leaf.clone(),
        }
    }

    /// Returns `true` if the expression does not depend on `x`.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        match self {
            Self::Const(_) | Self::Pi => true,
            Self::Var => false,
            Self::Neg(u) | Self::Call(_, u) => u.is_constant(),
            Self::Add(u, v)
            | Self::Sub(u, v)
            | Self::Mul(u, v)
            | Self::Div(u, v)
            | Self::Pow(u, v) => u.is_constant() && v.is_constant(),
        }
    }

    fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    fn is_negative(&self) -> bool {
        match self {
            Self::Const(value) => *value < 0.0,
            Self::Mul(lhs, _) => matches!(**lhs, Self::Const(value) if value < 0.0),
            _ => false,
        }
    }

    /// Flips the sign of a negative constant or constant-led product.
    fn negated(&self) -> Self {
        match self {
            Self::Const(value) => Self::Const(-value),
            Self::Mul(lhs, rhs) => Self::Mul(lhs.negated().boxed(), rhs.clone()),
            other => Self::Neg(other.clone().boxed()),
        }
    }

    /// Binding strength when printed; higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            Self::Add(..) | Self::Sub(..) => 1,
            Self::Neg(_) => 2,
            Self::Const(value) if *value < 0.0 => 2,
            Self::Mul(..) | Self::Div(..) if self.leads_negative() => 2,
            Self::Mul(..) | Self::Div(..) => 3,
            Self::Pow(..) => 4,
            Self::Const(_) | Self::Pi | Self::Var | Self::Call(..) => 5,
        }
    }

    fn leads_negative(&self) -> bool {
        match self {
            Self::Neg(_) => true,
            Self::Const(value) => *value < 0.0,
            Self::Mul(lhs, _) | Self::Div(lhs, _) => lhs.leads_negative(),
            _ => false,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(value) if *value == 0.0 => f.write_str("0"),
            Self::Const(value) => write!(f, "{value}"),
            Self::Pi => f.write_str("pi"),
            Self::Var => f.write_str(VARIABLE),
            Self::Neg(u) => {
                f.write_str("-")?;
                u.fmt_operand(f, 3)
            }
            Self::Add(u, v) => {
                u.fmt_operand(f, 1)?;
                f.write_str(" + ")?;
                v.fmt_operand(f, 3)
            }
            Self::Sub(u, v) => {
                u.fmt_operand(f, 1)?;
                f.write_str(" - ")?;
                v.fmt_operand(f, 3)
            }
            Self::Mul(u, v) => {
                u.fmt_operand(f, 2)?;
                f.write_str("*")?;
                v.fmt_operand(f, 3)
            }
            Self::Div(u, v) => {
                u.fmt_operand(f, 2)?;
                f.write_str("/")?;
                v.fmt_operand(f, 4)
            }
            Self::Pow(base, exponent) => {
                base.fmt_operand(f, 5)?;
                f.write_str("**")?;
                exponent.fmt_operand(f, 4)
            }
            Self::Call(function, u) => write!(f, "{}({u})", function.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Op(char),
    Power,
    Open,
    Close,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    text: String,
    position: usize,
}

impl Token {
    fn unexpected(&self) -> SymbolicError {
        SymbolicError::Unexpected {
            found: self.text.clone(),
            position: self.position,
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, SymbolicError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            c if c.is_ascii_digit() || c == '.' => number(input, start, &mut chars)?,
            c if c.is_ascii_alphabetic() || c == '_' => {
                let end = take_while(&mut chars, |c| c.is_ascii_alphanumeric() || c == '_');
                TokenKind::Ident(input[start..end].to_owned())
            }
            '*' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '*').is_some() {
                    TokenKind::Power
                } else {
                    TokenKind::Op('*')
                }
            }
            '^' => {
                chars.next();
                TokenKind::Power
            }
            '+' | '-' | '/' => {
                chars.next();
                TokenKind::Op(c)
            }
            '(' => {
                chars.next();
                TokenKind::Open
            }
            ')' => {
                chars.next();
                TokenKind::Close
            }
            other => {
                return Err(SymbolicError::Unexpected {
                    found: other.to_string(),
                    position: start,
                });
            }
        };
        let end = chars.peek().map_or(input.len(), |&(index, _)| index);
        tokens.push(Token {
            kind,
            text: input[start..end].to_owned(),
            position: start,
        });
    }

    Ok(tokens)
}

fn take_while(chars: &mut Peekable<CharIndices<'_>>, keep: impl Fn(char) -> bool) -> usize {
    let mut end = 0;
    while let Some((index, c)) = chars.next_if(|&(_, c)| keep(c)) {
        end = index + c.len_utf8();
    }
    end
}

/// Reads a decimal literal with an optional exponent (`1.5e-3`).
///
/// An `e` not followed by digits is left for the next token, so `2e` reads
/// as `2` times the constant `e`.
fn number(
    input: &str,
    start: usize,
    chars: &mut Peekable<CharIndices<'_>>,
) -> Result<TokenKind, SymbolicError> {
    let mut end = take_while(chars, |c| c.is_ascii_digit() || c == '.');

    let rest = &input[end..];
    let mut exponent = rest.chars();
    if matches!(exponent.next(), Some('e' | 'E')) {
        let after_sign = match exponent.clone().next() {
            Some('+' | '-') => 2,
            _ => 1,
        };
        if rest[after_sign..].starts_with(|c: char| c.is_ascii_digit()) {
            for _ in 0..after_sign {
                chars.next();
            }
            end = take_while(chars, |c| c.is_ascii_digit());
        }
    }

    let text = &input[start..end];
    text.parse()
        .map(TokenKind::Number)
        .map_err(|_| SymbolicError::Unexpected {
            found: text.to_owned(),
            position: start,
        })
}

struct Parser {
    tokens: Vec<Token>,
    next: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self, SymbolicError> {
        Ok(Self {
            tokens: tokenize(input)?,
            next: 0,
        })
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.next).map(|token| &token.kind)
    }

    fn advance(&mut self) -> Result<Token, SymbolicError> {
        let token = self
            .tokens
            .get(self.next)
            .cloned()
            .ok_or(SymbolicError::UnexpectedEnd)?;
        self.next += 1;
        Ok(token)
    }

    fn sum(&mut self) -> Result<Expr, SymbolicError> {
        let mut expr = self.product()?;
        while let Some(&TokenKind::Op(op @ ('+' | '-'))) = self.peek() {
            self.next += 1;
            let rhs = self.product()?.boxed();
            expr = if op == '+' {
                Expr::Add(expr.boxed(), rhs)
            } else {
                Expr::Sub(expr.boxed(), rhs)
            };
        }
        Ok(expr)
    }

    fn product(&mut self) -> Result<Expr, SymbolicError> {
        let mut expr = self.unary()?;
        loop {
            match self.peek() {
                Some(&TokenKind::Op(op @ ('*' | '/'))) => {
                    self.next += 1;
                    let rhs = self.unary()?.boxed();
                    expr = if op == '*' {
                        Expr::Mul(expr.boxed(), rhs)
                    } else {
                        Expr::Div(expr.boxed(), rhs)
                    };
                }
                // Implicit multiplication: `3x`, `2(x + 1)`, `x sin(x)`.
                Some(TokenKind::Number(_) | TokenKind::Ident(_) | TokenKind::Open) => {
                    let rhs = self.power()?.boxed();
                    expr = Expr::Mul(expr.boxed(), rhs);
                }
                _ => return Ok(expr),
            }
        }
    }

    fn unary(&mut self) -> Result<Expr, SymbolicError> {
        match self.peek() {
            Some(TokenKind::Op('-')) => {
                self.next += 1;
                Ok(Expr::Neg(self.unary()?.boxed()))
            }
            Some(TokenKind::Op('+')) => {
                self.next += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, SymbolicError> {
        let base = self.atom()?;
        if self.peek() == Some(&TokenKind::Power) {
            self.next += 1;
            let exponent = self.unary()?;
            return Ok(Expr::Pow(base.boxed(), exponent.boxed()));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, SymbolicError> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Const(value)),
            TokenKind::Open => {
                let expr = self.sum()?;
                self.close()?;
                Ok(expr)
            }
            TokenKind::Ident(name) if self.peek() == Some(&TokenKind::Open) => {
                let function =
                    Function::named(&name).ok_or(SymbolicError::UnknownFunction { name })?;
                self.next += 1;
                let argument = self.sum()?;
                self.close()?;
                Ok(Expr::Call(function, argument.boxed()))
            }
            TokenKind::Ident(name) => {
                if name == VARIABLE {
                    Ok(Expr::Var)
                } else if name == "pi" {
                    Ok(Expr::Pi)
                } else if name == "e" || name == "E" {
                    Ok(Expr::Call(Function::Exp, Expr::Const(1.0).boxed()))
                } else {
                    Err(SymbolicError::UnknownVariable { name })
                }
            }
            _ => Err(SymbolicError::Unexpected {
                found: token.text,
                position: token.position,
            }),
        }
    }

    fn close(&mut self) -> Result<(), SymbolicError> {
        let token = self.advance()?;
        if token.kind == TokenKind::Close {
            Ok(())
        } else {
            Err(token.unexpected())
        }
    }
}
