//! Integer formulas used by custom switch blocks and scatter-gather patterns.
//!
//! Permutation functions such as `(t + 1) % W` and connection counts such
//! as `min(from, to)` are written as small integer expressions. This module
//! parses them once with a Pratt parser and evaluates them against a set of
//! variables.
//!
//! | BP (L,R) | Operators |
//! |----------|-----------|
//! | (1,2)    | `+` `-` |
//! | (3,4)    | `*` `/` `%` |
//! | prefix 5 | `-` `+` |
//!
//! Function calls: `min`, `max`, `gcd`, `lcm`, each taking two arguments.

use crate::error::RrGraphError;

/// Values of the variables a formula may reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormulaVars {
    /// `W`: number of destination wires.
    pub w: i64,
    /// `t`: index of the source wire.
    pub t: i64,
    /// `from`: size of the source set.
    pub from: i64,
    /// `to`: size of the destination set.
    pub to: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Var {
    W,
    T,
    From,
    To,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Func {
    Min,
    Max,
    Gcd,
    Lcm,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Expr {
    Num(i64),
    Var(Var),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>, Box<Expr>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Num(i64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
    Comma,
}

fn infix_binding_power(op: BinOp) -> (u8, u8) {
    match op {
        BinOp::Add | BinOp::Sub => (1, 2),
        BinOp::Mul | BinOp::Div | BinOp::Mod => (3, 4),
    }
}

const PREFIX_BP: u8 = 5;

/// A parsed formula.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Formula {
    text: String,
    expr: Expr,
}

impl Formula {
    /// Parses a formula.
    pub fn parse(text: &str) -> Result<Self, RrGraphError> {
        let tokens = tokenize(text)?;
        let mut parser = Parser {
            text,
            tokens: &tokens,
            pos: 0,
        };
        let expr = parser.parse_expr_bp(0)?;
        if parser.pos != tokens.len() {
            return Err(RrGraphError::bad_formula(text, "trailing input"));
        }
        Ok(Self {
            text: text.to_string(),
            expr,
        })
    }

    /// The formula as written.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Evaluates the formula.
    pub fn eval(&self, vars: FormulaVars) -> Result<i64, RrGraphError> {
        eval(&self.expr, vars).map_err(|reason| RrGraphError::bad_formula(&self.text, reason))
    }
}

/// Parses and evaluates a formula in one step.
pub fn eval_formula(text: &str, vars: FormulaVars) -> Result<i64, RrGraphError> {
    Formula::parse(text)?.eval(vars)
}

fn tokenize(text: &str) -> Result<Vec<Token>, RrGraphError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some(&(i, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' => {
                let mut end = i;
                while let Some(&(j, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = j + d.len_utf8();
                    chars.next();
                }
                let value = text[i..end]
                    .parse()
                    .map_err(|_| RrGraphError::bad_formula(text, "number out of range"))?;
                tokens.push(Token::Num(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = i;
                while let Some(&(j, d)) = chars.peek() {
                    if !(d.is_ascii_alphanumeric() || d == '_') {
                        break;
                    }
                    end = j + d.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Ident(text[i..end].to_string()));
            }
            '+' | '-' | '*' | '/' | '%' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            ',' => {
                tokens.push(Token::Comma);
                chars.next();
            }
            other => {
                return Err(RrGraphError::bad_formula(
                    text,
                    format!("unexpected character '{other}'"),
                ))
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    text: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    fn error(&self, reason: impl Into<String>) -> RrGraphError {
        RrGraphError::bad_formula(self.text, reason)
    }

    fn expect(&mut self, want: Token) -> Result<(), RrGraphError> {
        match self.next() {
            Some(tok) if *tok == want => Ok(()),
            Some(tok) => {
                let msg = format!("expected {want:?}, found {tok:?}");
                Err(self.error(msg))
            }
            None => Err(self.error(format!("expected {want:?} at end of input"))),
        }
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, RrGraphError> {
        let mut lhs = self.parse_prefix()?;
        loop {
            let op = match self.peek() {
                Some(Token::Op('+')) => BinOp::Add,
                Some(Token::Op('-')) => BinOp::Sub,
                Some(Token::Op('*')) => BinOp::Mul,
                Some(Token::Op('/')) => BinOp::Div,
                Some(Token::Op('%')) => BinOp::Mod,
                _ => break,
            };
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.pos += 1;
            let rhs = self.parse_expr_bp(r_bp)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, RrGraphError> {
        match self.next().cloned() {
            Some(Token::Num(n)) => Ok(Expr::Num(n)),
            Some(Token::Op('-')) => Ok(Expr::Neg(Box::new(self.parse_expr_bp(PREFIX_BP)?))),
            Some(Token::Op('+')) => self.parse_expr_bp(PREFIX_BP),
            Some(Token::LParen) => {
                let inner = self.parse_expr_bp(0)?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "W" => Ok(Expr::Var(Var::W)),
                "t" => Ok(Expr::Var(Var::T)),
                "from" => Ok(Expr::Var(Var::From)),
                "to" => Ok(Expr::Var(Var::To)),
                "min" | "max" | "gcd" | "lcm" => {
                    let func = match name.as_str() {
                        "min" => Func::Min,
                        "max" => Func::Max,
                        "gcd" => Func::Gcd,
                        _ => Func::Lcm,
                    };
                    self.expect(Token::LParen)?;
                    let a = self.parse_expr_bp(0)?;
                    self.expect(Token::Comma)?;
                    let b = self.parse_expr_bp(0)?;
                    self.expect(Token::RParen)?;
                    Ok(Expr::Call(func, Box::new(a), Box::new(b)))
                }
                _ => Err(self.error(format!("unknown identifier '{name}'"))),
            },
            Some(tok) => Err(self.error(format!("unexpected {tok:?}"))),
            None => Err(self.error("unexpected end of input")),
        }
    }
}

fn gcd(a: i64, b: i64) -> Option<i64> {
    let (mut a, mut b) = (a.checked_abs()?, b.checked_abs()?);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    Some(a)
}

fn lcm(a: i64, b: i64) -> Option<i64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)?).checked_mul(b)?.checked_abs()
}

fn eval(expr: &Expr, vars: FormulaVars) -> Result<i64, String> {
    let value = match expr {
        Expr::Num(n) => Some(*n),
        Expr::Var(Var::W) => Some(vars.w),
        Expr::Var(Var::T) => Some(vars.t),
        Expr::Var(Var::From) => Some(vars.from),
        Expr::Var(Var::To) => Some(vars.to),
        Expr::Neg(e) => eval(e, vars)?.checked_neg(),
        Expr::Binary(op, a, b) => {
            let (a, b) = (eval(a, vars)?, eval(b, vars)?);
            match op {
                BinOp::Add => a.checked_add(b),
                BinOp::Sub => a.checked_sub(b),
                BinOp::Mul => a.checked_mul(b),
                BinOp::Div | BinOp::Mod if b == 0 => return Err("division by zero".into()),
                BinOp::Div => a.checked_div(b),
                BinOp::Mod => a.checked_rem(b),
            }
        }
        Expr::Call(func, a, b) => {
            let (a, b) = (eval(a, vars)?, eval(b, vars)?);
            match func {
                Func::Min => Some(a.min(b)),
                Func::Max => Some(a.max(b)),
                Func::Gcd => gcd(a, b),
                Func::Lcm => lcm(a, b),
            }
        }
    };
    value.ok_or_else(|| "overflow".to_string())
}
