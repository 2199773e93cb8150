//! The `f(d)` height-function language.
//!
//! Ring heights are produced by a user-supplied single-variable function of
//! distance, written as an ordinary arithmetic expression over the variable
//! `d`, e.g. `d**2 + d + 1` or `100 / (d + 1)`. The expression is parsed
//! once into a [`ZFunc`] and evaluated per ring distance.
//!
//! Grammar: f64 literals, `d`, the constants `pi` and `e`, the operators
//! `+ - * / %` and power (`^` or `**`, right associative), unary minus,
//! parentheses, and a fixed set of function calls (`sqrt`, `abs`, `sin`,
//! `cos`, `tan`, `asin`, `acos`, `atan`, `exp`, `ln`, `log10`, `floor`,
//! `ceil`, and the two-argument `pow`, `min`, `max`, `atan2`).
//!
//! Unary minus binds tighter than multiplication but looser than power, so
//! `-d**2` is `-(d**2)`, matching the conventional reading.

use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    Sqrt,
    Abs,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Ln,
    Log10,
    Floor,
    Ceil,
    Pow,
    Min,
    Max,
    Atan2,
}

impl Func {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "sqrt" => Self::Sqrt,
            "abs" => Self::Abs,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            "exp" => Self::Exp,
            "ln" => Self::Ln,
            "log10" => Self::Log10,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "pow" => Self::Pow,
            "min" => Self::Min,
            "max" => Self::Max,
            "atan2" => Self::Atan2,
            _ => return None,
        })
    }

    fn arity(self) -> usize {
        match self {
            Self::Pow | Self::Min | Self::Max | Self::Atan2 => 2,
            _ => 1,
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        match self {
            Self::Sqrt => args[0].sqrt(),
            Self::Abs => args[0].abs(),
            Self::Sin => args[0].sin(),
            Self::Cos => args[0].cos(),
            Self::Tan => args[0].tan(),
            Self::Asin => args[0].asin(),
            Self::Acos => args[0].acos(),
            Self::Atan => args[0].atan(),
            Self::Exp => args[0].exp(),
            Self::Ln => args[0].ln(),
            Self::Log10 => args[0].log10(),
            Self::Floor => args[0].floor(),
            Self::Ceil => args[0].ceil(),
            Self::Pow => args[0].powf(args[1]),
            Self::Min => args[0].min(args[1]),
            Self::Max => args[0].max(args[1]),
            Self::Atan2 => args[0].atan2(args[1]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Dist,
    Neg(Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

impl Expr {
    fn eval(&self, d: f64) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Dist => d,
            Self::Neg(inner) => -inner.eval(d),
            Self::Bin(op, lhs, rhs) => {
                let a = lhs.eval(d);
                let b = rhs.eval(d);
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Rem => a % b,
                    BinOp::Pow => a.powf(b),
                }
            }
            Self::Call(func, args) => {
                let values: Vec<f64> = args.iter().map(|a| a.eval(d)).collect();
                func.apply(&values)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Pow,
    LParen,
    RParen,
    Comma,
}

fn err(message: impl Into<String>, offset: usize) -> Error {
    Error::Expression {
        message: message.into(),
        offset,
    }
}

fn tokenize(src: &str) -> Result<Vec<(Token, usize)>> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push((Token::Plus, i));
                i += 1;
            }
            '-' => {
                tokens.push((Token::Minus, i));
                i += 1;
            }
            '*' => {
                if bytes.get(i + 1) == Some(&b'*') {
                    tokens.push((Token::Pow, i));
                    i += 2;
                } else {
                    tokens.push((Token::Star, i));
                    i += 1;
                }
            }
            '/' => {
                tokens.push((Token::Slash, i));
                i += 1;
            }
            '%' => {
                tokens.push((Token::Percent, i));
                i += 1;
            }
            '^' => {
                tokens.push((Token::Pow, i));
                i += 1;
            }
            '(' => {
                tokens.push((Token::LParen, i));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, i));
                i += 1;
            }
            ',' => {
                tokens.push((Token::Comma, i));
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                // Exponent part, careful not to swallow the constant `e`.
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j].is_ascii_digit() {
                        i = j;
                        while i < bytes.len() && bytes[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text = &src[start..i];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| err(format!("invalid number: {text:?}"), start))?;
                tokens.push((Token::Number(value), start));
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                tokens.push((Token::Ident(src[start..i].to_string()), start));
            }
            other => return Err(err(format!("unexpected character: {other:?}"), i)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.len, |&(_, offset)| offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        token
    }

    fn expect(&mut self, token: &Token, what: &str) -> Result<()> {
        let offset = self.offset();
        match self.advance() {
            Some(found) if found == *token => Ok(()),
            _ => Err(err(format!("expected {what}"), offset)),
        }
    }

    /// Pratt expression parser. Binding powers: `+ -` (1), `* / %` (3),
    /// unary `-` (5), power (6, right associative).
    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_prefix()?;

        while let Some(token) = self.peek() {
            let (op, lbp, rbp) = match token {
                Token::Plus => (BinOp::Add, 1, 2),
                Token::Minus => (BinOp::Sub, 1, 2),
                Token::Star => (BinOp::Mul, 3, 4),
                Token::Slash => (BinOp::Div, 3, 4),
                Token::Percent => (BinOp::Rem, 3, 4),
                Token::Pow => (BinOp::Pow, 6, 5),
                _ => break,
            };
            if lbp < min_bp {
                break;
            }
            self.pos += 1;
            let rhs = self.parse_expr(rbp)?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        let offset = self.offset();
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Minus) => Ok(Expr::Neg(Box::new(self.parse_expr(5)?))),
            Some(Token::LParen) => {
                let inner = self.parse_expr(0)?;
                self.expect(&Token::RParen, "closing parenthesis")?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => self.parse_ident(&name, offset),
            Some(token) => Err(err(format!("unexpected token: {token:?}"), offset)),
            None => Err(err("unexpected end of expression", offset)),
        }
    }

    fn parse_ident(&mut self, name: &str, offset: usize) -> Result<Expr> {
        match name {
            "d" => return Ok(Expr::Dist),
            "pi" => return Ok(Expr::Number(std::f64::consts::PI)),
            "e" => return Ok(Expr::Number(std::f64::consts::E)),
            _ => {}
        }

        let Some(func) = Func::lookup(name) else {
            return Err(err(format!("unknown identifier: {name:?}"), offset));
        };

        self.expect(&Token::LParen, &format!("'(' after {name}"))?;
        let mut args = vec![self.parse_expr(0)?];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            args.push(self.parse_expr(0)?);
        }
        self.expect(&Token::RParen, "closing parenthesis")?;

        if args.len() != func.arity() {
            return Err(err(
                format!(
                    "{name} takes {} argument(s), got {}",
                    func.arity(),
                    args.len()
                ),
                offset,
            ));
        }

        Ok(Expr::Call(func, args))
    }
}

/// A parsed height function of a single distance variable `d`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZFunc {
    source: String,
    ast: Expr,
}

impl ZFunc {
    /// Parse an expression source string.
    ///
    /// # Errors
    /// Returns `Error::Expression` with the byte offset of the problem.
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(err("empty expression", 0));
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            len: source.len(),
        };
        let ast = parser.parse_expr(0)?;
        if parser.pos < parser.tokens.len() {
            return Err(err("trailing input after expression", parser.offset()));
        }
        Ok(Self {
            source: source.to_string(),
            ast,
        })
    }

    /// Evaluate at distance `d`. Domain errors surface as NaN/infinity and
    /// are rejected by the caller, not here.
    #[must_use]
    pub fn eval(&self, d: f64) -> f64 {
        self.ast.eval(d)
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for ZFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str, d: f64) -> f64 {
        ZFunc::parse(src).unwrap().eval(d)
    }

    #[test]
    fn test_literal_and_variable() {
        assert_eq!(eval("42", 0.0), 42.0);
        assert_eq!(eval("d", 7.5), 7.5);
        assert_eq!(eval("1.5e2", 0.0), 150.0);
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2 + 3 * 4", 0.0), 14.0);
        assert_eq!(eval("(2 + 3) * 4", 0.0), 20.0);
        assert_eq!(eval("10 - 4 - 3", 0.0), 3.0);
        assert_eq!(eval("7 % 4", 0.0), 3.0);
    }

    #[test]
    fn test_power_right_associative() {
        assert_eq!(eval("2 ^ 3 ^ 2", 0.0), 512.0);
        assert_eq!(eval("2 ** 3 ** 2", 0.0), 512.0);
    }

    #[test]
    fn test_unary_minus_vs_power() {
        // Python reading: -d**2 is -(d**2)
        assert_eq!(eval("-d**2", 3.0), -9.0);
        assert_eq!(eval("(-d)**2", 3.0), 9.0);
        assert_eq!(eval("-2 * 3", 0.0), -6.0);
    }

    #[test]
    fn test_original_readme_example() {
        // 'd**2 + d + 1' from the tool's documented usage
        assert_eq!(eval("d**2 + d + 1", 3.0), 13.0);
    }

    #[test]
    fn test_decay_profile() {
        assert_eq!(eval("100 / (d + 1)", 0.0), 100.0);
        assert_eq!(eval("100 / (d + 1)", 24.0), 4.0);
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval("sqrt(16)", 0.0), 4.0);
        assert_eq!(eval("abs(-3)", 0.0), 3.0);
        assert_eq!(eval("min(2, 3)", 0.0), 2.0);
        assert_eq!(eval("max(2, 3)", 0.0), 3.0);
        assert_eq!(eval("pow(2, 10)", 0.0), 1024.0);
        assert_eq!(eval("floor(2.9)", 0.0), 2.0);
        assert!((eval("sin(pi)", 0.0)).abs() < 1e-12);
        assert!((eval("ln(e)", 0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_e_vs_exponent() {
        assert!((eval("e", 0.0) - std::f64::consts::E).abs() < 1e-12);
        assert_eq!(eval("2e3", 0.0), 2000.0);
        // `2e` is the number 2 followed by the constant: trailing input
        assert!(ZFunc::parse("2e").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(ZFunc::parse("").is_err());
        assert!(ZFunc::parse("2 +").is_err());
        assert!(ZFunc::parse("(2 + 3").is_err());
        assert!(ZFunc::parse("frob(2)").is_err());
        assert!(ZFunc::parse("sqrt(1, 2)").is_err());
        assert!(ZFunc::parse("min(1)").is_err());
        assert!(ZFunc::parse("2 $ 3").is_err());
        assert!(ZFunc::parse("x + 1").is_err());
    }

    #[test]
    fn test_error_offset() {
        let Error::Expression { offset, .. } = ZFunc::parse("1 + $").unwrap_err() else {
            panic!("wrong error kind");
        };
        assert_eq!(offset, 4);
    }

    #[test]
    fn test_nonfinite_results_pass_through() {
        assert!(eval("1 / d", 0.0).is_infinite());
        assert!(eval("sqrt(-1)", 0.0).is_nan());
    }
}
