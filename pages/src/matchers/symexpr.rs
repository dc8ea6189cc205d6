//! Minimal symbolic expression support for answer matching.
//!
//! Parses the usual calculator grammar (`+ - * / ^`, unary minus,
//! parentheses, numeric literals, variables, and a small function set) into
//! an expression tree. Two expressions are considered equivalent when they
//! agree, within a relative tolerance, at a set of seeded pseudo-random
//! sample points over the union of their variables. Samples where either
//! side is non-finite (poles, domain errors) are skipped; a minimum number
//! of comparable samples is required so that equivalence is never decided
//! from noise alone.

use std::collections::{BTreeSet, HashMap};
use std::iter::Peekable;
use std::str::Chars;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

const SAMPLE_COUNT: usize = 16;
const MIN_COMPARABLE: usize = 4;
const RELATIVE_TOLERANCE: f64 = 1e-9;
const SAMPLE_SEED: u64 = 0x9d2c_5680;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid expression: {0}")]
pub struct ParseError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
    Sqrt,
    Abs,
}

impl Func {
    fn from_name(name: &str) -> Option<Func> {
        match name {
            "sin" => Some(Func::Sin),
            "cos" => Some(Func::Cos),
            "tan" => Some(Func::Tan),
            "exp" => Some(Func::Exp),
            "log" => Some(Func::Log),
            "sqrt" => Some(Func::Sqrt),
            "abs" => Some(Func::Abs),
            _ => None,
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Exp => x.exp(),
            Func::Log => x.ln(),
            Func::Sqrt => x.sqrt(),
            Func::Abs => x.abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    fn eval(&self, bindings: &HashMap<String, f64>) -> f64 {
        match self {
            Expr::Number(n) => *n,
            Expr::Variable(name) => bindings.get(name).copied().unwrap_or(f64::NAN),
            Expr::Neg(inner) => -inner.eval(bindings),
            Expr::Add(a, b) => a.eval(bindings) + b.eval(bindings),
            Expr::Sub(a, b) => a.eval(bindings) - b.eval(bindings),
            Expr::Mul(a, b) => a.eval(bindings) * b.eval(bindings),
            Expr::Div(a, b) => a.eval(bindings) / b.eval(bindings),
            Expr::Pow(a, b) => a.eval(bindings).powf(b.eval(bindings)),
            Expr::Call(func, arg) => func.apply(arg.eval(bindings)),
        }
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(name) => {
                out.insert(name.clone());
            }
            Expr::Neg(inner) | Expr::Call(_, inner) => inner.collect_variables(out),
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => {
                a.collect_variables(out);
                b.collect_variables(out);
            }
        }
    }
}

/// Parse an expression string.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser {
        chars: input.chars().peekable(),
    };
    let expr = parser.expression()?;
    parser.skip_whitespace();
    match parser.chars.next() {
        None => Ok(expr),
        Some(c) => Err(ParseError(format!("unexpected '{c}'"))),
    }
}

/// Decide algebraic equivalence by seeded randomized evaluation.
pub fn equivalent(a: &Expr, b: &Expr) -> bool {
    let mut variables = BTreeSet::new();
    a.collect_variables(&mut variables);
    b.collect_variables(&mut variables);

    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
    let mut comparable = 0;

    for _ in 0..SAMPLE_COUNT {
        let bindings: HashMap<String, f64> = variables
            .iter()
            .map(|name| (name.clone(), rng.random_range(0.25_f64..2.75)))
            .collect();

        let left = a.eval(&bindings);
        let right = b.eval(&bindings);
        if !left.is_finite() || !right.is_finite() {
            continue;
        }

        comparable += 1;
        let scale = left.abs().max(right.abs()).max(1.0);
        if (left - right).abs() > RELATIVE_TOLERANCE * scale {
            return false;
        }
    }

    comparable >= MIN_COMPARABLE
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn eat(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.chars.next() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(ParseError(format!("expected '{expected}', found '{c}'"))),
            None => Err(ParseError(format!("expected '{expected}'"))),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.chars.peek().copied()
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                '+' => {
                    self.chars.next();
                    expr = Expr::Add(Box::new(expr), Box::new(self.term()?));
                }
                '-' => {
                    self.chars.next();
                    expr = Expr::Sub(Box::new(expr), Box::new(self.term()?));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                '*' => {
                    self.chars.next();
                    expr = Expr::Mul(Box::new(expr), Box::new(self.factor()?));
                }
                '/' => {
                    self.chars.next();
                    expr = Expr::Div(Box::new(expr), Box::new(self.factor()?));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    // factor := '-' factor | power
    fn factor(&mut self) -> Result<Expr, ParseError> {
        if self.peek() == Some('-') {
            self.chars.next();
            return Ok(Expr::Neg(Box::new(self.factor()?)));
        }
        self.power()
    }

    // power := atom ('^' factor)?   (right-associative)
    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.atom()?;
        if self.peek() == Some('^') {
            self.chars.next();
            let exponent = self.factor()?;
            return Ok(Expr::Pow(Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    // atom := number | identifier ('(' expression ')')? | '(' expression ')'
    fn atom(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some('(') => {
                self.chars.next();
                let expr = self.expression()?;
                self.eat(')')?;
                Ok(expr)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
            Some(c) => Err(ParseError(format!("unexpected '{c}'"))),
            None => Err(ParseError("unexpected end of expression".to_string())),
        }
    }

    fn number(&mut self) -> Result<Expr, ParseError> {
        let mut text = String::new();
        while self
            .chars
            .peek()
            .is_some_and(|&c| c.is_ascii_digit() || c == '.')
        {
            text.push(self.chars.next().unwrap());
        }
        // optional exponent part: 1e-3, 2.5E4
        if self.chars.peek().is_some_and(|&c| c == 'e' || c == 'E') {
            text.push(self.chars.next().unwrap());
            if self.chars.peek().is_some_and(|&c| c == '+' || c == '-') {
                text.push(self.chars.next().unwrap());
            }
            while self.chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                text.push(self.chars.next().unwrap());
            }
        }
        text.parse::<f64>()
            .map(Expr::Number)
            .map_err(|_| ParseError(format!("bad number '{text}'")))
    }

    fn identifier(&mut self) -> Result<Expr, ParseError> {
        let mut name = String::new();
        while self
            .chars
            .peek()
            .is_some_and(|&c| c.is_ascii_alphanumeric() || c == '_')
        {
            name.push(self.chars.next().unwrap());
        }

        if self.peek() == Some('(') {
            let func = Func::from_name(&name)
                .ok_or_else(|| ParseError(format!("unknown function '{name}'")))?;
            self.chars.next();
            let arg = self.expression()?;
            self.eat(')')?;
            return Ok(Expr::Call(func, Box::new(arg)));
        }

        Ok(Expr::Variable(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_equivalent(a: &str, b: &str) -> bool {
        equivalent(&parse(a).unwrap(), &parse(b).unwrap())
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert!(check_equivalent("2 + 3 * 4", "14"));
        assert!(check_equivalent("2 ^ 3 ^ 2", "512"));
        assert!(check_equivalent("10 - 4 - 3", "3"));
        assert!(check_equivalent("-x + x", "0"));
    }

    #[test]
    fn test_algebraic_identities() {
        assert!(check_equivalent("x + x", "2*x"));
        assert!(check_equivalent("(x + 1)^2", "x^2 + 2*x + 1"));
        assert!(check_equivalent("sin(x)^2 + cos(x)^2", "1"));
        assert!(check_equivalent("(a*b)/b", "a"));
    }

    #[test]
    fn test_non_equivalent() {
        assert!(!check_equivalent("x", "x + 1"));
        assert!(!check_equivalent("2*x", "x^2"));
        assert!(!check_equivalent("x*y", "x+y"));
    }

    #[test]
    fn test_equivalence_is_deterministic() {
        let a = parse("x^2 - 1").unwrap();
        let b = parse("(x-1)*(x+1)").unwrap();
        for _ in 0..5 {
            assert!(equivalent(&a, &b));
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("x +* 3").is_err());
        assert!(parse("(x + 1").is_err());
        assert!(parse("foo(x)").is_err());
        assert!(parse("").is_err());
        assert!(parse("3 4").is_err());
    }

    #[test]
    fn test_functions_evaluate() {
        assert!(check_equivalent("log(exp(x))", "x"));
        assert!(check_equivalent("sqrt(x^2)", "abs(x)"));
    }
}
