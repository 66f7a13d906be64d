//! Conditional field visibility
//!
//! A visibility expression is a single comparison `name OP literal` with
//! `OP` one of `==`, `!=`, `>=`, `<=`, `>`, `<`. There are no connectives.
//! Evaluation is fail-open: a missing or unparsable expression leaves the
//! field visible.

use crate::js::{self, Prim};
use crate::schema::FormValues;
use regex::Regex;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static EXPRESSION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // name, operator, literal; two-character operators tried first
    Regex::new(r"^\s*([A-Za-z0-9_]+)\s*(==|!=|>=|<=|>|<)\s*(.+)\s*$").ok()
});

/// Comparison operator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl Operator {
    /// Every operator, in the order the builder offers them
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Ge,
        Operator::Lt,
        Operator::Le,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Lt => "<",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "==" => Some(Operator::Eq),
            "!=" => Some(Operator::Ne),
            ">=" => Some(Operator::Ge),
            "<=" => Some(Operator::Le),
            ">" => Some(Operator::Gt),
            "<" => Some(Operator::Lt),
            _ => None,
        }
    }
}

/// Right-hand side of an expression
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Literal {
    /// Quoted string, then boolean, then number, then raw text
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        for quote in ['\'', '"'] {
            if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
                return Literal::Str(raw[1..raw.len() - 1].to_string());
            }
        }
        if raw.eq_ignore_ascii_case("true") {
            return Literal::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Literal::Bool(false);
        }
        if !raw.is_empty() {
            let n = js::string_to_number(raw);
            if !n.is_nan() {
                return Literal::Number(n);
            }
        }
        Literal::Str(raw.to_string())
    }

    fn as_prim(&self) -> Prim<'_> {
        match self {
            Literal::Bool(b) => Prim::Bool(*b),
            Literal::Number(n) => Prim::Num(*n),
            Literal::Str(s) => Prim::Str(Cow::Borrowed(s.as_str())),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Str(s) if s.contains('\'') => write!(f, "\"{}\"", s),
            Literal::Str(s) => write!(f, "'{}'", s),
        }
    }
}

/// Parsed visibility expression
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityExpr {
    pub field: String,
    pub op: Operator,
    pub literal: Literal,
}

impl VisibilityExpr {
    pub fn new(field: impl Into<String>, op: Operator, literal: Literal) -> Self {
        Self { field: field.into(), op, literal }
    }

    /// Parse `name OP literal`; `None` when the text does not match
    pub fn parse(expr: &str) -> Option<Self> {
        let re = EXPRESSION.as_ref()?;
        let caps = re.captures(expr)?;
        Some(Self {
            field: caps.get(1)?.as_str().to_string(),
            op: Operator::parse(caps.get(2)?.as_str())?,
            literal: Literal::parse(caps.get(3)?.as_str()),
        })
    }

    /// Evaluate against current form values
    pub fn evaluate(&self, values: &FormValues) -> bool {
        let lhs = Prim::from_value(values.get(&self.field));
        let rhs = self.literal.as_prim();
        match self.op {
            Operator::Eq => js::loose_eq(&lhs, &rhs),
            Operator::Ne => !js::loose_eq(&lhs, &rhs),
            Operator::Gt => js::loose_cmp(&lhs, &rhs) == Some(Ordering::Greater),
            Operator::Lt => js::loose_cmp(&lhs, &rhs) == Some(Ordering::Less),
            Operator::Ge => matches!(js::loose_cmp(&lhs, &rhs), Some(Ordering::Greater | Ordering::Equal)),
            Operator::Le => matches!(js::loose_cmp(&lhs, &rhs), Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

impl fmt::Display for VisibilityExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op.as_str(), self.literal)
    }
}

/// Whether a field gated by `expr` is visible for `values`
pub fn is_visible(expr: Option<&str>, values: &FormValues) -> bool {
    let Some(expr) = expr.filter(|e| !e.trim().is_empty()) else {
        return true;
    };
    match VisibilityExpr::parse(expr) {
        Some(parsed) => parsed.evaluate(values),
        None => {
            tracing::debug!(expr, "unparsable visibility expression, field stays visible");
            true
        }
    }
}
