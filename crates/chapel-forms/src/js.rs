//! Loose value semantics shared by the visibility evaluator and pricing
//!
//! Form values arrive as JSON produced by a browser, and the stored
//! visibility expressions were written against browser comparison rules.
//! The helpers here reproduce those rules over `serde_json::Value`:
//! abstract equality (`"20" == 20`, `true == 1`), abstract relational
//! comparison, numeric coercion and truthiness.

use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;

/// A primitive after coercion of a form value
#[derive(Debug, Clone, PartialEq)]
pub enum Prim<'a> {
    /// Key absent from the form values
    Undefined,
    /// Explicit JSON null
    Null,
    /// Boolean
    Bool(bool),
    /// Number
    Num(f64),
    /// String
    Str(Cow<'a, str>),
}

impl<'a> Prim<'a> {
    /// Coerce an optional form value to a primitive
    ///
    /// Arrays join their elements with `,` and objects collapse to
    /// `[object Object]`, as a browser would when comparing them.
    pub fn from_value(value: Option<&'a Value>) -> Self {
        match value {
            None => Prim::Undefined,
            Some(Value::Null) => Prim::Null,
            Some(Value::Bool(b)) => Prim::Bool(*b),
            Some(Value::Number(n)) => Prim::Num(n.as_f64().unwrap_or(f64::NAN)),
            Some(Value::String(s)) => Prim::Str(Cow::Borrowed(s.as_str())),
            Some(Value::Array(items)) => Prim::Str(Cow::Owned(join_array(items))),
            Some(Value::Object(_)) => Prim::Str(Cow::Borrowed("[object Object]")),
        }
    }

    /// Numeric coercion
    pub fn to_number(&self) -> f64 {
        match self {
            Prim::Undefined => f64::NAN,
            Prim::Null => 0.0,
            Prim::Bool(b) => bool_to_number(*b),
            Prim::Num(n) => *n,
            Prim::Str(s) => string_to_number(s),
        }
    }
}

fn bool_to_number(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn join_array(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Array(inner) => join_array(inner),
            Value::Object(_) => "[object Object]".to_string(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a string the way numeric coercion does
///
/// Surrounding whitespace is ignored, an empty string is `0`, hex/octal/
/// binary prefixes and `Infinity` are accepted, anything else that is not
/// a plain decimal literal is `NaN`.
pub fn string_to_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Abstract (loose) equality between two primitives
pub fn loose_eq(a: &Prim<'_>, b: &Prim<'_>) -> bool {
    match (a, b) {
        (Prim::Undefined | Prim::Null, Prim::Undefined | Prim::Null) => true,
        (Prim::Undefined | Prim::Null, _) | (_, Prim::Undefined | Prim::Null) => false,
        (Prim::Num(x), Prim::Num(y)) => x == y,
        (Prim::Str(x), Prim::Str(y)) => x == y,
        (Prim::Bool(x), Prim::Bool(y)) => x == y,
        (Prim::Num(x), Prim::Str(s)) | (Prim::Str(s), Prim::Num(x)) => *x == string_to_number(s),
        (Prim::Bool(x), other) => loose_eq(&Prim::Num(bool_to_number(*x)), other),
        (other, Prim::Bool(y)) => loose_eq(other, &Prim::Num(bool_to_number(*y))),
    }
}

/// Abstract relational comparison
///
/// Two strings compare by UTF-16 code units; any other pairing compares
/// numerically. `None` means the comparison is undefined (a `NaN` side),
/// which makes every ordering operator false.
pub fn loose_cmp(a: &Prim<'_>, b: &Prim<'_>) -> Option<Ordering> {
    if let (Prim::Str(x), Prim::Str(y)) = (a, b) {
        return Some(x.encode_utf16().cmp(y.encode_utf16()));
    }
    a.to_number().partial_cmp(&b.to_number())
}

/// Truthiness of a form value
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
