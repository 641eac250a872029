//! Member value codec.
//!
//! Every member is canonicalized to a string before it is used as a lookup
//! key or stored value, so the same logical member always hits the same row
//! or ranked entry in either backend. Numbers render the way a JSON-speaking
//! client would print them: `5.0` and `5` are the same member `"5"`.

use std::fmt;

use serde_json::Value;

use crate::error::{OrdSetError, OrdSetResult};

/// A member value before canonicalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl Member {
    /// Convert a JSON value into a member.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for `null`, arrays and objects.
    pub fn from_json(value: &Value) -> OrdSetResult<Self> {
        match value {
            Value::String(s) => Ok(Member::Str(s.clone())),
            Value::Bool(b) => Ok(Member::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Member::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Member::UInt(u))
                } else {
                    n.as_f64().map(Member::Float).ok_or_else(|| {
                        OrdSetError::invalid_argument("member", format!("unrepresentable number {n}"))
                    })
                }
            }
            Value::Null => Err(OrdSetError::invalid_argument(
                "member",
                "null is not a valid member",
            )),
            Value::Array(_) | Value::Object(_) => Err(OrdSetError::invalid_argument(
                "member",
                "structured values cannot be members",
            )),
        }
    }

    /// The canonical string form of this member.
    pub fn canonical(&self) -> String {
        match self {
            Member::Str(s) => s.clone(),
            Member::Int(i) => i.to_string(),
            Member::UInt(u) => u.to_string(),
            Member::Float(f) => format_float(*f),
            Member::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<&str> for Member {
    fn from(value: &str) -> Self {
        Member::Str(value.to_string())
    }
}

impl From<String> for Member {
    fn from(value: String) -> Self {
        Member::Str(value)
    }
}

impl From<&String> for Member {
    fn from(value: &String) -> Self {
        Member::Str(value.clone())
    }
}

impl From<i32> for Member {
    fn from(value: i32) -> Self {
        Member::Int(i64::from(value))
    }
}

impl From<i64> for Member {
    fn from(value: i64) -> Self {
        Member::Int(value)
    }
}

impl From<u32> for Member {
    fn from(value: u32) -> Self {
        Member::UInt(u64::from(value))
    }
}

impl From<u64> for Member {
    fn from(value: u64) -> Self {
        Member::UInt(value)
    }
}

impl From<f64> for Member {
    fn from(value: f64) -> Self {
        Member::Float(value)
    }
}

impl From<bool> for Member {
    fn from(value: bool) -> Self {
        Member::Bool(value)
    }
}

/// Canonicalize a typed member value.
///
/// ```rust
/// use ordset_core::codec::canonicalize;
///
/// assert_eq!(canonicalize(42_i64), "42");
/// assert_eq!(canonicalize(42.0_f64), "42");
/// assert_eq!(canonicalize("42"), "42");
/// ```
pub fn canonicalize(value: impl Into<Member>) -> String {
    value.into().canonical()
}

/// Canonicalize a JSON member value.
///
/// # Errors
///
/// `InvalidArgument` if `value` is `null` or structured.
pub fn canonicalize_json(value: &Value) -> OrdSetResult<String> {
    Member::from_json(value).map(|m| m.canonical())
}

// Shortest round-trip digits, with exponent notation outside [1e-6, 1e21)
// and no negative zero.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }
    let abs = f.abs();
    if (1e-6..1e21).contains(&abs) {
        return f.to_string();
    }
    let exp = format!("{f:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}
