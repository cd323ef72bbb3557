//! Literal values used in conditions and function arguments

use super::quote::{is_regex_literal, quote};

/// A literal compared against a field or passed to a function
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text value, single quoted in conditions
    String(String),
    /// Regular expression pattern without the surrounding slashes
    Regex(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
}

impl Value {
    /// Build a regex value from a bare pattern
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex(pattern.into())
    }

    /// Render as the right-hand side of a condition
    ///
    /// Strings written as `/pattern/` are treated as regex literals.
    pub fn to_condition_literal(&self) -> String {
        match self {
            Self::String(s) if is_regex_literal(s) => s.clone(),
            Self::String(s) => format!("'{}'", s.replace('\'', "\\'")),
            Self::Regex(pattern) => format!("/{}/", pattern),
            Self::Integer(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Boolean(b) => b.to_string(),
        }
    }

    /// Render as a function argument, where strings name fields
    pub fn to_argument(&self) -> String {
        match self {
            Self::String(s) => quote(s),
            other => other.to_condition_literal(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<&regex::Regex> for Value {
    fn from(re: &regex::Regex) -> Self {
        Self::Regex(re.as_str().to_string())
    }
}

impl From<regex::Regex> for Value {
    fn from(re: regex::Regex) -> Self {
        Self::from(&re)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::Float(n as f64)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Self::Integer(n as i64)
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_condition_literal())
    }
}
