//! Time range bounds, fill strategies and ordering

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::error::QueryError;

/// InfluxQL duration units
const DURATION_UNITS: &str = "ns|us|u|µ|ms|s|m|h|d|w";

static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^-((?:\d+(?:{}))+)$", DURATION_UNITS))
        .expect("relative time pattern is valid")
});

static EPOCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^\d+(?:{})$", DURATION_UNITS)).expect("epoch time pattern is valid")
});

/// A start or end bound of the queried time range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeBound {
    /// Offset back from now, stored without the leading `-` (e.g. `3h`)
    Relative(String),
    /// Epoch value carrying its unit suffix (e.g. `1388534400s`)
    Epoch(String),
    /// Timestamp literal (e.g. `2018-01-27T05:38:56.145Z`)
    Timestamp(String),
}

impl TimeBound {
    /// Classify a textual bound
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(caps) = RELATIVE.captures(text) {
            return Self::Relative(caps[1].to_string());
        }
        if EPOCH.is_match(text) {
            return Self::Epoch(text.to_string());
        }
        Self::Timestamp(text.to_string())
    }

    /// Render the right-hand side of a `time` comparison
    pub fn to_literal(&self) -> String {
        match self {
            Self::Relative(offset) => format!("now() - {}", offset),
            Self::Epoch(value) => value.clone(),
            Self::Timestamp(ts) => format!("'{}'", ts),
        }
    }

    /// The bound as it was originally written
    pub fn as_text(&self) -> String {
        match self {
            Self::Relative(offset) => format!("-{}", offset),
            Self::Epoch(value) | Self::Timestamp(value) => value.clone(),
        }
    }
}

impl From<&str> for TimeBound {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for TimeBound {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<DateTime<Utc>> for TimeBound {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Timestamp(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Value used for empty time buckets
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Integer(i64),
    Float(f64),
    /// Drop empty buckets
    None,
    Null,
    Previous,
    Linear,
}

impl From<i64> for Fill {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Fill {
    fn from(n: i32) -> Self {
        Self::Integer(n as i64)
    }
}

impl From<f64> for Fill {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl std::str::FromStr for Fill {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "none" => return Ok(Self::None),
            "null" => return Ok(Self::Null),
            "previous" => return Ok(Self::Previous),
            "linear" => return Ok(Self::Linear),
            _ => {}
        }
        if let Ok(n) = s.parse::<i64>() {
            return Ok(Self::Integer(n));
        }
        s.parse::<f64>()
            .map(Self::Float)
            .map_err(|_| QueryError::InvalidFill(s.to_string()))
    }
}

impl std::fmt::Display for Fill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::None => write!(f, "none"),
            Self::Null => write!(f, "null"),
            Self::Previous => write!(f, "previous"),
            Self::Linear => write!(f, "linear"),
        }
    }
}

/// Sort direction of `order by time`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl std::str::FromStr for Order {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(QueryError::InvalidOrder(s.to_string())),
        }
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}
