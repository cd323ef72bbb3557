//! WHERE clause model
//!
//! Each `where` call is stored as one unresolved [`ConditionGroup`]. The
//! relation joining top-level groups is only applied when rendering, so
//! changing it later affects every group added before.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::QueryError;
use super::quote::quote;
use super::value::Value;

static CONNECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(and|or)\b").expect("connective pattern is valid"));

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    /// Equal to
    #[default]
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
    /// Matches a regular expression
    Match,
    /// Does not match a regular expression
    NotMatch,
}

impl std::str::FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" | "==" => Ok(Self::Eq),
            "!=" | "<>" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Gte),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Lte),
            "=~" => Ok(Self::Match),
            "!~" => Ok(Self::NotMatch),
            other => Err(QueryError::InvalidOperator(other.to_string())),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
            Self::Match => write!(f, "=~"),
            Self::NotMatch => write!(f, "!~"),
        }
    }
}

/// Logical connective between conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Relation {
    #[default]
    And,
    Or,
}

impl Relation {
    fn separator(self) -> &'static str {
        match self {
            Self::And => " and ",
            Self::Or => " or ",
        }
    }
}

impl std::str::FromStr for Relation {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            _ => Err(QueryError::InvalidRelation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
        }
    }
}

/// Second argument of a map condition: either how its entries are joined or
/// the operator applied to each of them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapModifier {
    Relation(Relation),
    Operator(Operator),
}

impl std::str::FromStr for MapModifier {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Relation>() {
            Ok(relation) => Ok(Self::Relation(relation)),
            Err(_) => s.parse::<Operator>().map(Self::Operator),
        }
    }
}

impl From<Relation> for MapModifier {
    fn from(relation: Relation) -> Self {
        Self::Relation(relation)
    }
}

impl From<Operator> for MapModifier {
    fn from(op: Operator) -> Self {
        Self::Operator(op)
    }
}

/// One `where` call, in any of its accepted shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    /// `field = value`
    FieldValue(String, Value),
    /// `field <op> value`
    FieldValueOp(String, Value, Operator),
    /// `(field = a or field = b ...)`
    FieldValueList(String, Vec<Value>),
    /// `(k1 = v1 and k2 = v2 ...)`
    FieldMap(Vec<(String, Value)>),
    /// Map with its own relation or a shared operator
    FieldMapOp(Vec<(String, Value)>, MapModifier),
    /// Expression text used verbatim
    RawExpression(String),
}

impl Where {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::FieldValue(field.into(), value.into())
    }

    pub fn compare(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self::FieldValueOp(field.into(), value.into(), op)
    }

    /// Match any of the values; the operator is always `=`
    pub fn any_of<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::FieldValueList(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// Match every entry with `=`, joined by `and`
    pub fn all<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::FieldMap(collect_entries(entries))
    }

    pub fn map_with<I, K, V>(entries: I, modifier: impl Into<MapModifier>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::FieldMapOp(collect_entries(entries), modifier.into())
    }

    pub fn raw(expression: impl Into<String>) -> Self {
        Self::RawExpression(expression.into())
    }
}

impl From<&str> for Where {
    fn from(expression: &str) -> Self {
        Self::raw(expression)
    }
}

impl From<String> for Where {
    fn from(expression: String) -> Self {
        Self::raw(expression)
    }
}

fn collect_entries<I, K, V>(entries: I) -> Vec<(String, Value)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// A stored condition group, kept unresolved until rendering
#[derive(Debug, Clone, PartialEq)]
enum ConditionGroup {
    Single {
        field: String,
        op: Operator,
        value: Value,
    },
    AnyOf {
        field: String,
        values: Vec<Value>,
    },
    Group {
        entries: Vec<(String, Value)>,
        op: Operator,
        relation: Relation,
    },
    Raw(String),
}

impl ConditionGroup {
    /// Resolve a `where` call; `None` when it holds no condition at all
    fn resolve(input: Where) -> Option<Self> {
        let group = match input {
            Where::FieldValue(field, value) => Self::Single {
                field,
                op: Operator::Eq,
                value,
            },
            Where::FieldValueOp(field, value, op) => Self::Single { field, op, value },
            Where::FieldValueList(field, values) => {
                if values.is_empty() {
                    return None;
                }
                Self::AnyOf { field, values }
            }
            Where::FieldMap(entries) => {
                if entries.is_empty() {
                    return None;
                }
                Self::Group {
                    entries,
                    op: Operator::Eq,
                    relation: Relation::And,
                }
            }
            Where::FieldMapOp(entries, modifier) => {
                if entries.is_empty() {
                    return None;
                }
                let (op, relation) = match modifier {
                    MapModifier::Relation(relation) => (Operator::Eq, relation),
                    MapModifier::Operator(op) => (op, Relation::And),
                };
                Self::Group {
                    entries,
                    op,
                    relation,
                }
            }
            Where::RawExpression(text) => {
                if text.trim().is_empty() {
                    return None;
                }
                Self::Raw(text)
            }
        };
        Some(group)
    }

    fn render(&self) -> String {
        match self {
            Self::Single { field, op, value } => comparison(field, *op, value),
            Self::AnyOf { field, values } => {
                let parts: Vec<String> = values
                    .iter()
                    .map(|v| comparison(field, Operator::Eq, v))
                    .collect();
                parenthesize(parts, Relation::Or)
            }
            Self::Group {
                entries,
                op,
                relation,
            } => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(field, v)| comparison(field, *op, v))
                    .collect();
                parenthesize(parts, *relation)
            }
            Self::Raw(text) if CONNECTIVE.is_match(text) => format!("({})", text),
            Self::Raw(text) => text.clone(),
        }
    }
}

fn comparison(field: &str, op: Operator, value: &Value) -> String {
    format!("{} {} {}", quote(field), op, value.to_condition_literal())
}

fn parenthesize(parts: Vec<String>, relation: Relation) -> String {
    if parts.len() > 1 {
        format!("({})", parts.join(relation.separator()))
    } else {
        parts.join(relation.separator())
    }
}

/// Accumulated WHERE conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    groups: Vec<ConditionGroup>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one `where` call. Empty lists, maps and expressions are ignored.
    pub fn push(&mut self, input: Where) {
        match ConditionGroup::resolve(input) {
            Some(group) => self.groups.push(group),
            None => tracing::debug!("Ignoring empty condition"),
        }
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Render all groups joined by `relation`
    ///
    /// Groups are ordered by their rendered text; equal texts keep insertion
    /// order.
    pub fn render(&self, relation: Relation) -> Option<String> {
        if self.groups.is_empty() {
            return None;
        }

        let mut rendered: Vec<String> = self.groups.iter().map(ConditionGroup::render).collect();
        rendered.sort();
        Some(rendered.join(relation.separator()))
    }
}
