//! Function calls in the select list

use super::value::Value;

/// A function call such as `count("use")` with an optional alias
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    name: String,
    args: Vec<Value>,
    literal: bool,
    alias: Option<String>,
}

impl FunctionCall {
    /// Start a call to `name`; add arguments with [`FunctionCall::arg`]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            literal: false,
            alias: None,
        }
    }

    /// Use pre-formatted call text such as `bottom("use",3)` as is
    pub fn raw(call: impl Into<String>) -> Self {
        Self {
            name: call.into(),
            args: Vec::new(),
            literal: true,
            alias: None,
        }
    }

    /// Append one argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Append several arguments
    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    /// Name the output column
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The call text without alias; also the identity used for removal
    pub fn call_text(&self) -> String {
        if self.literal {
            return self.name.clone();
        }
        let args: Vec<String> = self.args.iter().map(Value::to_argument).collect();
        format!("{}({})", self.name, args.join(","))
    }

    /// The select-list entry, `call[ as "alias"]`
    pub fn to_select_item(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {}", self.call_text(), super::quote::quote(alias)),
            None => self.call_text(),
        }
    }
}

impl From<&str> for FunctionCall {
    fn from(call: &str) -> Self {
        Self::raw(call)
    }
}

impl From<String> for FunctionCall {
    fn from(call: String) -> Self {
        Self::raw(call)
    }
}
