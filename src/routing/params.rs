//! Parameter bindings extracted from a matched request path.

use std::collections::BTreeMap;

use serde::Serialize;

/// Value bound to one route parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Bound by a named capture (`[id]`).
    Single(String),
    /// Bound by a catch-all capture (`[...rest]`), in path order.
    Multiple(Vec<String>),
}

impl ParamValue {
    pub fn as_single(&self) -> Option<&str> {
        match self {
            ParamValue::Single(value) => Some(value),
            ParamValue::Multiple(_) => None,
        }
    }

    pub fn as_multiple(&self) -> Option<&[String]> {
        match self {
            ParamValue::Single(_) => None,
            ParamValue::Multiple(values) => Some(values),
        }
    }
}

/// Parameter name → captured value(s) for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterBindings {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bind(&mut self, name: &str, value: ParamValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Value of a named capture.
    pub fn single(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_single)
    }

    /// Segments of a catch-all capture.
    pub fn multiple(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(ParamValue::as_multiple)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
