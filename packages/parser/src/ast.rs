use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every parsed template keyed by its canonical component name.
///
/// Ordered so that anything iterating the map (code generation, IR dumps)
/// produces the same output on every run.
pub type ComponentMap = BTreeMap<String, Component>;

/// Byte range of a node in its source template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One compiled template (one input file)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Path the template was read from, kept for diagnostics
    pub source_file: String,
    /// Top-level elements in declaration order
    pub elements: Vec<Element>,
    /// Declared prop names, unique, in declaration order
    pub props: IndexSet<String>,
}

impl Component {
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            elements: Vec::new(),
            props: IndexSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn declares_prop(&self, name: &str) -> bool {
        self.props.contains(name)
    }
}

/// Markup node
///
/// A self-closing element never owns children or content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub tag_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    pub self_closing: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Attribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
    pub span: Span,
}

impl Element {
    pub fn new(tag_name: impl Into<String>, self_closing: bool, span: Span) -> Self {
        Self {
            tag_name: tag_name.into(),
            content: String::new(),
            self_closing,
            attributes: IndexMap::new(),
            children: Vec::new(),
            span,
        }
    }

    pub fn with_attributes(mut self, attributes: IndexMap<String, Attribute>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// One attribute occurrence.
///
/// The prefix flags are independent; code generation only acts on
/// `is_expression` today.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub value: String,
    /// `:name` - value is a host expression
    pub is_expression: bool,
    /// `@name` - value is executed by the runtime
    pub is_event_handler: bool,
    /// `!name` - value is a default
    pub is_default_value: bool,
}

impl Attribute {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn expression(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_expression: true,
            ..Self::default()
        }
    }
}
