//! Purpose: Turn structured values and response field mappings into display trees.
//! Exports: `DisplayNode`, `render`, `present`, `PLACEHOLDER`, and the text/html/json backends.
//! Role: Pure core between the ask client and whatever surface shows the result.
//! Invariants: Rendering is total; no input composed of the four value kinds fails.
//! Invariants: Only top-level sequences and mappings get structural treatment;
//! containers nested inside a sequence are flattened to compact JSON text.
pub mod html;
pub mod json_text;
pub mod text;

use crate::core::value::{Fields, StructuredValue};

pub const PLACEHOLDER: &str = "N/A";

/// Markup-independent render tree.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayNode {
    Empty,
    Placeholder(String),
    Text(String),
    List(Vec<String>),
    Preformatted(String),
    Field {
        label: String,
        body: Box<DisplayNode>,
    },
    Group(Vec<DisplayNode>),
    Error(String),
}

impl DisplayNode {
    /// Nodes that fit on the same line as a field label.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            DisplayNode::Placeholder(_) | DisplayNode::Text(_) | DisplayNode::Empty
        )
    }

    pub fn field(label: impl Into<String>, body: DisplayNode) -> Self {
        DisplayNode::Field {
            label: label.into(),
            body: Box::new(body),
        }
    }
}

pub fn render(value: &StructuredValue) -> DisplayNode {
    match value {
        StructuredValue::Null => DisplayNode::Placeholder(PLACEHOLDER.to_string()),
        StructuredValue::Sequence(items) => {
            DisplayNode::List(items.iter().map(list_item_text).collect())
        }
        StructuredValue::Mapping(_) => DisplayNode::Preformatted(json_text::pretty(value, false)),
        StructuredValue::Primitive(primitive) => DisplayNode::Text(primitive.to_text()),
    }
}

pub fn present(fields: &Fields) -> DisplayNode {
    DisplayNode::Group(
        fields
            .iter()
            .map(|(name, value)| DisplayNode::field(name, render(value)))
            .collect(),
    )
}

fn list_item_text(item: &StructuredValue) -> String {
    match item {
        StructuredValue::Null => "null".to_string(),
        StructuredValue::Primitive(primitive) => primitive.to_text(),
        StructuredValue::Sequence(_) | StructuredValue::Mapping(_) => json_text::compact(item),
    }
}
