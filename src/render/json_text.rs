//! Purpose: Serialize structured values to JSON text, pretty (optionally ANSI colored) or compact.
//! Exports: pretty, compact.
//! Role: Infallible text writer behind the renderer's monospace blocks and raw output.
//! Invariants: With color disabled, `pretty` equals serde_json::to_string_pretty.
//! Invariants: `compact` equals serde_json::to_string; keys keep insertion order.
use crate::core::value::{Fields, Primitive, StructuredValue};

const INDENT: &str = "  ";

// 8/16-color palette; bright variants lose contrast on some themes.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "39";
const COLOR_PUNCT: &str = "39";

pub fn pretty(value: &StructuredValue, use_color: bool) -> String {
    let mut out = String::new();
    write_value(value, Layout::Pretty(0), use_color, &mut out);
    out
}

pub fn compact(value: &StructuredValue) -> String {
    let mut out = String::new();
    write_value(value, Layout::Compact, false, &mut out);
    out
}

#[derive(Clone, Copy)]
enum Layout {
    Compact,
    Pretty(usize),
}

impl Layout {
    fn nested(self) -> Self {
        match self {
            Layout::Compact => Layout::Compact,
            Layout::Pretty(indent) => Layout::Pretty(indent + 1),
        }
    }
}

fn write_value(value: &StructuredValue, layout: Layout, use_color: bool, out: &mut String) {
    match value {
        StructuredValue::Null => push_colored("null", COLOR_NULL, use_color, out),
        StructuredValue::Primitive(Primitive::Bool(val)) => {
            let text = if *val { "true" } else { "false" };
            push_colored(text, COLOR_BOOL, use_color, out);
        }
        StructuredValue::Primitive(Primitive::Number(num)) => {
            push_colored(&num.to_string(), COLOR_NUMBER, use_color, out)
        }
        StructuredValue::Primitive(Primitive::String(text)) => {
            push_colored(&encode_string(text), COLOR_STRING, use_color, out);
        }
        StructuredValue::Sequence(items) => write_sequence(items, layout, use_color, out),
        StructuredValue::Mapping(fields) => write_mapping(fields, layout, use_color, out),
    }
}

fn write_sequence(items: &[StructuredValue], layout: Layout, use_color: bool, out: &mut String) {
    if items.is_empty() {
        push_colored("[]", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("[", COLOR_PUNCT, use_color, out);
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        push_break(layout.nested(), out);
        write_value(item, layout.nested(), use_color, out);
    }
    push_break(layout, out);
    push_colored("]", COLOR_PUNCT, use_color, out);
}

fn write_mapping(fields: &Fields, layout: Layout, use_color: bool, out: &mut String) {
    if fields.is_empty() {
        push_colored("{}", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("{", COLOR_PUNCT, use_color, out);
    for (idx, (key, value)) in fields.iter().enumerate() {
        if idx > 0 {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        push_break(layout.nested(), out);
        push_colored(&encode_string(key), COLOR_KEY, use_color, out);
        push_colored(":", COLOR_PUNCT, use_color, out);
        if matches!(layout, Layout::Pretty(_)) {
            out.push(' ');
        }
        write_value(value, layout.nested(), use_color, out);
    }
    push_break(layout, out);
    push_colored("}", COLOR_PUNCT, use_color, out);
}

fn encode_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

fn push_break(layout: Layout, out: &mut String) {
    if let Layout::Pretty(level) = layout {
        out.push('\n');
        for _ in 0..level {
            out.push_str(INDENT);
        }
    }
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}
