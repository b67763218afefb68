//! Purpose: Lay out a display tree as terminal text.
//! Exports: to_text.
//! Role: CLI surface for rendered results and session views.
//! Invariants: ANSI escapes appear only when explicitly enabled.
use super::DisplayNode;

const INDENT: &str = "  ";

const COLOR_LABEL: &str = "36";
const COLOR_PLACEHOLDER: &str = "2";
const COLOR_ERROR: &str = "31";

pub fn to_text(node: &DisplayNode, use_color: bool) -> String {
    match node {
        DisplayNode::Empty => String::new(),
        DisplayNode::Placeholder(text) => colored(text, COLOR_PLACEHOLDER, use_color),
        DisplayNode::Text(text) | DisplayNode::Preformatted(text) => text.clone(),
        DisplayNode::List(items) => items
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n"),
        DisplayNode::Field { label, body } => {
            let label = colored(&format!("{label}:"), COLOR_LABEL, use_color);
            let body_text = to_text(body, use_color);
            if body_text.is_empty() {
                label
            } else if body.is_inline() && !body_text.contains('\n') {
                format!("{label} {body_text}")
            } else {
                format!("{label}\n{}", indent(&body_text))
            }
        }
        DisplayNode::Group(children) => children
            .iter()
            .map(|child| to_text(child, use_color))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        DisplayNode::Error(message) => {
            format!("{} {message}", colored("error:", COLOR_ERROR, use_color))
        }
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("{INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn colored(text: &str, color: &str, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    format!("\u{1b}[{color}m{text}\u{1b}[0m")
}
