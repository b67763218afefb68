//! Purpose: Emit a display tree as an HTML fragment.
//! Exports: to_html.
//! Role: Markup surface for embedding results in a page.
//! Invariants: All text content and labels are HTML-escaped.
use super::DisplayNode;

pub fn to_html(node: &DisplayNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &DisplayNode, out: &mut String) {
    match node {
        DisplayNode::Empty => {}
        DisplayNode::Placeholder(text) => {
            out.push_str("<span class=\"placeholder\">");
            push_escaped(text, out);
            out.push_str("</span>");
        }
        DisplayNode::Text(text) => push_escaped(text, out),
        DisplayNode::List(items) => {
            out.push_str("<ul>");
            for item in items {
                out.push_str("<li>");
                push_escaped(item, out);
                out.push_str("</li>");
            }
            out.push_str("</ul>");
        }
        DisplayNode::Preformatted(text) => {
            out.push_str("<pre>");
            push_escaped(text, out);
            out.push_str("</pre>");
        }
        DisplayNode::Field { label, body } => {
            let tag = if body.is_inline() { "p" } else { "div" };
            out.push('<');
            out.push_str(tag);
            out.push_str(" class=\"field\"><strong>");
            push_escaped(label, out);
            out.push_str(":</strong> ");
            write_node(body, out);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        DisplayNode::Group(children) => {
            out.push_str("<section class=\"result\">");
            for child in children {
                write_node(child, out);
            }
            out.push_str("</section>");
        }
        DisplayNode::Error(message) => {
            out.push_str("<p class=\"error\">");
            push_escaped(message, out);
            out.push_str("</p>");
        }
    }
}

fn push_escaped(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::to_html;
    use crate::core::value::StructuredValue;
    use crate::render::{DisplayNode, present};
    use serde_json::json;

    #[test]
    fn fields_become_labeled_paragraphs_and_lists() {
        let fields = StructuredValue::from(json!({"answer": "42", "items": [1, "two"]}))
            .into_mapping()
            .expect("object");
        assert_eq!(
            to_html(&present(&fields)),
            "<section class=\"result\">\
             <p class=\"field\"><strong>answer:</strong> 42</p>\
             <div class=\"field\"><strong>items:</strong> <ul><li>1</li><li>two</li></ul></div>\
             </section>"
        );
    }

    #[test]
    fn mapping_blocks_are_escaped_inside_pre() {
        let fields = StructuredValue::from(json!({"meta": {"k": "<b>"}}))
            .into_mapping()
            .expect("object");
        let html = to_html(&present(&fields));
        assert!(html.contains("<pre>{\n  &quot;k&quot;: &quot;&lt;b&gt;&quot;\n}</pre>"));
    }

    #[test]
    fn empty_node_emits_nothing() {
        assert_eq!(to_html(&DisplayNode::Empty), "");
    }
}
