//! Markdown text to mdast.

use markdown::mdast::{Node, Paragraph, Root, Text};
use markdown::{to_mdast, ParseOptions};
use tracing::debug;

use crate::core::text::width::TAB_WIDTH;
use crate::error::RenderError;

/// Parses with GFM extensions. Never fails: unparseable input becomes a root holding the
/// source as one literal text node.
pub fn parse(markdown: &str) -> Node {
    let normalized = normalize(markdown);
    match try_parse_normalized(&normalized) {
        Ok(tree) => tree,
        Err(err) => {
            debug!(%err, "rendering markdown source literally");
            literal(normalized)
        }
    }
}

pub fn try_parse(markdown: &str) -> Result<Node, RenderError> {
    try_parse_normalized(&normalize(markdown))
}

fn try_parse_normalized(markdown: &str) -> Result<Node, RenderError> {
    to_mdast(markdown, &ParseOptions::gfm())
        .map_err(|message| RenderError::Parse(message.to_string()))
}

fn normalize(markdown: &str) -> String {
    markdown
        .replace("\r\n", "\n")
        .replace('\t', &" ".repeat(TAB_WIDTH))
}

fn literal(source: String) -> Node {
    Node::Root(Root {
        children: vec![Node::Paragraph(Paragraph {
            children: vec![Node::Text(Text {
                value: source,
                position: None,
            })],
            position: None,
        })],
        position: None,
    })
}

#[cfg(test)]
mod tests {
    use super::{literal, parse};
    use markdown::mdast::Node;

    #[test]
    fn gfm_extensions_are_enabled() {
        let tree = parse("~~gone~~\n\n| a |\n| - |\n| b |\n\n- [x] done");
        let Node::Root(root) = tree else {
            panic!("expected root");
        };
        assert!(matches!(root.children[0], Node::Paragraph(_)));
        assert!(matches!(root.children[1], Node::Table(_)));
        assert!(matches!(root.children[2], Node::List(_)));
    }

    #[test]
    fn tabs_become_three_spaces() {
        let Node::Root(root) = parse("a\tb") else {
            panic!("expected root");
        };
        let Node::Paragraph(paragraph) = &root.children[0] else {
            panic!("expected paragraph");
        };
        let Node::Text(text) = &paragraph.children[0] else {
            panic!("expected text");
        };
        assert_eq!(text.value, "a   b");
    }

    #[test]
    fn literal_root_holds_source() {
        let Node::Root(root) = literal("raw *text*".into()) else {
            panic!("expected root");
        };
        let [Node::Paragraph(paragraph)] = root.children.as_slice() else {
            panic!("expected one paragraph");
        };
        assert!(matches!(&paragraph.children[..], [Node::Text(text)] if text.value == "raw *text*"));
    }
}
