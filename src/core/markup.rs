// src/core/markup.rs

//! Conversion of the scanner's markup-bearing free text into readable
//! markdown-ish plain text.
//!
//! The alert `desc`, `solution` and `otherinfo` fields carry a small HTML
//! vocabulary (`<p>`, `<a>`, lists, emphasis). This is only enough
//! conversion to make technical-detail text readable, not a general
//! sanitizer: known tags map to markdown, unknown tags are stripped and
//! their children kept, plain text passes through untouched.

use ego_tree::NodeRef;
use scraper::{Html, Node};

/// Converts an HTML-bearing string to readable markdown-flavoured text.
pub fn html_to_markdown(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    let mut out = String::new();
    render_children(fragment.tree.root(), &mut out);
    out.trim().to_string()
}

fn render_children(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        render_node(child, out);
    }
}

fn render_node(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(&text.text),
        Node::Element(element) => match element.name() {
            "script" | "style" | "head" => {}
            "br" => out.push('\n'),
            "p" | "div" => {
                let mut block = String::new();
                render_children(node, &mut block);
                let block = block.trim();
                if !block.is_empty() {
                    push_block(out, block);
                }
            }
            "li" => {
                let mut item = String::new();
                render_children(node, &mut item);
                out.push_str("* ");
                out.push_str(item.trim());
                out.push('\n');
            }
            "a" => {
                let mut label = String::new();
                render_children(node, &mut label);
                match element.attr("href") {
                    Some(href) if !label.trim().is_empty() => {
                        out.push('[');
                        out.push_str(label.trim());
                        out.push_str("](");
                        out.push_str(href);
                        out.push(')');
                    }
                    _ => out.push_str(&label),
                }
            }
            "b" | "strong" => emphasize(node, out, "**"),
            "i" | "em" => emphasize(node, out, "*"),
            _ => render_children(node, out),
        },
        _ => render_children(node, out),
    }
}

/// Starts a new paragraph: blocks are separated by exactly one blank line.
fn push_block(out: &mut String, block: &str) {
    if !out.is_empty() {
        while out.ends_with('\n') {
            out.pop();
        }
        out.push_str("\n\n");
    }
    out.push_str(block);
    out.push('\n');
}

fn emphasize(node: NodeRef<'_, Node>, out: &mut String, marker: &str) {
    let mut inner = String::new();
    render_children(node, &mut inner);
    let inner = inner.trim();
    if !inner.is_empty() {
        out.push_str(marker);
        out.push_str(inner);
        out.push_str(marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(
            html_to_markdown("Phase: Architecture and Design"),
            "Phase: Architecture and Design"
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(html_to_markdown(""), "");
    }

    #[test]
    fn paragraphs_become_blank_line_separated_blocks() {
        assert_eq!(
            html_to_markdown("<p>No Anti-CSRF tokens were found.</p><p>A cross-site request forgery is an attack.</p>"),
            "No Anti-CSRF tokens were found.\n\nA cross-site request forgery is an attack."
        );
    }

    #[test]
    fn anchors_become_markdown_links() {
        assert_eq!(
            html_to_markdown(r#"See <a href="https://owasp.org/csrf">the cheat sheet</a> for details"#),
            "See [the cheat sheet](https://owasp.org/csrf) for details"
        );
    }

    #[test]
    fn emphasis_maps_to_markdown_markers() {
        assert_eq!(
            html_to_markdown("<b>required</b> and <i>optional</i>"),
            "**required** and *optional*"
        );
    }

    #[test]
    fn list_items_become_bullets() {
        assert_eq!(
            html_to_markdown("<ul><li>first</li><li>second</li></ul>"),
            "* first\n* second"
        );
    }

    #[test]
    fn unknown_tags_are_stripped_but_children_kept() {
        assert_eq!(
            html_to_markdown("<span>kept</span> text"),
            "kept text"
        );
    }

    #[test]
    fn html_entities_are_decoded() {
        assert_eq!(
            html_to_markdown("tokens [anticsrf, csrf&#95;token] were found"),
            "tokens [anticsrf, csrf_token] were found"
        );
    }
}
