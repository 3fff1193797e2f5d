//! Text normalization
//!
//! Turns raw markup into plain text for linguistic parsing:
//! script and style content is dropped, text nodes are joined with
//! spaces, whitespace is collapsed and every character outside
//! `[A-Za-z0-9 .,:;-]` is removed.

use scraper::{Html, Node};

/// Elements whose text never reaches the output
const SKIPPED_ELEMENTS: [&str; 2] = ["script", "style"];

/// Normalize raw HTML or plain text.
///
/// Malformed markup is parsed permissively; anything the HTML parser
/// cannot interpret as a tag is kept as text.
pub fn clean_text(raw: &str) -> String {
    let text = visible_text(raw);
    let collapsed = collapse_whitespace(&text);
    let filtered: String = collapsed.chars().filter(|c| is_allowed(*c)).collect();

    // Dropping a character between two spaces leaves a double space behind
    collapse_whitespace(&filtered)
}

/// Concatenate all text nodes outside script/style, space separated
fn visible_text(raw: &str) -> String {
    let document = Html::parse_document(raw);
    let mut pieces: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => SKIPPED_ELEMENTS.contains(&element.name()),
            _ => false,
        });

        if !hidden {
            pieces.push(&**text);
        }
    }

    pieces.join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | ',' | ':' | ';' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_script_and_style() {
        let html = r#"
            <html>
              <head>
                <style>body { color: red; }</style>
                <script>var x = "INSAT";</script>
              </head>
              <body><h1>MOSDAC</h1><p>Ocean data, updated daily.</p></body>
            </html>"#;

        assert_eq!(clean_text(html), "MOSDAC Ocean data, updated daily.");
    }

    #[test]
    fn test_text_nodes_are_separated() {
        assert_eq!(
            clean_text("<ul><li>INSAT-3D</li><li>Oceansat-2</li></ul>"),
            "INSAT-3D Oceansat-2"
        );
    }

    #[test]
    fn test_plain_text_passthrough() {
        assert_eq!(
            clean_text("ISRO   launched\n\tScatsat-1; it works: yes."),
            "ISRO launched Scatsat-1; it works: yes."
        );
    }

    #[test]
    fn test_removes_symbols_without_double_spaces() {
        assert_eq!(clean_text("Sea & Ocean © 2024 (beta)"), "Sea Ocean 2024 beta");
    }

    #[test]
    fn test_malformed_markup_is_kept_as_text() {
        let cleaned = clean_text("Bay of Bengal < 5 deg <b>warm");
        assert!(cleaned.contains("Bay of Bengal"));
        assert!(cleaned.contains("warm"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("<script>only()</script>"), "");
    }

    proptest! {
        #[test]
        fn prop_output_charset_and_spacing(input in any::<String>()) {
            let cleaned = clean_text(&input);

            prop_assert!(cleaned.chars().all(is_allowed));
            prop_assert!(!cleaned.contains("  "));
            prop_assert_eq!(cleaned.trim(), cleaned.as_str());
        }

        #[test]
        fn prop_idempotent(input in "[ -~\\n\\t]{0,200}") {
            let once = clean_text(&input);
            let twice = clean_text(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
