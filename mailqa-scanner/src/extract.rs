use crate::error::{Result, ScanError};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "head", "title", "noscript", "template"];

/// A parsed email body.
pub struct EmailDocument {
    document: Html,
}

impl EmailDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// `href` of every anchor, verbatim and in document order.
    pub fn links(&self) -> Result<Vec<String>> {
        let link_selector =
            Selector::parse("a[href]").map_err(|e| ScanError::SelectorError(e.to_string()))?;

        let links: Vec<String> = self
            .document
            .select(&link_selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect();

        debug!("Found {} links", links.len());
        Ok(links)
    }

    /// Text a reader would see, one non-blank line per text run.
    pub fn visible_text(&self) -> String {
        let mut lines = Vec::new();
        collect_text(self.document.root_element(), &mut lines);
        lines.join("\n")
    }
}

fn collect_text(element: ElementRef<'_>, lines: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if !collapsed.is_empty() {
                    lines.push(collapsed);
                }
            }
            Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, lines);
                }
            }
            _ => {}
        }
    }
}

/// Shorthand for `EmailDocument::parse(html).links()`.
pub fn extract_links(html: &str) -> Result<Vec<String>> {
    EmailDocument::parse(html).links()
}

/// Shorthand for `EmailDocument::parse(html).visible_text()`.
pub fn extract_text(html: &str) -> String {
    EmailDocument::parse(html).visible_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<html>
<head><title>Spring Sale</title><style>.x { color: red }</style></head>
<body>
  <h1>Hello   {{first_name}}</h1>
  <p>Our <a href="https://example.com/sale?utm_source=email">spring sale</a> is on.</p>
  <a href="/unsubscribe">Unsubscribe</a>
  <a>No href here</a>
  <a href="">Empty</a>
  <script>var tracking = 1;</script>
</body>
</html>"#;

    #[test]
    fn test_links_verbatim_in_order() {
        let links = extract_links(SAMPLE).unwrap();
        assert_eq!(
            links,
            vec!["https://example.com/sale?utm_source=email", "/unsubscribe", ""]
        );
    }

    #[test]
    fn test_visible_text_skips_hidden_elements() {
        let text = extract_text(SAMPLE);
        assert!(text.contains("Hello {{first_name}}"));
        assert!(text.contains("spring sale"));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("Spring Sale"));
    }

    #[test]
    fn test_plain_text_body() {
        let text = extract_text("Just a plain text email.\nSecond line.");
        assert!(text.contains("Just a plain text email."));
        assert!(extract_links("Just a plain text email.").unwrap().is_empty());
    }
}
