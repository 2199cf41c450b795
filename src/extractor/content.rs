//! Main-content detection and boilerplate stripping
//!
//! Finds the page's primary text block while skipping navigation chrome,
//! scripts, and styling. Detection order: known main-content containers,
//! then the largest `<div>` text block, then the whole body.

use crate::utils::error::ExtractError;
use crate::utils::normalize_whitespace;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Tags whose subtrees never contribute to main content
const BOILERPLATE_TAGS: &[&str] = &[
    "nav", "header", "footer", "script", "style", "aside", "noscript", "iframe", "svg",
];

/// `role` attribute values marking navigation chrome
const BOILERPLATE_ROLES: &[&str] = &["banner", "navigation", "complementary", "contentinfo"];

fn main_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| {
        Selector::parse("main, article, #content, .content, [role=main]")
            .expect("Invalid main-content selector")
    })
}

fn div_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("div").expect("Invalid div selector"))
}

fn body_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("body").expect("Invalid body selector"))
}

fn title_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("title").expect("Invalid title selector"))
}

/// Extract the page title, falling back to the URL
pub fn extract_title(document: &Html, url: &str) -> String {
    document
        .select(title_selector())
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| url.to_string())
}

/// Extract the cleaned main-content text of a page
pub fn extract_main_content(document: &Html) -> Result<String, ExtractError> {
    // First attempt: dedicated main-content containers
    let container_text: String = document
        .select(main_selector())
        .map(|el| filtered_text(el))
        .collect::<Vec<_>>()
        .join(" ");

    let container_text = normalize_whitespace(&container_text);
    if !container_text.is_empty() {
        return Ok(container_text);
    }

    // Second attempt: largest contiguous div text block
    if let Some(best) = document
        .select(div_selector())
        .map(|el| normalize_whitespace(&filtered_text(el)))
        .max_by_key(|text| text.len())
    {
        if !best.is_empty() {
            return Ok(best);
        }
    }

    // Fallback: whole-body text
    let body_text = document
        .select(body_selector())
        .next()
        .map(|el| normalize_whitespace(&filtered_text(el)))
        .unwrap_or_default();

    if body_text.is_empty() {
        return Err(ExtractError::NoContent);
    }

    Ok(body_text)
}

/// Collect the text of an element, skipping boilerplate subtrees
pub fn filtered_text(element: ElementRef) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if is_boilerplate(child_el) {
                continue;
            }
            collect_text(child_el, out);
        }
    }
}

fn is_boilerplate(element: ElementRef) -> bool {
    let name = element.value().name();
    if BOILERPLATE_TAGS.contains(&name) {
        return true;
    }

    matches!(element.value().attr("role"), Some(role) if BOILERPLATE_ROLES.contains(&role))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_prefers_main_container() {
        let doc = parse(
            r#"<html><body>
                <nav>Home About Pricing</nav>
                <main>The actual page content lives here.</main>
                <footer>Copyright</footer>
            </body></html>"#,
        );
        let content = extract_main_content(&doc).unwrap();
        assert_eq!(content, "The actual page content lives here.");
    }

    #[test]
    fn test_skips_nav_and_script_inside_main() {
        let doc = parse(
            r#"<html><body><main>
                <nav>skip me</nav>
                <script>var x = 1;</script>
                <p>Keep this paragraph.</p>
            </main></body></html>"#,
        );
        let content = extract_main_content(&doc).unwrap();
        assert!(content.contains("Keep this paragraph."));
        assert!(!content.contains("skip me"));
        assert!(!content.contains("var x"));
    }

    #[test]
    fn test_falls_back_to_largest_div() {
        let doc = parse(
            r#"<html><body>
                <div>tiny</div>
                <div>This div has substantially more text than its sibling and wins.</div>
            </body></html>"#,
        );
        let content = extract_main_content(&doc).unwrap();
        assert!(content.contains("substantially more text"));
        assert!(!content.contains("tiny"));
    }

    #[test]
    fn test_falls_back_to_body_text() {
        let doc = parse("<html><body><p>Bare paragraph.</p></body></html>");
        let content = extract_main_content(&doc).unwrap();
        assert_eq!(content, "Bare paragraph.");
    }

    #[test]
    fn test_skips_role_navigation() {
        let doc = parse(
            r#"<html><body><main>
                <div role="navigation">menu items</div>
                <p>Real content.</p>
            </main></body></html>"#,
        );
        let content = extract_main_content(&doc).unwrap();
        assert!(!content.contains("menu items"));
        assert!(content.contains("Real content."));
    }

    #[test]
    fn test_contentless_page_errors() {
        let doc = parse("<html><body><script>only()</script></body></html>");
        assert!(matches!(
            extract_main_content(&doc),
            Err(ExtractError::NoContent)
        ));
    }

    #[test]
    fn test_title_extraction() {
        let doc = parse("<html><head><title>  My  Page </title></head><body>x</body></html>");
        assert_eq!(extract_title(&doc, "https://example.com"), "My Page");

        let doc = parse("<html><body>x</body></html>");
        assert_eq!(
            extract_title(&doc, "https://example.com"),
            "https://example.com"
        );
    }
}
