//! Resource link harvesting from raw response bodies.
//!
//! The body is lowercased and scanned with a lazy pattern, so each match
//! stops at the first `.pdf` after the scheme, optionally followed by a query
//! string. Leftmost-first semantics mean a URL nested in another URL's query
//! string is never captured as a longer, greedy match.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Suffix every extracted link ends with (before any query string).
pub const RESOURCE_SUFFIX: &str = ".pdf";

// Excluded characters: ASCII whitespace (\t \n \f \r space), quotes, angle brackets.
static RESOURCE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\t\n\x0C\r "'<>]+?\.pdf(\?[^\t\n\x0C\r "'<>]*)?"#).expect("invalid resource link pattern")
});

/// Extract resource links from a response body.
///
/// Returns lowercased links in first-seen order with exact duplicates removed.
/// Links are not decoded or otherwise normalized beyond lowercasing.
pub fn extract_links(body: &str) -> Vec<String> {
    let normalized = body.to_lowercase();

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for m in RESOURCE_LINK.find_iter(&normalized) {
        let link = m.as_str();
        if seen.insert(link) {
            links.push(link.to_string());
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links_basic() {
        let body = r#"<a href="https://example.com/docs/sheet.pdf">Sheet</a>"#;
        assert_eq!(extract_links(body), vec!["https://example.com/docs/sheet.pdf"]);
    }

    #[test]
    fn test_extract_links_case_normalized_not_decoded() {
        let body = "see https://example.com/Sheet%20One.PDF?v=2 and HTTPS://EXAMPLE.com/sheet_one.pdf";
        assert_eq!(
            extract_links(body),
            vec!["https://example.com/sheet%20one.pdf?v=2", "https://example.com/sheet_one.pdf"]
        );
    }

    #[test]
    fn test_extract_links_dedup_preserves_order() {
        let body = "http://b.test/2.pdf http://a.test/1.pdf http://b.test/2.pdf HTTP://A.TEST/1.PDF http://c.test/3.pdf";
        assert_eq!(extract_links(body), vec!["http://b.test/2.pdf", "http://a.test/1.pdf", "http://c.test/3.pdf"]);
    }

    #[test]
    fn test_extract_links_lazy_match() {
        // stops at the first .pdf instead of swallowing the rest
        let body = "https://a.test/x.pdf.pdf";
        assert_eq!(extract_links(body), vec!["https://a.test/x.pdf"]);

        let body = "https://a.test/one.pdfhttps://a.test/two.pdf";
        assert_eq!(extract_links(body), vec!["https://a.test/one.pdf", "https://a.test/two.pdf"]);
    }

    #[test]
    fn test_extract_links_nested_url_in_query() {
        let body = "https://proxy.test/view.pdf?src=https://origin.test/real.pdf";
        assert_eq!(extract_links(body), vec!["https://proxy.test/view.pdf?src=https://origin.test/real.pdf"]);

        // the outer match only starts its query after its own first .pdf
        let body = "https://proxy.test/get?u=https://origin.test/real.pdf";
        assert_eq!(extract_links(body), vec!["https://proxy.test/get?u=https://origin.test/real.pdf"]);
    }

    #[test]
    fn test_extract_links_stops_at_delimiters() {
        let body = "'https://a.test/q.pdf' \"https://a.test/r.pdf?x=1\" <https://a.test/s.pdf>";
        assert_eq!(
            extract_links(body),
            vec!["https://a.test/q.pdf", "https://a.test/r.pdf?x=1", "https://a.test/s.pdf"]
        );
    }

    #[test]
    fn test_extract_links_query_ends_at_quote() {
        let body = r#"{"url":"https://a.test/doc.pdf?id=7&lang=en","next":1}"#;
        assert_eq!(extract_links(body), vec!["https://a.test/doc.pdf?id=7&lang=en"]);
    }

    #[test]
    fn test_extract_links_whitespace_breaks_url() {
        let body = "https://a.test/my file.pdf";
        assert!(extract_links(body).is_empty());
    }

    #[test]
    fn test_extract_links_json_escaped_slashes_do_not_match() {
        let body = r#"{"u":"https:\/\/a.test\/x.pdf"}"#;
        assert!(extract_links(body).is_empty());
    }

    #[test]
    fn test_extract_links_requires_scheme() {
        let body = "ftp://a.test/x.pdf //a.test/y.pdf www.a.test/z.pdf";
        assert!(extract_links(body).is_empty());
    }

    #[test]
    fn test_extract_links_empty_body() {
        assert!(extract_links("").is_empty());
        assert!(extract_links("\n").is_empty());
    }
}
