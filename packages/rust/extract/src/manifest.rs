//! OPF package-manifest parsing.
//!
//! An EPUB's manifest lists every resource as an `item` element with a
//! relative `href`. The subset of hrefs that look like HTML documents, in
//! document order, is the book's reading order.

use quick_xml::Reader;
use quick_xml::events::Event;

use lectern_shared::{LecternError, Result};

/// Whether a manifest href belongs in the reading order.
///
/// Deliberately loose: a substring match on "html" OR a ".htm" suffix.
/// This is a different rule from [`crate::is_content_entry`]; the two
/// passes may disagree about the file set and that is accepted behavior.
pub fn is_order_href(href: &str) -> bool {
    href.contains("html") || href.ends_with(".htm")
}

/// Parse the OPF XML and return the HTML-family `href` values of its
/// `item` elements, in document order.
///
/// No reordering, no deduplication: duplicates in the manifest stay
/// duplicated in the result. Element and attribute names are matched by
/// local name, so the OPF namespace prefix (or lack of one) is irrelevant.
pub fn derive_order(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut order = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() != b"item" {
                    continue;
                }
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() != b"href" {
                        continue;
                    }
                    let href = attr
                        .unescape_value()
                        .map_err(|e| LecternError::Manifest(e.to_string()))?;
                    if is_order_href(&href) {
                        order.push(href.into_owned());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(LecternError::Manifest(e.to_string())),
            _ => {}
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <manifest>
    <item id="css" href="styles/main.css" media-type="text/css"/>
    <item id="ch1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch2" href="text/ch2.html" media-type="text/html"/>
    <item id="cover" href="images/cover.jpg" media-type="image/jpeg"/>
    <item id="old" href="legacy.htm" media-type="text/html"/>
  </manifest>
</package>"#;

    #[test]
    fn derive_order_keeps_html_hrefs_in_document_order() {
        let order = derive_order(OPF).unwrap();
        assert_eq!(order, vec!["text/ch1.xhtml", "text/ch2.html", "legacy.htm"]);
    }

    #[test]
    fn derive_order_preserves_duplicates() {
        let xml = r#"<package><manifest>
            <item href="a.html"/>
            <item href="b.html"/>
            <item href="a.html"/>
        </manifest></package>"#;
        assert_eq!(derive_order(xml).unwrap(), vec!["a.html", "b.html", "a.html"]);
    }

    #[test]
    fn derive_order_handles_namespace_prefixes() {
        let xml = r#"<opf:package xmlns:opf="http://www.idpf.org/2007/opf">
            <opf:manifest>
                <opf:item opf:href="ch1.xhtml"/>
            </opf:manifest>
        </opf:package>"#;
        assert_eq!(derive_order(xml).unwrap(), vec!["ch1.xhtml"]);
    }

    #[test]
    fn derive_order_empty_manifest() {
        let xml = "<package><manifest></manifest></package>";
        assert!(derive_order(xml).unwrap().is_empty());
    }

    #[test]
    fn derive_order_rejects_malformed_xml() {
        assert!(derive_order("<package><manifest><item").is_err());
    }

    #[test]
    fn order_href_filter_is_substring_based() {
        assert!(is_order_href("text/ch1.xhtml"));
        assert!(is_order_href("ch2.html"));
        assert!(is_order_href("legacy.htm"));
        // Loose on purpose: "html" anywhere in the href matches
        assert!(is_order_href("html-assets/figure.png"));
        assert!(!is_order_href("styles/main.css"));
        assert!(!is_order_href("cover.jpg"));
    }
}
