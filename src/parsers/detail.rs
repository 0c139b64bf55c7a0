use crate::dataset::DetailAttributes;
use scraper::{ElementRef, Html, Selector};

/// Parses a detail-page document into label/value attribute pairs.
///
/// For every `<label>`, the trimmed label text keys the trimmed text of the
/// next sibling element. A label with no following sibling element is
/// skipped silently: one malformed attribute must not abort the crawl.
/// Duplicate labels keep the last occurrence (map overwrite semantics).
pub fn parse(markup: &str) -> DetailAttributes {
    let doc = Html::parse_document(markup);
    let label_selector = Selector::parse("label").unwrap();

    let mut details = DetailAttributes::new();

    for label in doc.select(&label_selector) {
        let key = label.text().collect::<String>().trim().to_string();

        let value = label
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .next()
            .map(|sibling| sibling.text().collect::<String>().trim().to_string());

        match value {
            Some(value) => {
                details.insert(key, value);
            }
            None => {
                ::log::debug!("Detail label '{}' has no value element, skipping", key);
            }
        }
    }

    ::log::debug!("Detail page yielded {} attribute pairs", details.len());
    details
}
