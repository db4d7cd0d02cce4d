pub mod likes;
pub mod messages;
pub mod questions;

use scraper::{ElementRef, Html};

/// Parse raw page bytes into a navigable tree. The site predates
/// consistent encodings; lossy UTF-8 is good enough for the markup.
pub fn parse_page(bytes: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(bytes))
}

/// Collapse internal whitespace runs to single spaces and trim.
pub fn squash_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn next_sibling_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

pub(crate) fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}
