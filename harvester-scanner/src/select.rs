// Ordered selector chains: the first selector that yields anything wins.

use scraper::{ElementRef, Selector};

pub(crate) fn chain(patterns: &[&str]) -> Vec<Selector> {
    patterns
        .iter()
        .map(|pattern| {
            Selector::parse(pattern)
                .unwrap_or_else(|e| panic!("built-in selector {pattern:?} failed to parse: {e}"))
        })
        .collect()
}

/// All matches of the first selector in `chain` that matches at least once.
pub(crate) fn first_family<'a>(root: ElementRef<'a>, chain: &[Selector]) -> Vec<ElementRef<'a>> {
    chain
        .iter()
        .map(|selector| root.select(selector).collect::<Vec<_>>())
        .find(|matches| !matches.is_empty())
        .unwrap_or_default()
}

/// First element matched by the first selector in `chain` that matches.
pub(crate) fn first_element<'a>(root: ElementRef<'a>, chain: &[Selector]) -> Option<ElementRef<'a>> {
    chain.iter().find_map(|selector| root.select(selector).next())
}

/// Concatenated text content with whitespace runs collapsed to one space.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
