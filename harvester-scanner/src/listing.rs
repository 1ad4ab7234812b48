use crate::result::ProductRecord;
use crate::select::{chain, first_element, first_family, text_of};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static CARD_SELECTORS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| chain(&[".item-card", ".product-card", ".product"]));
static NAME_SELECTORS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| chain(&[".item-card__name", ".product-name", "a"]));
static PRICE_SELECTORS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| chain(&[".item-card__prices-price", ".price", ".product-price"]));
static LINK_SELECTORS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| chain(&["a", ".item-card__name-link"]));

/// Extract product cards from a listing page.
///
/// Cards come from the first selector family that matches anything; cards
/// missing a name, price or link element are skipped. Links are resolved
/// against `base_url`. Returns records in document order, and an empty vector
/// when nothing on the page looks like a card.
pub fn extract_listing(markup: &str, base_url: &str) -> Vec<ProductRecord> {
    let document = Html::parse_document(markup);
    let base = Url::parse(base_url).ok();

    let cards = first_family(document.root_element(), &CARD_SELECTORS);
    debug!("Matched {} candidate cards", cards.len());

    cards
        .into_iter()
        .enumerate()
        .filter_map(|(idx, card)| {
            let record = parse_card(card, base.as_ref());
            if record.is_none() {
                debug!("Skipping card {}: missing name, price or link", idx);
            }
            record
        })
        .collect()
}

fn parse_card(card: ElementRef<'_>, base: Option<&Url>) -> Option<ProductRecord> {
    let name_el = first_element(card, &NAME_SELECTORS)?;
    let price_el = first_element(card, &PRICE_SELECTORS)?;
    let link_el = first_element(card, &LINK_SELECTORS)?;

    let name = text_of(name_el);
    let price_raw = normalize_price(&text_of(price_el));
    let href = link_el.value().attr("href").unwrap_or_default();

    Some(ProductRecord::new(name, price_raw, resolve_link(base, href)))
}

fn normalize_price(raw: &str) -> String {
    raw.replace('\u{a0}', " ").trim().to_string()
}

fn resolve_link(base: Option<&Url>, href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }

    base.and_then(|base| base.join(href).ok())
        .map(String::from)
        .unwrap_or_else(|| href.to_string())
}
