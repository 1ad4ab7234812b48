use crate::result::Specs;
use crate::select::{chain, first_element, first_family, text_of};
use scraper::{Html, Selector};
use std::sync::LazyLock;

static SPEC_ITEMS: LazyLock<Vec<Selector>> = LazyLock::new(|| chain(&[".specifications-list__el"]));
static TERMS: LazyLock<Vec<Selector>> = LazyLock::new(|| chain(&["dt"]));
static DEFINITIONS: LazyLock<Vec<Selector>> = LazyLock::new(|| chain(&["dd"]));
static TEXT_BLOCKS: LazyLock<Vec<Selector>> = LazyLock::new(|| chain(&[".product-specs", ".specs"]));

type Strategy = fn(&Html) -> Specs;

// Priority order; the first strategy producing any entries wins.
const STRATEGIES: [Strategy; 3] = [from_spec_list, from_term_pairs, from_text_blocks];

/// Extract a product page's specification table.
///
/// Never fails: a page with no recognizable specs yields an empty map.
pub fn extract_specs(markup: &str) -> Specs {
    let document = Html::parse_document(markup);

    STRATEGIES
        .iter()
        .map(|strategy| strategy(&document))
        .find(|specs| !specs.is_empty())
        .unwrap_or_default()
}

/// `.specifications-list__el` items, each holding one dt/dd pair.
fn from_spec_list(document: &Html) -> Specs {
    let mut specs = Specs::new();
    for item in first_family(document.root_element(), &SPEC_ITEMS) {
        if let Some(term) = first_element(item, &TERMS)
            && let Some(definition) = first_element(item, &DEFINITIONS)
        {
            specs.insert(text_of(term), text_of(definition));
        }
    }
    specs
}

/// Page-wide dt/dd zipped by position, only when the counts line up.
fn from_term_pairs(document: &Html) -> Specs {
    let terms = first_family(document.root_element(), &TERMS);
    let definitions = first_family(document.root_element(), &DEFINITIONS);

    if terms.is_empty() || terms.len() != definitions.len() {
        return Specs::new();
    }

    terms
        .into_iter()
        .zip(definitions)
        .map(|(term, definition)| (text_of(term), text_of(definition)))
        .collect()
}

/// Free-form `key: value` lines inside a specs block.
fn from_text_blocks(document: &Html) -> Specs {
    let mut specs = Specs::new();
    for block in first_family(document.root_element(), &TEXT_BLOCKS) {
        let text = block.text().collect::<Vec<_>>().join("\n");
        for line in text.lines() {
            if let Some((key, value)) = line.split_once(':') {
                specs.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }
    specs
}
