use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Specification mapping scraped from a product detail page.
pub type Specs = BTreeMap<String, String>;

/// One product card scraped from a listing page.
///
/// `specs` is only present when detail pages were fetched for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub price_raw: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs: Option<Specs>,
}

impl ProductRecord {
    pub fn new(name: String, price_raw: String, link: String) -> Self {
        Self {
            name,
            price_raw,
            link,
            specs: None,
        }
    }

    pub fn with_specs(mut self, specs: Specs) -> Self {
        self.specs = Some(specs);
        self
    }
}

/// Outcome of a single fetch.
///
/// Every failure mode (timeout, refused connection, error status, exhausted
/// retries) collapses into `Unavailable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    Fetched { status_code: u16, body: String },
    Unavailable,
}

impl FetchResult {
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchResult::Fetched { .. })
    }

    pub fn into_body(self) -> Option<String> {
        match self {
            FetchResult::Fetched { body, .. } => Some(body),
            FetchResult::Unavailable => None,
        }
    }
}
