pub mod client;
pub mod detail;
pub mod error;
pub mod listing;
pub mod result;
mod select;
pub mod source;

pub use client::{FetchClient, FetchOptions};
pub use detail::extract_specs;
pub use error::ScanError;
pub use listing::extract_listing;
pub use result::{FetchResult, ProductRecord, Specs};
pub use source::PageSource;
