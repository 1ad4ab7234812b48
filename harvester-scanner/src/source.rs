use crate::result::FetchResult;
use std::future::Future;

/// Anything that can turn a URL into raw page markup.
///
/// The HTTP [`FetchClient`](crate::client::FetchClient) is the production
/// implementation. Pagination and extraction only ever talk to this trait, so
/// another collection strategy (a driven browser, a fixture directory) can be
/// dropped in without touching them.
pub trait PageSource {
    fn fetch(&mut self, url: &str) -> impl Future<Output = FetchResult> + Send;
}
