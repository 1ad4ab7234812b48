use crate::config::DelayRange;
use harvester_scanner::{
    FetchClient, FetchOptions, PageSource, ProductRecord, ScanError, extract_listing, extract_specs,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub base_url: String,
    pub pages: usize,
    pub delay: DelayRange,
    pub fetch_details: bool,
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Where jittered delays are spent. Tests swap in a recorder.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration) -> impl Future<Output = ()> + Send;
}

pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// URLs to try for `page`, in order.
///
/// Page 1 is always the bare base URL. Later pages probe the path-segment,
/// query-parameter and short-path conventions.
pub fn page_candidates(base_url: &str, page: usize) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    if page <= 1 {
        return vec![base.to_string()];
    }

    vec![
        format!("{}/page/{}", base, page),
        format!("{}?page={}", base, page),
        format!("{}/p{}", base, page),
    ]
}

/// Sequential pagination driver over a [`PageSource`].
///
/// One request is in flight at a time. Every pause between requests is drawn
/// from the crawl's [`DelayRange`] using the driver's own seeded RNG.
pub struct CrawlDriver<S, Z = TokioSleeper> {
    source: S,
    sleeper: Z,
    rng: StdRng,
    progress_callback: Option<CrawlProgressCallback>,
}

impl<S: PageSource> CrawlDriver<S> {
    pub fn new(source: S, rng: StdRng) -> Self {
        Self {
            source,
            sleeper: TokioSleeper,
            rng,
            progress_callback: None,
        }
    }
}

impl<S: PageSource, Z: Sleeper> CrawlDriver<S, Z> {
    pub fn with_sleeper<Y: Sleeper>(self, sleeper: Y) -> CrawlDriver<S, Y> {
        CrawlDriver {
            source: self.source,
            sleeper,
            rng: self.rng,
            progress_callback: self.progress_callback,
        }
    }

    pub fn with_progress_callback(mut self, callback: CrawlProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sleeper(&self) -> &Z {
        &self.sleeper
    }

    /// Crawl `options.pages` listing pages and return every record found.
    ///
    /// Stops early, keeping what it has, as soon as a page cannot be fetched
    /// under any URL convention.
    pub async fn crawl(&mut self, options: &CrawlOptions) -> Vec<ProductRecord> {
        info!(
            "Starting crawl of {} ({} pages, details: {})",
            options.base_url, options.pages, options.fetch_details
        );

        let mut records = Vec::new();

        for page in 1..=options.pages {
            let Some((page_url, html)) = self.fetch_page(&options.base_url, page, options.delay).await
            else {
                warn!("Failed to fetch listing page {} (tried all patterns). Stopping.", page);
                self.report(format!("Page {} unavailable, stopping", page));
                break;
            };

            let parsed = extract_listing(&html, &options.base_url);
            info!("Found {} product cards on page {} ({})", parsed.len(), page, page_url);
            self.report(format!(
                "Page {}/{}: {} products",
                page,
                options.pages,
                parsed.len()
            ));

            for record in parsed {
                let record = if options.fetch_details && !record.link.is_empty() {
                    self.attach_specs(record, options.delay).await
                } else {
                    record
                };
                records.push(record);
            }

            self.pause(options.delay).await;
        }

        info!("Crawl complete. Collected {} records", records.len());
        records
    }

    async fn fetch_page(
        &mut self,
        base_url: &str,
        page: usize,
        delay: DelayRange,
    ) -> Option<(String, String)> {
        for url in page_candidates(base_url, page) {
            info!("Fetching listing page: {}", url);
            if let Some(body) = self.source.fetch(&url).await.into_body() {
                return Some((url, body));
            }
            debug!("Candidate {} unavailable", url);
            self.pause(delay).await;
        }
        None
    }

    async fn attach_specs(&mut self, record: ProductRecord, delay: DelayRange) -> ProductRecord {
        self.pause(delay).await;
        debug!("Fetching product page: {}", record.link);
        self.report(format!("Details: {}", record.name));

        let specs = self
            .source
            .fetch(&record.link)
            .await
            .into_body()
            .map(|html| extract_specs(&html))
            .unwrap_or_default();
        record.with_specs(specs)
    }

    async fn pause(&mut self, delay: DelayRange) {
        let duration = delay.sample(&mut self.rng);
        self.sleeper.sleep(duration).await;
    }

    fn report(&self, message: String) {
        if let Some(ref callback) = self.progress_callback {
            callback(message);
        }
    }
}

/// Build the RNG for a run: seeded when reproducibility is wanted.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Execute a crawl over HTTP with the given options
/// Returns the crawl results
pub async fn execute_crawl(
    options: CrawlOptions,
    fetch_options: FetchOptions,
    seed: Option<u64>,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<Vec<ProductRecord>, ScanError> {
    Url::parse(&options.base_url)
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", options.base_url, e)))?;

    let mut rng = rng_from_seed(seed);
    let client = FetchClient::with_rng(fetch_options, StdRng::from_rng(&mut rng))?;

    let mut driver = CrawlDriver::new(client, rng);
    if let Some(callback) = progress_callback {
        driver = driver.with_progress_callback(callback);
    }

    Ok(driver.crawl(&options).await)
}
