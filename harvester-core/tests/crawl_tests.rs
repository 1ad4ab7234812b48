// Tests for the pagination driver

use harvester_core::crawl::{CrawlDriver, CrawlOptions, Sleeper, execute_crawl, rng_from_seed};
use harvester_core::DelayRange;
use harvester_scanner::{FetchOptions, FetchResult, PageSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const BASE: &str = "https://example.test/cat/";

/// In-memory page source that serves fixed markup and remembers every URL asked for.
#[derive(Default)]
struct ScriptedSource {
    pages: HashMap<String, String>,
    requested: Vec<String>,
}

impl ScriptedSource {
    fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

impl PageSource for ScriptedSource {
    async fn fetch(&mut self, url: &str) -> FetchResult {
        self.requested.push(url.to_string());
        match self.pages.get(url) {
            Some(body) => FetchResult::Fetched {
                status_code: 200,
                body: body.clone(),
            },
            None => FetchResult::Unavailable,
        }
    }
}

#[derive(Default)]
struct RecordingSleeper {
    slept: Vec<Duration>,
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&mut self, duration: Duration) {
        self.slept.push(duration);
    }
}

fn card(name: &str, price: &str, href: &str) -> String {
    format!(
        r#"<div class="item-card"><a href="{href}"><span class="item-card__name">{name}</span></a><span class="item-card__prices-price">{price}</span></div>"#
    )
}

fn listing(cards: &[String]) -> String {
    format!("<html><body>{}</body></html>", cards.concat())
}

fn options(pages: usize, fetch_details: bool) -> CrawlOptions {
    CrawlOptions {
        base_url: BASE.to_string(),
        pages,
        delay: DelayRange::none(),
        fetch_details,
    }
}

fn driver(source: ScriptedSource) -> CrawlDriver<ScriptedSource, RecordingSleeper> {
    CrawlDriver::new(source, rng_from_seed(Some(1))).with_sleeper(RecordingSleeper::default())
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_stops_when_every_candidate_fails() {
    let source = ScriptedSource::default().with_page(
        "https://example.test/cat",
        &listing(&[card("A", "1 ₸", "/p/a"), card("B", "2 ₸", "/p/b")]),
    );
    let mut driver = driver(source);

    let records = driver.crawl(&options(3, false)).await;

    assert_eq!(records.len(), 2);
    assert_eq!(
        driver.source().requested,
        vec![
            "https://example.test/cat",
            "https://example.test/cat/page/2",
            "https://example.test/cat?page=2",
            "https://example.test/cat/p2",
        ]
    );
    assert!(
        !driver.source().requested.iter().any(|u| u.contains('3')),
        "page 3 must never be attempted"
    );
    // one pause after page 1, one after each failed page-2 candidate
    assert_eq!(driver.sleeper().slept.len(), 4);
}

#[tokio::test]
async fn test_first_successful_convention_is_adopted() {
    let source = ScriptedSource::default()
        .with_page("https://example.test/cat", &listing(&[card("A", "1", "/p/a")]))
        .with_page("https://example.test/cat?page=2", &listing(&[card("B", "2", "/p/b")]));
    let mut driver = driver(source);

    let records = driver.crawl(&options(2, false)).await;

    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
    assert_eq!(
        driver.source().requested,
        vec![
            "https://example.test/cat",
            "https://example.test/cat/page/2",
            "https://example.test/cat?page=2",
        ]
    );
    // page 1, failed /page/2 candidate, page 2
    assert_eq!(driver.sleeper().slept.len(), 3);
}

#[tokio::test]
async fn test_empty_page_still_counts_as_success() {
    let source = ScriptedSource::default()
        .with_page("https://example.test/cat", "<html><body>No cards</body></html>")
        .with_page("https://example.test/cat/page/2", &listing(&[card("Late", "9", "/p/late")]));
    let mut driver = driver(source);

    let records = driver.crawl(&options(2, false)).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Late");
}

#[tokio::test]
async fn test_zero_pages_fetches_nothing() {
    let mut driver = driver(ScriptedSource::default());
    let records = driver.crawl(&options(0, false)).await;
    assert!(records.is_empty());
    assert!(driver.source().requested.is_empty());
}

#[tokio::test]
async fn test_single_page_with_incomplete_card() {
    let html = format!(
        r#"<html><body>{}<div class="item-card"><a href="/p/x"><span class="item-card__name">No price</span></a></div></body></html>"#,
        card("Priced", "10 000 ₸", "/shop/p/priced/")
    );
    let source = ScriptedSource::default().with_page("https://example.test/cat", &html);
    let mut driver = driver(source);

    let records = driver.crawl(&options(1, false)).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].link, "https://example.test/shop/p/priced/");
}

#[tokio::test]
async fn test_records_preserve_page_then_document_order() {
    let source = ScriptedSource::default()
        .with_page(
            "https://example.test/cat",
            &listing(&[card("1", "1", "/1"), card("2", "2", "/2")]),
        )
        .with_page(
            "https://example.test/cat/page/2",
            &listing(&[card("3", "3", "/3"), card("4", "4", "/4")]),
        );
    let mut driver = driver(source);

    let records = driver.crawl(&options(2, false)).await;

    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["1", "2", "3", "4"]);
}

// ============================================================================
// Detail pages
// ============================================================================

#[tokio::test]
async fn test_detail_fetch_attaches_specs() {
    let source = ScriptedSource::default()
        .with_page(
            "https://example.test/cat",
            &listing(&[
                card("Found", "1", "/p/found"),
                card("Missing", "2", "/p/missing"),
                card("Unlinked", "3", ""),
            ]),
        )
        .with_page(
            "https://example.test/p/found",
            r#"<div class="specifications-list__el"><dt>Weight</dt><dd>2 kg</dd></div>"#,
        );
    let mut driver = driver(source);

    let records = driver.crawl(&options(1, true)).await;

    assert_eq!(records.len(), 3);
    let found = records[0].specs.as_ref().expect("specs attached");
    assert_eq!(found["Weight"], "2 kg");
    assert_eq!(records[1].specs, Some(Default::default()), "failed detail fetch yields empty specs");
    assert_eq!(records[2].specs, None, "records without a link are not enriched");

    assert_eq!(
        driver.source().requested,
        vec![
            "https://example.test/cat",
            "https://example.test/p/found",
            "https://example.test/p/missing",
        ]
    );
    // two detail pauses plus the end-of-page pause
    assert_eq!(driver.sleeper().slept.len(), 3);
}

#[tokio::test]
async fn test_details_disabled_leaves_specs_absent() {
    let source = ScriptedSource::default()
        .with_page("https://example.test/cat", &listing(&[card("A", "1", "/p/a")]));
    let mut driver = driver(source);

    let records = driver.crawl(&options(1, false)).await;

    assert_eq!(records[0].specs, None);
    assert_eq!(driver.source().requested.len(), 1);
}

// ============================================================================
// Politeness
// ============================================================================

#[tokio::test]
async fn test_delays_are_drawn_from_range_and_reproducible() {
    let run = |seed| async move {
        let source = ScriptedSource::default()
            .with_page("https://example.test/cat", &listing(&[card("A", "1", "/p/a")]));
        let mut driver = CrawlDriver::new(source, rng_from_seed(Some(seed)))
            .with_sleeper(RecordingSleeper::default());
        let mut opts = options(3, true);
        opts.delay = DelayRange::new(0.5, 2.0).unwrap();
        driver.crawl(&opts).await;
        driver.sleeper().slept.clone()
    };

    let first = run(99).await;
    let second = run(99).await;

    assert_eq!(first, second);
    assert!(!first.is_empty());
    for d in &first {
        let secs = d.as_secs_f64();
        assert!((0.5..=2.0).contains(&secs), "delay {secs} outside configured range");
    }
}

#[tokio::test]
async fn test_progress_callback_receives_page_messages() {
    let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let messages_clone = messages.clone();

    let source = ScriptedSource::default()
        .with_page("https://example.test/cat", &listing(&[card("A", "1", "/p/a")]));
    let mut driver = driver(source).with_progress_callback(Arc::new(move |msg: String| {
        messages_clone.lock().unwrap().push(msg);
    }));

    driver.crawl(&options(2, false)).await;

    let messages = messages.lock().unwrap();
    println!("Progress messages: {:?}", *messages);
    assert!(messages.iter().any(|m| m.contains("Page 1/2: 1 products")));
    assert!(messages.iter().any(|m| m.contains("Page 2 unavailable")));
}

// ============================================================================
// Over HTTP
// ============================================================================

#[tokio::test]
async fn test_execute_crawl_over_http() {
    let mock_server = MockServer::start().await;

    let page_one = listing(&[card("Alpha", "1 000 ₸", "/shop/p/alpha/"), card("Beta", "2 000 ₸", "/shop/p/beta/")]);
    let page_two = listing(&[card("Gamma", "3 000 ₸", "/shop/p/gamma/")]);

    Mock::given(method("GET"))
        .and(path("/cat"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_two))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cat"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_one))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shop/p/alpha/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<dl><dt>Colour</dt><dd>Blue</dd></dl>"),
        )
        .mount(&mock_server)
        .await;

    let options = CrawlOptions {
        base_url: format!("{}/cat/", mock_server.uri()),
        pages: 4,
        delay: DelayRange::none(),
        fetch_details: true,
    };
    let fetch_options = FetchOptions {
        timeout: Duration::from_secs(5),
        retries: 0,
        backoff_factor: 0.0,
    };

    let records = execute_crawl(options, fetch_options, Some(5), None).await.unwrap();

    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Alpha", "Beta", "Gamma"]);
    assert_eq!(records[0].link, format!("{}/shop/p/alpha/", mock_server.uri()));
    assert_eq!(records[0].specs.as_ref().unwrap()["Colour"], "Blue");
    assert_eq!(records[1].specs, Some(Default::default()));

    let requested: Vec<String> = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.to_string())
        .collect();
    println!("Requested URLs: {:#?}", requested);
    assert!(
        !requested.iter().any(|u| u.contains("page=4") || u.contains("/page/4") || u.ends_with("/p4")),
        "crawl must stop after page 3 fails"
    );
}

#[tokio::test]
async fn test_execute_crawl_rejects_invalid_base_url() {
    let options = CrawlOptions {
        base_url: "not a url".to_string(),
        pages: 1,
        delay: DelayRange::none(),
        fetch_details: false,
    };

    let result = execute_crawl(options, FetchOptions::default(), None, None).await;

    assert!(result.is_err());
}
