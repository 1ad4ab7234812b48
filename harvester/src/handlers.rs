use clap::ArgMatches;
use colored::Colorize;
use harvester_core::report::generate_crawl_summary;
use harvester_core::{
    ConfigError, CrawlOptions, CrawlProgressCallback, DelayRange, OutputFormat, execute_crawl,
    export,
};
use harvester_scanner::FetchOptions;
use crate::progress::progress_spinner;
use indicatif::MultiProgress;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Exit code for configuration rejected before any network activity.
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for runtime failures (client construction, export).
pub const EXIT_FAILURE: i32 = 1;

/// Everything a scrape run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub crawl: CrawlOptions,
    pub fetch: FetchOptions,
    pub seed: Option<u64>,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Expand a leading `~` in an output path
pub fn expand_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Resolve and validate parsed arguments
pub fn run_config_from_matches(matches: &ArgMatches) -> Result<RunConfig, ConfigError> {
    let url = matches
        .get_one::<Url>("url")
        .ok_or(ConfigError::MissingArgument("url"))?;
    let pages = matches.get_one::<usize>("pages").copied().unwrap_or(1);
    let delay_min = matches.get_one::<f64>("delay-min").copied().unwrap_or(1.0);
    let delay_max = matches.get_one::<f64>("delay-max").copied().unwrap_or(3.0);
    let delay = DelayRange::new(delay_min, delay_max)?;

    let format_name = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("json");
    let format = OutputFormat::from_str(format_name)
        .ok_or_else(|| ConfigError::UnknownFormat(format_name.to_string()))?;

    let output = matches
        .get_one::<String>("output")
        .map(|raw| expand_output_path(raw))
        .unwrap_or_else(|| PathBuf::from("products.json"));

    let defaults = FetchOptions::default();
    let fetch = FetchOptions {
        timeout: matches
            .get_one::<u64>("timeout")
            .map(|secs| Duration::from_secs(*secs))
            .unwrap_or(defaults.timeout),
        retries: matches
            .get_one::<u32>("retries")
            .copied()
            .unwrap_or(defaults.retries),
        backoff_factor: matches
            .get_one::<f64>("backoff-factor")
            .copied()
            .unwrap_or(defaults.backoff_factor),
    };

    Ok(RunConfig {
        crawl: CrawlOptions {
            base_url: url.as_str().to_string(),
            pages,
            delay,
            fetch_details: matches.get_flag("fetch-products"),
        },
        fetch,
        seed: matches.get_one::<u64>("seed").copied(),
        output,
        format,
        quiet: matches.get_flag("quiet"),
    })
}

/// Run a full scrape from parsed arguments and return the process exit code.
///
/// The spinner is drawn through `progress`, the same handle the log writer
/// suspends, so the two never interleave.
pub async fn handle_scrape(matches: &ArgMatches, progress: &MultiProgress) -> i32 {
    let config = match run_config_from_matches(matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            return EXIT_CONFIG;
        }
    };

    if !config.quiet {
        println!("Scraping {}", config.crawl.base_url.bold());
        println!("Pages: {}", config.crawl.pages);
        println!(
            "Delay: {:.1}s - {:.1}s",
            config.crawl.delay.min(),
            config.crawl.delay.max()
        );
        println!(
            "Product pages: {}\n",
            if config.crawl.fetch_details { "yes" } else { "no" }
        );
    }

    let spinner = (!config.quiet).then(|| progress_spinner(progress));
    let progress_callback: Option<CrawlProgressCallback> = spinner.clone().map(|pb| {
        Arc::new(move |message: String| pb.set_message(message)) as CrawlProgressCallback
    });

    let result = execute_crawl(
        config.crawl.clone(),
        config.fetch.clone(),
        config.seed,
        progress_callback,
    )
    .await;

    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    let records = match result {
        Ok(records) => records,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            return EXIT_FAILURE;
        }
    };

    if records.is_empty() {
        info!("No items scraped");
        if !config.quiet {
            println!("{} No items scraped, nothing written", "!".yellow().bold());
        }
        return 0;
    }

    let outcomes = match export(&records, &config.output, config.format) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            return EXIT_FAILURE;
        }
    };

    if !config.quiet {
        println!("{} Scrape complete!\n", "✓".green().bold());
        print!("{}", generate_crawl_summary(&records, &outcomes));
    }

    0
}
