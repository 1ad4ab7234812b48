pub mod config;
pub mod crawl;
pub mod export;
pub mod report;

use colored::Colorize;

pub use config::{ConfigError, DelayRange};
pub use crawl::{CrawlDriver, CrawlOptions, CrawlProgressCallback, execute_crawl};
pub use export::{ExportError, ExportOutcome, OutputFormat, RecordFormat, export, write_records};

pub fn print_banner() {
    println!(
        "{} {}",
        "harvester".bright_green().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!("{}", "polite product listing scraper".bright_black());
    println!();
}
