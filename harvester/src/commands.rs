use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub fn command_argument_builder() -> clap::Command {
    command!("harvester")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("harvester")
        .about("Scrape product listings page by page and export them as JSON or CSV")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-u --"url" <URL>)
                .required(true)
                .help("Base URL of the listing to scrape")
                .value_parser(clap::value_parser!(Url)),
        )
        .arg(
            arg!(-p --"pages" <N>)
                .required(false)
                .help("Number of listing pages to scrape")
                .value_parser(clap::value_parser!(usize))
                .default_value("1"),
        )
        .arg(
            arg!(--"delay-min" <SECS>)
                .required(false)
                .help("Minimum pause between requests, in seconds")
                .value_parser(clap::value_parser!(f64))
                .allow_negative_numbers(true)
                .default_value("1.0"),
        )
        .arg(
            arg!(--"delay-max" <SECS>)
                .required(false)
                .help("Maximum pause between requests, in seconds")
                .value_parser(clap::value_parser!(f64))
                .allow_negative_numbers(true)
                .default_value("3.0"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Output file. With --format both the other extension is derived from it")
                .default_value("products.json"),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Output format: json, csv, both")
                .value_parser(["json", "csv", "both"])
                .default_value("json"),
        )
        .arg(
            arg!(--"fetch-products")
                .required(false)
                .help("Visit every product page and collect its specifications")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"retries" <N>)
                .required(false)
                .help("Retries per request on connection errors and 429/5xx responses")
                .value_parser(clap::value_parser!(u32))
                .default_value("3"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("15"),
        )
        .arg(
            arg!(--"backoff-factor" <SECS>)
                .required(false)
                .help("Retry backoff factor; retry n waits factor * 2^n seconds")
                .value_parser(clap::value_parser!(f64))
                .default_value("0.3"),
        )
        .arg(
            arg!(--"seed" <N>)
                .required(false)
                .help("Seed the random source so delays and user agents repeat across runs")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(arg!(-v --"verbose" "Enable debug logging").required(false))
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
}
