use harvester::{ProgressWriter, command_argument_builder, handle_scrape};
use harvester_core::print_banner;
use indicatif::MultiProgress;
use tracing::Level;

fn init_tracing(verbose: bool, quiet: bool, progress: &MultiProgress) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(ProgressWriter::new(progress.clone()))
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();
    let quiet = matches.get_flag("quiet");

    let progress = MultiProgress::new();
    init_tracing(matches.get_flag("verbose"), quiet, &progress);

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let code = handle_scrape(&matches, &progress).await;
    std::process::exit(code);
}
