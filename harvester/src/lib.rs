pub mod commands;
pub mod handlers;
pub mod progress;

pub use commands::command_argument_builder;
pub use handlers::{RunConfig, expand_output_path, handle_scrape, run_config_from_matches};
pub use progress::ProgressWriter;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
