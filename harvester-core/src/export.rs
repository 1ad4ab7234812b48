// Export of scraped records to JSON / CSV files

use harvester_scanner::ProductRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const CSV_HEADER: [&str; 4] = ["name", "price_raw", "link", "specs"];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Format requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Both,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            "both" => Some(OutputFormat::Both),
            _ => None,
        }
    }
}

/// Format of one written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Csv,
}

impl RecordFormat {
    fn extension(self) -> &'static str {
        match self {
            RecordFormat::Json => "json",
            RecordFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written {
        path: PathBuf,
        format: RecordFormat,
        count: usize,
    },
    /// Nothing to write; no file was created.
    Skipped,
}

/// Resolve the file(s) to write for `output` under `format`.
///
/// A single format writes to `output` as given. `Both` keeps `output` for the
/// format its extension already names and swaps the extension for the other.
pub fn output_paths(output: &Path, format: OutputFormat) -> Vec<(PathBuf, RecordFormat)> {
    match format {
        OutputFormat::Json => vec![(output.to_path_buf(), RecordFormat::Json)],
        OutputFormat::Csv => vec![(output.to_path_buf(), RecordFormat::Csv)],
        OutputFormat::Both => [RecordFormat::Json, RecordFormat::Csv]
            .into_iter()
            .map(|f| (path_for(output, f), f))
            .collect(),
    }
}

fn path_for(output: &Path, format: RecordFormat) -> PathBuf {
    let has_extension = output
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(format.extension()));

    if has_extension {
        output.to_path_buf()
    } else {
        output.with_extension(format.extension())
    }
}

/// Write `records` to every path implied by `output` and `format`.
pub fn export(
    records: &[ProductRecord],
    output: &Path,
    format: OutputFormat,
) -> Result<Vec<ExportOutcome>, ExportError> {
    output_paths(output, format)
        .into_iter()
        .map(|(path, record_format)| write_records(records, &path, record_format))
        .collect()
}

/// Write `records` to `path` in a single format.
///
/// An empty record list writes nothing and reports [`ExportOutcome::Skipped`].
pub fn write_records(
    records: &[ProductRecord],
    path: &Path,
    format: RecordFormat,
) -> Result<ExportOutcome, ExportError> {
    if records.is_empty() {
        info!("No records to write to {}", path.display());
        return Ok(ExportOutcome::Skipped);
    }

    match format {
        RecordFormat::Json => write_json(records, path)?,
        RecordFormat::Csv => write_csv(records, path)?,
    }

    info!(
        "Saved {} records to {}: {}",
        records.len(),
        format.extension().to_uppercase(),
        path.display()
    );
    Ok(ExportOutcome::Written {
        path: path.to_path_buf(),
        format,
        count: records.len(),
    })
}

fn write_json(records: &[ProductRecord], path: &Path) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

// The specs map goes into a single cell as compact JSON.
fn write_csv(records: &[ProductRecord], path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;

    for record in records {
        let specs = match record.specs {
            Some(ref specs) => serde_json::to_string(specs)?,
            None => String::new(),
        };
        writer.write_record([
            record.name.as_str(),
            record.price_raw.as_str(),
            record.link.as_str(),
            specs.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
