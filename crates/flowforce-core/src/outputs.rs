use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use polars::prelude::{CsvWriter, DataFrame, PolarsError, SerWriter};
use serde::Serialize;
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::constants::assumptions_text;
use crate::error::OutputError;
use crate::parameters::StructureParameters;
use crate::session::{EventSelection, FileFailure, ProcessedFile};

pub const PARAMETERS_FILE: &str = "parameters.json";
pub const ASSUMPTIONS_FILE: &str = "assumptions.txt";
pub const NULL_VALUE: &str = "N/A";

#[derive(Debug, Serialize)]
struct BundleFile<'a> {
    file_name: &'a str,
    file_hash: &'a str,
    rows: usize,
    results: String,
}

#[derive(Debug, Serialize)]
struct BundleManifest<'a> {
    generated_at: String,
    events: String,
    parameters: &'a StructureParameters,
    files: Vec<BundleFile<'a>>,
    failures: &'a [FileFailure],
}

/// `forces_results_<stem>.csv` for an uploaded file name.
pub fn results_file_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("upload");
    format!("forces_results_{stem}.csv")
}

/// Source columns followed by every processed event's result columns.
pub fn results_dataframe(file: &ProcessedFile) -> Result<DataFrame, PolarsError> {
    let mut output = file.sheet.df.clone();
    for event in &file.report.events {
        event.forces.append_to(&mut output)?;
    }
    Ok(output)
}

pub fn results_csv_bytes(file: &ProcessedFile) -> Result<Vec<u8>, OutputError> {
    let mut df = results_dataframe(file)?;
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_null_value(NULL_VALUE.to_string())
        .finish(&mut df)?;
    Ok(buffer)
}

/// Zip archive with one results CSV per file, the effective parameters and
/// the assumptions text. Uploads that failed are listed in the manifest.
pub fn create_bundle(
    files: &[ProcessedFile],
    failures: &[FileFailure],
    params: &StructureParameters,
    selection: &EventSelection,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, OutputError> {
    let cursor = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(cursor);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut used_names = HashSet::new();
    let mut manifest_files = Vec::with_capacity(files.len());
    for file in files {
        let entry_name = unique_name(&mut used_names, results_file_name(&file.report.file_name));
        let csv = results_csv_bytes(file)?;
        zip.start_file(entry_name.as_str(), options)?;
        zip.write_all(&csv)?;

        manifest_files.push(BundleFile {
            file_name: &file.report.file_name,
            file_hash: &file.report.file_hash,
            rows: file.report.row_count,
            results: entry_name,
        });
    }

    let manifest = BundleManifest {
        generated_at: generated_at.to_rfc3339(),
        events: selection.to_string(),
        parameters: params,
        files: manifest_files,
        failures,
    };
    zip.start_file(PARAMETERS_FILE, options)?;
    zip.write_all(&serde_json::to_vec_pretty(&manifest)?)?;

    zip.start_file(ASSUMPTIONS_FILE, options)?;
    zip.write_all(assumptions_text().as_bytes())?;

    let cursor = zip.finish()?;
    let bytes = cursor.into_inner();
    info!(
        files = files.len(),
        failures = failures.len(),
        bytes = bytes.len(),
        "Built results bundle"
    );
    Ok(bytes)
}

fn unique_name(used: &mut HashSet<String>, name: String) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let stem = name.trim_end_matches(".csv");
    let mut idx = 2;
    loop {
        let candidate = format!("{stem}_{idx}.csv");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        idx += 1;
    }
}
