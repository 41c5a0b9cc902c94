use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};
use log::info;

use crate::{ClassificationResult, ClassifierError, Result, COLUMNS};

/// Loads one query per non-empty line, trimmed.
pub fn load_queries_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        ClassifierError::IoError(io::Error::new(
            e.kind(),
            format!("Input file not found or unreadable: {} ({})", path.display(), e),
        ))
    })?;
    Ok(parse_queries(&content))
}

pub fn parse_queries(content: &str) -> Vec<String> {
    content.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// File name of a results file written at `timestamp`.
pub fn results_file_name(timestamp: &DateTime<Local>) -> String {
    format!("brand_results_agentic_{}.csv", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Writes `results` as CSV into `dir`, creating it if needed, and returns the file path.
pub fn write_results_csv(dir: &Path, results: &[ClassificationResult], timestamp: &DateTime<Local>) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(results_file_name(timestamp));

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(COLUMNS)?;
    for result in results {
        writer.write_record(csv_row(result))?;
    }
    writer.flush()?;

    info!("Wrote {} results to {}", results.len(), path.display());
    Ok(path)
}

fn csv_row(result: &ClassificationResult) -> [String; 10] {
    [
        result.query.clone(),
        result.brand.to_string(),
        result.category.to_string(),
        csv_number(result.category_confidence.value()),
        result.sub_category.to_string(),
        csv_number(result.sub_category_confidence.value()),
        result.is_consistent.to_string(),
        result.validation_reason.clone().unwrap_or_default(),
        result.needs_clarification.to_string(),
        result.clarification_question.clone().unwrap_or_default(),
    ]
}

/// Shortest form that keeps a decimal point: `0.82`, `1.0`, `0.0`.
fn csv_number(value: f64) -> String {
    format!("{:?}", value)
}

/// Console summary of one result.
pub fn summarize(result: &ClassificationResult) -> String {
    let mut out = format!(
        "Query: {}\n  Brand: {}\n  Category: {} (conf={})\n  Sub-category: {} (conf={})\n  Consistent? {} - {}",
        result.query,
        result.brand,
        result.category,
        result.category_confidence,
        result.sub_category,
        result.sub_category_confidence,
        result.is_consistent,
        result.validation_reason.as_deref().unwrap_or("None"),
    );
    if result.needs_clarification {
        out.push_str(&format!(
            "\n  Clarification question: {}",
            result.clarification_question.as_deref().unwrap_or("None")
        ));
    }
    out
}
