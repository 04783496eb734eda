//! Example question dataset loading.
//!
//! The dataset is a `;`-separated file with a header row containing at least
//! the `Question Text` and `Answer` columns. It is read once at startup.

use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;
use pqa_model::DatasetRow;

use crate::error::{DatasetError, Result};

pub const QUESTION_COLUMN: &str = "Question Text";
pub const ANSWER_COLUMN: &str = "Answer";
pub const DATASET_DELIMITER: u8 = b';';

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn find_column(headers: &[String], name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
        .ok_or_else(|| DatasetError::MissingColumn {
            column: name.to_string(),
            path: path.to_path_buf(),
        })
}

/// Loads the example question dataset.
///
/// Rows without question text are skipped. A file with no remaining rows is
/// rejected so the sampler always has something to draw from.
pub fn load_dataset(path: &Path) -> Result<Vec<DatasetRow>> {
    let file = File::open(path).map_err(|source| DatasetError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new()
        .delimiter(DATASET_DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let parse_error = |source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(normalize_header)
        .collect();
    let question_idx = find_column(&headers, QUESTION_COLUMN, path)?;
    let answer_idx = find_column(&headers, ANSWER_COLUMN, path)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        let question = record.get(question_idx).map(normalize_cell).unwrap_or_default();
        if question.is_empty() {
            skipped += 1;
            continue;
        }
        let answer = record.get(answer_idx).map(normalize_cell).unwrap_or_default();
        rows.push(DatasetRow::new(question, answer));
    }

    if skipped > 0 {
        tracing::warn!(skipped, path = %path.display(), "skipped dataset rows without question text");
    }
    if rows.is_empty() {
        return Err(DatasetError::Empty {
            path: path.to_path_buf(),
        });
    }
    tracing::info!(rows = rows.len(), path = %path.display(), "loaded example questions");
    Ok(rows)
}
