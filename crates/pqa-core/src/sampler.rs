//! Random example question selection.

use std::collections::HashSet;

use pqa_model::DatasetRow;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SamplerError {
    #[error("example question dataset is empty")]
    EmptyDataset,
}

/// Draws example questions that differ from the one currently shown.
#[derive(Debug, Clone)]
pub struct RandomSampler {
    rows: Vec<DatasetRow>,
    distinct_questions: usize,
}

impl RandomSampler {
    pub fn new(rows: Vec<DatasetRow>) -> Result<Self, SamplerError> {
        if rows.is_empty() {
            return Err(SamplerError::EmptyDataset);
        }
        let distinct_questions = rows
            .iter()
            .map(|row| row.question_text.as_str())
            .collect::<HashSet<_>>()
            .len();
        Ok(Self {
            rows,
            distinct_questions,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn distinct_questions(&self) -> usize {
        self.distinct_questions
    }

    /// Draws a row whose question differs from `exclude`.
    pub fn sample(&self, exclude: &str) -> &DatasetRow {
        self.sample_with(exclude, &mut rand::thread_rng())
    }

    /// Same as [`sample`](Self::sample) with a caller-supplied generator.
    ///
    /// Redraws until the question differs from `exclude`. With a single
    /// distinct question there is nothing else to draw, so the first draw is
    /// returned as is.
    pub fn sample_with<R: Rng + ?Sized>(&self, exclude: &str, rng: &mut R) -> &DatasetRow {
        loop {
            let row = &self.rows[rng.gen_range(0..self.rows.len())];
            if self.distinct_questions < 2 || row.question_text != exclude {
                return row;
            }
        }
    }
}
