use serde::{Deserialize, Serialize};

/// Example question with its expected answer label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub question_text: String,
    pub answer_label: String,
}

impl DatasetRow {
    pub fn new(question_text: impl Into<String>, answer_label: impl Into<String>) -> Self {
        Self {
            question_text: question_text.into(),
            answer_label: answer_label.into(),
        }
    }
}
