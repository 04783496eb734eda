pub mod corpus;
pub mod dataset;
pub mod error;

pub use corpus::{Corpus, SiteInfo, load_corpus, parse_corpus};
pub use dataset::{ANSWER_COLUMN, DATASET_DELIMITER, QUESTION_COLUMN, load_dataset};
pub use error::{CorpusError, DatasetError};
