pub mod answer;
pub mod dataset;
pub mod params;
pub mod session;

pub use answer::{AnswerResult, DocumentMeta, Segment};
pub use dataset::DatasetRow;
pub use params::{
    DEFAULT_DOCS_FROM_RETRIEVER, DEFAULT_NUMBER_OF_ANSWERS, QueryLimits, QueryParams,
    READER_TOP_K_MAX, READER_TOP_K_MIN, RETRIEVER_TOP_K_MIN,
};
pub use session::{
    DEFAULT_ANSWER_AT_STARTUP, DEFAULT_QUESTION_AT_STARTUP, ResultSet, SessionDefaults, SessionId,
    SessionState,
};
