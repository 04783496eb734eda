use pqa_model::{AnswerResult, DocumentMeta};

/// Citation for a result: a `[title](url)` link when the document carries a
/// backlink, the fallback source label otherwise.
pub fn resolve(result: &AnswerResult) -> String {
    match result.document_meta.as_ref().and_then(DocumentMeta::backlink) {
        Some((title, url)) => format!("[{title}]({url})"),
        None => result.fallback_source.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(meta: Option<DocumentMeta>) -> AnswerResult {
        AnswerResult {
            answer: "a".to_string(),
            context: "a".to_string(),
            relevance: 1.0,
            document_meta: meta,
            fallback_source: "web".to_string(),
        }
    }

    #[test]
    fn backlink_becomes_link() {
        let meta = DocumentMeta {
            title: Some("Policy".to_string()),
            url: Some("http://x".to_string()),
        };
        assert_eq!(resolve(&result(Some(meta))), "[Policy](http://x)");
    }

    #[test]
    fn missing_or_partial_meta_falls_back() {
        assert_eq!(resolve(&result(None)), "web");
        let partial = DocumentMeta {
            title: None,
            url: Some("http://x".to_string()),
        };
        assert_eq!(resolve(&result(Some(partial))), "web");
    }
}
