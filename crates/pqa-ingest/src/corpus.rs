//! Policy corpus loading.
//!
//! The corpus file carries the segments to index plus the site the policy
//! belongs to:
//!
//! ```json
//! {"domain": "example.com", "url": "https://example.com/privacy",
//!  "segments": {"0": "We collect ...", "1": "Cookies are ..."}}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use pqa_model::Segment;
use serde::Deserialize;

use crate::error::{CorpusError, Result};

/// Site whose privacy policy was segmented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteInfo {
    pub domain: String,
    pub url: String,
}

impl SiteInfo {
    /// Domain with its first letter upper-cased and the rest lower-cased.
    pub fn display_name(&self) -> String {
        let mut chars = self.domain.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    }
}

/// Segments and site information loaded at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    pub site: Option<SiteInfo>,
    pub segments: Vec<Segment>,
}

#[derive(Deserialize)]
struct CorpusFile {
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    segments: BTreeMap<String, String>,
}

impl Corpus {
    pub fn document_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Parses corpus JSON. Segments are ordered by key.
pub fn parse_corpus(content: &str, path: &Path) -> Result<Corpus, CorpusError> {
    let file: CorpusFile = serde_json::from_str(content).map_err(|source| CorpusError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let site = match (file.domain, file.url) {
        (Some(domain), Some(url)) if !domain.is_empty() && !url.is_empty() => {
            Some(SiteInfo { domain, url })
        }
        _ => None,
    };
    let segments = file
        .segments
        .into_iter()
        .map(|(id, text)| Segment::new(id, text))
        .collect();
    Ok(Corpus { site, segments })
}

pub fn load_corpus(path: &Path) -> Result<Corpus, CorpusError> {
    let content = std::fs::read_to_string(path).map_err(|source| CorpusError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let corpus = parse_corpus(&content, path)?;
    tracing::info!(
        segments = corpus.document_count(),
        path = %path.display(),
        "loaded policy corpus"
    );
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_capitalizes_domain() {
        let site = SiteInfo {
            domain: "eXample.com".to_string(),
            url: "https://example.com".to_string(),
        };
        assert_eq!(site.display_name(), "Example.com");
    }

    #[test]
    fn site_requires_domain_and_url() {
        let corpus = parse_corpus(
            r#"{"domain": "example.com", "segments": {"1": "b", "0": "a"}}"#,
            Path::new("corpus.json"),
        )
        .unwrap();
        assert!(corpus.site.is_none());
        assert_eq!(
            corpus.segments,
            vec![Segment::new("0", "a"), Segment::new("1", "b")]
        );
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_corpus("{not json", Path::new("corpus.json")).unwrap_err();
        assert!(matches!(err, CorpusError::Parse { .. }));
    }
}
