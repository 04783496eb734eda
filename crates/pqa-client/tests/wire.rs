//! Integration tests for backend reply validation.

use pqa_client::wire::{decode_query_response, decode_version, index_body, query_body};
use pqa_model::{DocumentMeta, Segment};
use serde_json::json;

#[test]
fn query_body_nests_top_k_per_stage() {
    let body = query_body("Do you sell my data?", 3, 12);
    assert_eq!(
        body,
        json!({
            "query": "Do you sell my data?",
            "params": {"Retriever": {"top_k": 12}, "Reader": {"top_k": 3}}
        })
    );
}

#[test]
fn index_body_names_segments_by_id() {
    let body = index_body(&[Segment::new("s1", "We collect data.")]);
    assert_eq!(
        body,
        json!([{"content": "We collect data.", "meta": {"name": "s1"}}])
    );
}

#[test]
fn decodes_answers_and_joins_document_backlinks() {
    let raw = json!({
        "query": "How do you collect my data?",
        "answers": [
            {
                "answer": "cookies",
                "context": "we use cookies to track",
                "score": 0.8731,
                "document_id": "d1",
                "meta": {"name": "policy.txt"}
            },
            {
                "answer": "forms",
                "context": "when you fill forms",
                "score": 0.5,
                "document_id": "d2",
                "meta": {"name": "faq.txt"}
            }
        ],
        "documents": [
            {"id": "d1", "content": "...", "meta": {"title": "Policy", "url": "http://x"}},
            {"id": "d2", "content": "...", "meta": {"name": "faq.txt"}}
        ]
    });

    let results = decode_query_response(&raw).expect("decode");
    assert_eq!(results.len(), 2);

    let first = &results[0];
    assert_eq!(first.answer, "cookies");
    assert_eq!(first.context, "...we use cookies to track...");
    assert_eq!(first.relevance, 87.31);
    assert_eq!(
        first.document_meta,
        Some(DocumentMeta {
            title: Some("Policy".to_string()),
            url: Some("http://x".to_string()),
        })
    );
    assert_eq!(first.fallback_source, "policy.txt");

    let second = &results[1];
    assert_eq!(second.document_meta, Some(DocumentMeta::default()));
    assert_eq!(second.fallback_source, "faq.txt");
}

#[test]
fn answers_without_text_become_no_answer_results() {
    let raw = json!({
        "answers": [{"answer": null, "score": 0.1, "meta": {}}],
        "documents": []
    });

    let results = decode_query_response(&raw).expect("decode");
    assert_eq!(results.len(), 1);
    assert!(!results[0].has_answer());
    assert_eq!(results[0].relevance, 10.0);
    assert!(results[0].document_meta.is_none());
}

#[test]
fn wrong_shape_is_a_decode_error() {
    let err = decode_query_response(&json!({"answers": "nope"})).unwrap_err();
    assert!(err.is_decode());
    insta::assert_snapshot!(
        err.to_string(),
        @"could not decode response from query: invalid type: string \"nope\", expected a sequence"
    );
}

#[test]
fn version_reply_is_validated() {
    assert_eq!(decode_version(&json!({"hs_version": "1.2.0"})).unwrap(), "1.2.0");
    assert!(decode_version(&json!({})).unwrap_err().is_decode());
}
