pub mod answer;
pub mod chunk;
pub mod client;
pub mod embeddings;
pub mod index;
pub mod llm;
pub mod retrieve;
pub mod store;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::client::LocalClient;
    use crate::index::{SearchResult, VectorIndex};
    use crate::retrieve::build_context;

    #[test]
    fn client_rejects_non_localhost_urls() {
        for url in [
            "http://example.com",
            "https://127.0.0.1:11434",
            "http://127.0.0.1.evil.com:11434",
            "http://localhost:11434",
            "http://127.0.0.1:0",
            "http://127.0.0.1:notaport",
        ] {
            let err = LocalClient::new(url).unwrap_err();
            assert_eq!(err.code, "AI_REMOTE_NOT_ALLOWED", "url: {url}");
        }
    }

    #[test]
    fn client_accepts_localhost_and_normalizes_trailing_slash() {
        let client = LocalClient::new("http://127.0.0.1:11434/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:11434");

        let bare = LocalClient::new("http://127.0.0.1").unwrap();
        assert_eq!(bare.base_url(), "http://127.0.0.1");
    }

    #[test]
    fn context_blocks_carry_source_tags() {
        let chunk = |filename: &str, text: &str| crate::chunk::DocumentChunk {
            id: "x".into(),
            source_document_id: "d".into(),
            source_filename: filename.into(),
            text: text.into(),
            start_offset: 0,
            end_offset: text.chars().count(),
        };
        let results = vec![
            SearchResult { chunk: chunk("a.pdf", "first"), score: 0.9 },
            SearchResult { chunk: chunk("b.pdf", "second"), score: 0.5 },
        ];

        let context = build_context(&results, 10_000);
        assert_eq!(context, "[From a.pdf]\nfirst\n\n---\n\n[From b.pdf]\nsecond");
    }

    #[test]
    fn empty_index_reports_zero_documents() {
        let index = VectorIndex::new();
        assert_eq!(index.document_count(), 0);
        assert!(index.is_empty());
    }
}
