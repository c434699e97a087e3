use crate::config::{Bm25Params, SearchConfig};
use crate::spell::VocabularyCorrector;
use crate::tokenizer::Normalizer;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Position of a document in the corpus it was built from.
pub type DocId = u32;

/// A problem record. Fields other than `title`, `description` and `url` are
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Document {
    pub fn new(title: impl Into<String>, description: impl Into<String>, url: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), url: url.into(), extra: Default::default() }
    }

    /// Indexed text: title and description joined by one space.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub num_docs: usize,
    pub num_terms: usize,
    pub avg_doc_len: f32,
    pub built_at: String,
}

/// Immutable term statistics over one corpus snapshot.
///
/// Built wholesale from a document list; a rebuild produces a new value.
/// Queries must be normalized with [`CorpusIndex::normalizer`] so their tokens
/// line up with the indexed ones.
pub struct CorpusIndex {
    pub(crate) documents: Vec<Document>,
    pub(crate) doc_tokens: Vec<Vec<String>>,
    pub(crate) term_freqs: Vec<HashMap<String, u32>>,
    pub(crate) title_terms: Vec<HashSet<String>>,
    pub(crate) doc_freq: HashMap<String, u32>,
    avg_doc_len: f32,
    params: Bm25Params,
    normalizer: Normalizer,
    built_at: String,
}

impl CorpusIndex {
    /// Build with the default pipeline. When spelling correction is enabled the
    /// corrector is trained on this corpus's own vocabulary first.
    pub fn build(documents: Vec<Document>, config: &SearchConfig) -> Self {
        let mut normalizer = Normalizer::default();
        if config.spelling.enabled {
            let mut vocabulary = VocabularyCorrector::new(config.spelling.max_distance);
            for doc in &documents {
                for word in normalizer.words(&doc.text()) {
                    vocabulary.add_word(&word);
                }
            }
            tracing::debug!(vocabulary = vocabulary.len(), "spelling vocabulary ready");
            normalizer = normalizer.with_corrector(vocabulary);
        }
        Self::build_with(documents, normalizer, config.bm25)
    }

    pub fn build_with(documents: Vec<Document>, normalizer: Normalizer, params: Bm25Params) -> Self {
        let num_docs = documents.len();
        let mut doc_tokens = Vec::with_capacity(num_docs);
        let mut term_freqs = Vec::with_capacity(num_docs);
        let mut title_terms = Vec::with_capacity(num_docs);
        let mut doc_freq: HashMap<String, u32> = HashMap::new();
        let mut total_len = 0usize;

        for doc in &documents {
            let tokens = normalizer.normalize(&doc.text());
            let mut tf: HashMap<String, u32> = HashMap::new();
            for token in &tokens {
                *tf.entry(token.clone()).or_insert(0) += 1;
            }
            // one count per document, however often the term repeats
            for term in tf.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            total_len += tokens.len();
            title_terms.push(normalizer.normalize(&doc.title).into_iter().collect());
            term_freqs.push(tf);
            doc_tokens.push(tokens);
        }

        let avg_doc_len = if num_docs == 0 { 0.0 } else { total_len as f32 / num_docs as f32 };
        let built_at = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| "".into());
        tracing::info!(num_docs, num_terms = doc_freq.len(), avg_doc_len, "corpus index built");

        Self { documents, doc_tokens, term_freqs, title_terms, doc_freq, avg_doc_len, params, normalizer, built_at }
    }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.documents.get(doc_id as usize)
    }

    pub fn tokens(&self, doc_id: DocId) -> Option<&[String]> {
        self.doc_tokens.get(doc_id as usize).map(Vec::as_slice)
    }

    pub fn title_terms(&self, doc_id: DocId) -> Option<&HashSet<String>> {
        self.title_terms.get(doc_id as usize)
    }

    /// Number of documents containing `term` at least once.
    pub fn doc_freq(&self, term: &str) -> u32 {
        self.doc_freq.get(term).copied().unwrap_or(0)
    }

    pub fn doc_freqs(&self) -> &HashMap<String, u32> { &self.doc_freq }

    pub fn avg_doc_len(&self) -> f32 { self.avg_doc_len }

    pub fn params(&self) -> Bm25Params { self.params }

    pub fn normalizer(&self) -> &Normalizer { &self.normalizer }

    pub fn built_at(&self) -> &str { &self.built_at }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            num_docs: self.len(),
            num_terms: self.doc_freq.len(),
            avg_doc_len: self.avg_doc_len(),
            built_at: self.built_at().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("Two Sum", "Find two numbers in the array that add to target.", "https://leetcode.com/problems/two-sum"),
            Document::new("Binary Search", "Search a sorted array. Search fast.", "https://codeforces.com/x"),
            Document::new("Climbing Stairs", "", "https://leetcode.com/problems/climbing-stairs"),
        ]
    }

    #[test]
    fn doc_freq_counts_documents_not_occurrences() {
        let idx = CorpusIndex::build(corpus(), &SearchConfig::default());
        assert_eq!(idx.doc_freq("search"), 1);
        assert_eq!(idx.doc_freq("array"), 2);
        assert_eq!(idx.doc_freq("nonexistent"), 0);
    }

    #[test]
    fn doc_freq_matches_recount() {
        let idx = CorpusIndex::build(corpus(), &SearchConfig::default());
        for (term, &df) in idx.doc_freqs() {
            let recount = idx.doc_tokens.iter().filter(|toks| toks.iter().any(|t| t == term)).count();
            assert_eq!(df as usize, recount, "term {term}");
        }
    }

    #[test]
    fn average_length_is_mean_token_count() {
        let idx = CorpusIndex::build(corpus(), &SearchConfig::default());
        let total: usize = idx.doc_tokens.iter().map(Vec::len).sum();
        assert!((idx.avg_doc_len() - total as f32 / 3.0).abs() < 1e-6);
        assert!(idx.avg_doc_len() > 0.0);
    }

    #[test]
    fn empty_corpus_is_valid() {
        let idx = CorpusIndex::build(Vec::new(), &SearchConfig::default());
        assert!(idx.is_empty());
        assert_eq!(idx.avg_doc_len(), 0.0);
        assert_eq!(idx.stats().num_terms, 0);
        assert!(!idx.built_at().is_empty());
        assert_eq!(idx.stats().built_at, idx.built_at());
    }

    #[test]
    fn title_terms_are_normalized_separately() {
        let idx = CorpusIndex::build(corpus(), &SearchConfig::default());
        let title = idx.title_terms(1).unwrap();
        assert!(title.contains("search"));
        assert!(!title.contains("sort"));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let docs: Vec<Document> = serde_json::from_str(
            r#"[{"url": "https://cses.fi/problemset/task/1068"}, {"title": null, "description": null, "url": "x", "difficulty": "Easy"}]"#,
        )
        .unwrap();
        assert_eq!(docs[0].title, "");
        assert_eq!(docs[1].description, "");
        assert_eq!(docs[1].extra.get("difficulty").and_then(|v| v.as_str()), Some("Easy"));
        let idx = CorpusIndex::build(docs, &SearchConfig::default());
        assert_eq!(idx.tokens(0).map(<[String]>::len), Some(0));
    }
}
