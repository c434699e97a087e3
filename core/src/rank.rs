use crate::bm25::score_document;
use crate::boost::title_boost;
use crate::index::{CorpusIndex, DocId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredResult {
    pub doc_id: DocId,
    pub bm25_score: f32,
    /// Always >= 1.0.
    pub title_boost: f32,
    pub final_score: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// Query tokens after normalization.
    pub processed_query: Vec<String>,
    /// Documents with a positive score, before truncation to the limit.
    pub total_hits: usize,
    pub results: Vec<ScoredResult>,
}

/// Rank every document in `index` against `raw_query`.
///
/// Results with a non-positive final score are dropped. Ordering is by final
/// score descending, ties by document position ascending, so a smaller limit
/// always yields a prefix of a larger one.
pub fn search(raw_query: &str, index: &CorpusIndex, limit: usize) -> SearchOutcome {
    if raw_query.trim().is_empty() {
        return SearchOutcome::default();
    }
    let query = index.normalizer().normalize(raw_query);
    if query.is_empty() {
        tracing::debug!(raw_query, "query empty after normalization");
        return SearchOutcome::default();
    }

    let mut scored: Vec<ScoredResult> = (0..index.len())
        .filter_map(|doc| {
            let bm25_score = score_document(&query, doc, index);
            if bm25_score <= 0.0 {
                return None;
            }
            let boost = title_boost(&query, &index.title_terms[doc]);
            let final_score = bm25_score * boost;
            (final_score > 0.0).then_some(ScoredResult {
                doc_id: doc as DocId,
                bm25_score,
                title_boost: boost,
                final_score,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.final_score.total_cmp(&a.final_score).then_with(|| a.doc_id.cmp(&b.doc_id)));
    let total_hits = scored.len();
    scored.truncate(limit);
    tracing::debug!(tokens = query.len(), total_hits, returned = scored.len(), "ranked query");

    SearchOutcome { processed_query: query, total_hits, results: scored }
}

pub fn rank(raw_query: &str, index: &CorpusIndex, limit: usize) -> Vec<ScoredResult> {
    search(raw_query, index, limit).results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::index::Document;

    fn two_docs() -> CorpusIndex {
        CorpusIndex::build(
            vec![
                Document::new(
                    "Two Sum",
                    "Given an array of integers, return indices of the two numbers that add up to a target.",
                    "https://leetcode.com/problems/two-sum",
                ),
                Document::new("Binary Search", "Search a sorted array.", "https://codeforces.com/x"),
            ],
            &SearchConfig::default(),
        )
    }

    #[test]
    fn blank_queries_return_nothing() {
        let idx = two_docs();
        assert!(rank("", &idx, 10).is_empty());
        assert!(rank("   ", &idx, 10).is_empty());
        assert!(rank("the of and", &idx, 10).is_empty());
    }

    #[test]
    fn two_sum_outranks_binary_search() {
        let idx = two_docs();
        let results = rank("two sum array", &idx, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].doc_id, 0);
        assert!(results[0].final_score > 0.0);
        assert!(results[0].final_score > results[1].final_score);
        assert!(results[0].title_boost > 1.0);
        assert_eq!(results[1].title_boost, 1.0);
    }

    #[test]
    fn final_score_is_product() {
        let idx = two_docs();
        for r in rank("binary search array", &idx, 10) {
            assert!((r.final_score - r.bm25_score * r.title_boost).abs() < 1e-5);
        }
    }

    #[test]
    fn corrects_misspelled_query() {
        let idx = two_docs();
        let outcome = search("binery serch", &idx, 10);
        assert_eq!(outcome.processed_query, vec!["binari", "search"]);
        assert_eq!(outcome.results[0].doc_id, 1);
    }

    #[test]
    fn ties_resolve_by_document_order() {
        let docs = vec![
            Document::new("Heap", "", ""),
            Document::new("Graph", "", ""),
            Document::new("Heap", "", ""),
        ];
        let idx = CorpusIndex::build(docs, &SearchConfig::default());
        let ids: Vec<DocId> = rank("heap", &idx, 10).iter().map(|r| r.doc_id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn limit_truncates_but_counts_all_hits() {
        let idx = two_docs();
        let outcome = search("array", &idx, 1);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.total_hits, 2);
        assert!(rank("array", &idx, 0).is_empty());
    }

    #[test]
    fn empty_index_returns_nothing() {
        let idx = CorpusIndex::build(Vec::new(), &SearchConfig::default());
        assert!(rank("two sum", &idx, 10).is_empty());
    }
}
