//! BM25 Okapi scoring against a [`CorpusIndex`].

use crate::config::Bm25Params;
use crate::index::{CorpusIndex, DocId};
use anyhow::{bail, Result};
use std::collections::HashSet;

/// IDF: ln((N - df + 0.5) / (df + 0.5) + 1). Positive for every `df` in `0..=N`.
pub fn idf(num_docs: usize, doc_freq: u32) -> f32 {
    let n = num_docs as f32;
    let df = doc_freq as f32;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

/// Contribution of one term to a document's score.
pub fn term_weight(tf: u32, doc_len: usize, avg_doc_len: f32, idf: f32, params: Bm25Params) -> f32 {
    if tf == 0 || doc_len == 0 {
        return 0.0;
    }
    let tf = tf as f32;
    let length_norm = 1.0 - params.b + params.b * doc_len as f32 / avg_doc_len;
    idf * (tf * (params.k1 + 1.0)) / (tf + params.k1 * length_norm)
}

/// Score normalized query tokens against one document.
///
/// Repeated query tokens count once. Fails only for an out-of-range `doc_id`.
pub fn score(query: &[String], doc_id: DocId, index: &CorpusIndex) -> Result<f32> {
    if doc_id as usize >= index.len() {
        bail!("document {doc_id} out of range for index of {} documents", index.len());
    }
    Ok(score_document(query, doc_id as usize, index))
}

pub(crate) fn score_document(query: &[String], doc: usize, index: &CorpusIndex) -> f32 {
    let tf = &index.term_freqs[doc];
    let doc_len = index.doc_tokens[doc].len();
    let mut seen: HashSet<&str> = HashSet::new();
    query
        .iter()
        .filter(|term| seen.insert(term.as_str()))
        .map(|term| match tf.get(term) {
            Some(&count) => {
                let idf = idf(index.len(), index.doc_freq(term));
                term_weight(count, doc_len, index.avg_doc_len(), idf, index.params())
            }
            None => 0.0,
        })
        .sum()
}
