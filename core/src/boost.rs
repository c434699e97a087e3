use crate::index::Document;
use crate::tokenizer::Normalizer;
use std::collections::HashSet;

/// Multiplicative reward for query tokens that also occur in the title.
///
/// Every query position counts, repeats included, against the full query length.
/// Never below 1.0; exactly 1.0 when nothing matches.
pub fn title_boost(query: &[String], title_terms: &HashSet<String>) -> f32 {
    let matches = query.iter().filter(|t| title_terms.contains(*t)).count();
    if matches == 0 {
        return 1.0;
    }
    1.0 + matches as f32 / query.len() as f32
}

/// Boost for a document whose title has not been normalized yet.
pub fn boost(query: &[String], document: &Document, normalizer: &Normalizer) -> f32 {
    let title: HashSet<String> = normalizer.normalize(&document.title).into_iter().collect();
    title_boost(query, &title)
}
