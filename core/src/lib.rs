//! Problem search core: text normalization, corpus statistics and BM25 ranking
//! with a title boost.

pub mod bm25;
pub mod boost;
pub mod config;
pub mod corpus;
pub mod index;
pub mod rank;
pub mod snapshot;
pub mod spell;
pub mod tokenizer;

pub use config::{Bm25Params, SearchConfig};
pub use index::{CorpusIndex, DocId, Document, IndexStats};
pub use rank::{rank, search, ScoredResult, SearchOutcome};
pub use snapshot::IndexHandle;

/// Build a fresh index from a full corpus snapshot.
pub fn build_index(documents: Vec<Document>, config: &SearchConfig) -> CorpusIndex {
    CorpusIndex::build(documents, config)
}
