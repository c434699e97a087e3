use crate::index::CorpusIndex;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, swappable reference to the live index.
///
/// Readers take an `Arc` snapshot and keep it for the whole query; a rebuild
/// installs a complete new index in one step and never touches the old one.
pub struct IndexHandle {
    current: RwLock<Arc<CorpusIndex>>,
}

impl IndexHandle {
    pub fn new(index: CorpusIndex) -> Self {
        Self { current: RwLock::new(Arc::new(index)) }
    }

    pub fn snapshot(&self) -> Arc<CorpusIndex> {
        self.current.read().clone()
    }

    /// Install `index` and return the one it replaced.
    pub fn replace(&self, index: CorpusIndex) -> Arc<CorpusIndex> {
        let next = Arc::new(index);
        let num_docs = next.len();
        let previous = std::mem::replace(&mut *self.current.write(), next);
        tracing::info!(num_docs, previous_docs = previous.len(), "index swapped");
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::index::Document;
    use crate::rank::rank;

    #[test]
    fn in_flight_snapshot_survives_swap() {
        let cfg = SearchConfig::default();
        let handle = IndexHandle::new(CorpusIndex::build(vec![Document::new("Two Sum", "", "")], &cfg));
        let before = handle.snapshot();

        let previous = handle.replace(CorpusIndex::build(
            vec![Document::new("Word Ladder", "", ""), Document::new("Jump Game", "", "")],
            &cfg,
        ));

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(rank("two sum", &before, 10).len(), 1);
        let after = handle.snapshot();
        assert_eq!(after.len(), 2);
        assert!(rank("two sum", &after, 10).is_empty());
    }
}
