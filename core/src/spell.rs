use std::collections::HashMap;

/// Best-effort spelling correction for a single token.
///
/// Returns `None` when the token should be kept as-is.
pub trait Correct: Send + Sync {
    fn correct(&self, token: &str) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoCorrection;

impl Correct for NoCorrection {
    fn correct(&self, _token: &str) -> Option<String> { None }
}

/// Corrects unknown words to the most frequent known word within `max_distance` edits.
///
/// Known words are never rewritten. Among candidates at an allowed distance the
/// one seen most often wins, and equal counts resolve to the lexicographically
/// smallest word, so the result does not depend on map iteration order.
#[derive(Debug, Clone, Default)]
pub struct VocabularyCorrector {
    counts: HashMap<String, u32>,
    max_distance: usize,
}

impl VocabularyCorrector {
    pub fn new(max_distance: usize) -> Self {
        Self { counts: HashMap::new(), max_distance }
    }

    pub fn from_words<I, S>(words: I, max_distance: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut corrector = Self::new(max_distance);
        for word in words {
            corrector.add_word(word.as_ref());
        }
        corrector
    }

    pub fn add_word(&mut self, word: &str) {
        *self.counts.entry(word.to_string()).or_insert(0) += 1;
    }

    pub fn contains(&self, word: &str) -> bool { self.counts.contains_key(word) }

    pub fn len(&self) -> usize { self.counts.len() }

    pub fn is_empty(&self) -> bool { self.counts.is_empty() }
}

impl Correct for VocabularyCorrector {
    fn correct(&self, token: &str) -> Option<String> {
        if self.max_distance == 0 || self.contains(token) {
            return None;
        }
        let token_len = token.chars().count();
        let mut best: Option<(&str, u32)> = None;
        for (word, &count) in &self.counts {
            if word.chars().count().abs_diff(token_len) > self.max_distance {
                continue;
            }
            if strsim::levenshtein(token, word) > self.max_distance {
                continue;
            }
            best = match best {
                Some((current, current_count))
                    if current_count > count || (current_count == count && current <= word.as_str()) =>
                {
                    Some((current, current_count))
                }
                _ => Some((word.as_str(), count)),
            };
        }
        best.map(|(word, _)| word.to_string())
    }
}
