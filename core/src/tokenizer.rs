use crate::spell::{Correct, NoCorrection};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref CAMEL_BOUNDARY: Regex = Regex::new(r"(\p{Ll})(\p{Lu})").expect("valid regex");
    static ref LETTER_DIGIT: Regex = Regex::new(r"([a-z])([0-9])").expect("valid regex");
    static ref DIGIT_LETTER: Regex = Regex::new(r"([0-9])([a-z])").expect("valid regex");
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9\s]+").expect("valid regex");
    static ref DEFAULT_NORMALIZER: Normalizer = Normalizer::default();
    static ref STOPWORDS: HashSet<&'static str> = {
        // Apostrophes are stripped before this filter runs, so contractions only survive as fragments.
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could","couldn",
            "did","didn","do","does","doesn","doing","don","down","during",
            "each","few","for","from","further",
            "had","hadn","has","hasn","have","haven","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","isn","it","its","itself",
            "let","me","more","most","mustn","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","shouldn","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn","we","were","weren","what","when","where","which","while","who","whom","why","with","won","would","wouldn",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
    static ref ABBREVIATIONS: HashMap<&'static str, &'static [&'static str]> = {
        let table: &[(&str, &[&str])] = &[
            ("dp", &["dynamic", "programming", "memoization", "tabulation"]),
            ("bfs", &["breadth", "first", "search", "level", "order"]),
            ("dfs", &["depth", "first", "search", "preorder", "postorder"]),
            ("bst", &["binary", "search", "tree"]),
            ("ll", &["linked", "list"]),
            ("lca", &["lowest", "common", "ancestor"]),
            ("gcd", &["greatest", "common", "divisor"]),
            ("lcm", &["least", "common", "multiple"]),
            ("mst", &["minimum", "spanning", "tree"]),
            ("dag", &["directed", "acyclic", "graph"]),
        ];
        table.iter().copied().collect()
    };
}

/// Splits raw text into lowercase word tokens.
pub trait Tokenize: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Reduces a token to its root form.
pub trait Stem: Send + Sync {
    fn stem(&self, token: &str) -> String;
}

/// Case, digit and punctuation boundary splitter.
///
/// Text is NFKC-normalized first, then camelCase boundaries are split on the
/// original casing (`maxSum` -> `max sum`) before everything is lowercased.
/// Letter/digit boundaries are split in both directions and any character
/// outside `[a-z0-9]` becomes a separator.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundaryTokenizer;

impl Tokenize for BoundaryTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let folded = text.nfkc().collect::<String>();
        let split = CAMEL_BOUNDARY.replace_all(&folded, "${1} ${2}").to_lowercase();
        let split = LETTER_DIGIT.replace_all(&split, "${1} ${2}");
        let split = DIGIT_LETTER.replace_all(&split, "${1} ${2}");
        let cleaned = NON_ALNUM.replace_all(&split, " ");
        cleaned.split_whitespace().map(str::to_string).collect()
    }
}

/// English Snowball (Porter2) stemmer.
pub struct PorterStemmer(Stemmer);

impl Default for PorterStemmer {
    fn default() -> Self {
        Self(Stemmer::create(Algorithm::English))
    }
}

impl Stem for PorterStemmer {
    fn stem(&self, token: &str) -> String {
        self.0.stem(token).into_owned()
    }
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Numbers are kept at any length so that titles like "2Sum" and "3Sum" stay distinguishable.
fn keep_word(token: &str) -> bool {
    (token.len() > 1 || is_numeric(token)) && !is_stopword(token)
}

/// Trailing `s` removal, applied after stemming. Stems that naturally end in
/// `s` lose it too ("class" -> "clas"); both index and query side see the same result.
fn depluralize(mut token: String) -> String {
    if token.len() > 3 && token.ends_with('s') {
        token.pop();
    }
    token
}

/// The full text normalization pipeline shared by indexing and querying.
///
/// Order: boundary tokenization, abbreviation expansion, stopword and length
/// filtering, spelling correction (tokens longer than three characters that are
/// not numbers), stemming, then depluralization.
///
/// Re-normalizing output is stable except for tokens whose stem ends in `s`:
/// depluralization strips one more letter on every pass ("class" -> "clas" ->
/// "cla"). Indexing and querying each normalize raw text exactly once, so both
/// sides still agree.
pub struct Normalizer {
    tokenizer: Box<dyn Tokenize>,
    corrector: Box<dyn Correct>,
    stemmer: Box<dyn Stem>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(BoundaryTokenizer, NoCorrection, PorterStemmer::default())
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer").finish_non_exhaustive()
    }
}

impl Normalizer {
    pub fn new(
        tokenizer: impl Tokenize + 'static,
        corrector: impl Correct + 'static,
        stemmer: impl Stem + 'static,
    ) -> Self {
        Self { tokenizer: Box::new(tokenizer), corrector: Box::new(corrector), stemmer: Box::new(stemmer) }
    }

    pub fn with_corrector(mut self, corrector: impl Correct + 'static) -> Self {
        self.corrector = Box::new(corrector);
        self
    }

    pub fn with_stemmer(mut self, stemmer: impl Stem + 'static) -> Self {
        self.stemmer = Box::new(stemmer);
        self
    }

    /// Words after expansion and filtering, before correction and stemming.
    /// This is the vocabulary a spelling corrector is trained on.
    pub fn words(&self, text: &str) -> Vec<String> {
        let mut words = Vec::new();
        for raw in self.tokenizer.tokenize(text) {
            match ABBREVIATIONS.get(raw.as_str()) {
                Some(expansion) => words.extend(expansion.iter().map(|w| w.to_string())),
                None => words.push(raw),
            }
        }
        words.retain(|w| keep_word(w));
        words
    }

    pub fn normalize(&self, text: &str) -> Vec<String> {
        self.words(text)
            .into_iter()
            .map(|word| {
                let word = if word.len() > 3 && !is_numeric(&word) {
                    self.corrector.correct(&word).unwrap_or(word)
                } else {
                    word
                };
                depluralize(self.stemmer.stem(&word))
            })
            .collect()
    }
}

/// Normalize with the default pipeline and no spelling correction.
pub fn normalize(text: &str) -> Vec<String> {
    DEFAULT_NORMALIZER.normalize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem(word: &str) -> String {
        PorterStemmer::default().stem(word)
    }

    #[test]
    fn splits_camel_case_before_lowercasing() {
        let toks = BoundaryTokenizer.tokenize("maxSubArray");
        assert_eq!(toks, vec!["max", "sub", "array"]);
    }

    #[test]
    fn splits_letter_digit_boundaries() {
        assert_eq!(BoundaryTokenizer.tokenize("a1b"), vec!["a", "1", "b"]);
        assert_eq!(BoundaryTokenizer.tokenize("3sum k2"), vec!["3", "sum", "k", "2"]);
    }

    #[test]
    fn punctuation_becomes_separator() {
        assert_eq!(BoundaryTokenizer.tokenize("sub-array, (sorted)!"), vec!["sub", "array", "sorted"]);
    }

    #[test]
    fn fullwidth_digits_fold() {
        assert_eq!(BoundaryTokenizer.tokenize("２Ｓｕｍ"), vec!["2", "sum"]);
    }

    #[test]
    fn two_sum_yields_number_and_stem() {
        assert_eq!(normalize("2Sum"), vec!["2".to_string(), stem("sum")]);
    }

    #[test]
    fn expands_abbreviations() {
        let toks = normalize("dp problem");
        assert!(toks.contains(&stem("dynamic")));
        assert!(toks.contains(&stem("programming")));
        assert!(toks.contains(&stem("memoization")));
        assert!(toks.contains(&stem("tabulation")));
        assert!(!toks.iter().any(|t| t == "dp"));
    }

    #[test]
    fn expansion_keeps_order() {
        let words = Normalizer::default().words("LCA query");
        assert_eq!(words, vec!["lowest", "common", "ancestor", "query"]);
    }

    #[test]
    fn drops_stopwords_and_single_letters() {
        let words = Normalizer::default().words("Find the x in a tree");
        assert_eq!(words, vec!["find", "tree"]);
    }

    #[test]
    fn empty_input() {
        assert!(normalize("").is_empty());
        assert!(normalize("  \t ").is_empty());
        assert!(normalize("the of !!").is_empty());
    }

    #[test]
    fn depluralizes_after_stemming() {
        assert_eq!(depluralize("class".to_string()), "clas");
        assert_eq!(depluralize("bus".to_string()), "bus");
        assert_eq!(normalize("trees"), vec!["tree"]);
    }

    #[test]
    fn renormalizing_is_stable_unless_stem_ends_in_s() {
        let vocabulary = [
            "binary", "search", "trees", "dynamic", "programming", "graph", "sorted", "arrays",
            "class", "process", "address", "access",
        ];
        for word in vocabulary {
            let first = normalize(word);
            let second = normalize(&first.join(" "));
            if first.iter().all(|t| !t.ends_with('s')) {
                assert_eq!(first, second, "{word}");
            } else {
                assert_ne!(first, second, "{word}");
            }
        }
    }

    #[test]
    fn double_s_stems_drift_on_renormalization() {
        for (word, once, twice) in [
            ("class", "clas", "cla"),
            ("process", "proces", "proce"),
            ("address", "addres", "addr"),
            ("access", "acces", "acc"),
        ] {
            let first = normalize(word);
            assert_eq!(first, vec![once], "{word}");
            assert_eq!(normalize(once), vec![twice], "{word}");
        }
    }
}
