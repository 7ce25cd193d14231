//! Anchored cross-context queries over a doubled alphabet.
//!
//! The recurring question in placement search is "which letters make
//! `left + L + right` a word" for a fixed pair of neighbor contexts. A
//! plain word graph answers it with one walk per candidate letter and a
//! prefix re-derivation each time. This layer instead stores, for every
//! word and every split point, the variant `suffix + reverse(prefix)` with
//! the reversed half uppercased, so the whole question becomes a single
//! walk — and "enumerate every legal letter" a single one-wildcard pattern
//! search.
//!
//! All five variants of `"apple"`:
//!
//! ```text
//! split 0:  apple
//! split 1:  ppleA
//! split 2:  plePA
//! split 3:  lePPA
//! split 4:  eLPPA
//! ```
//!
//! (word, split) ↔ variant is a bijection over the doubled alphabet, so
//! variant membership decides word membership in context; nothing ever
//! needs decoding back.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use super::builder::read_word_list;
use super::frozen::WordGraph;

/// A word graph over anchored variants of a lowercase vocabulary.
///
/// Words are ASCII lowercase; the uppercase letters are reserved as the
/// reversed-prefix half of the doubled alphabet. A vocabulary of n total
/// letters stores n variants.
///
/// # Examples
///
/// ```
/// use wordgraph::graph::AnchoredGraph;
///
/// let graph = AnchoredGraph::from_words(["cat", "cart"]);
/// assert!(graph.contains("cart"));
///
/// // Which letters fit between a "c" on the left and a "t" on the right?
/// let fits: Vec<char> = graph.letters_between("c", "t").into_iter().collect();
/// assert_eq!(fits, vec!['a']);
/// ```
pub struct AnchoredGraph {
    inner: WordGraph<char>,
}

/// The anchored variant of `word` split at `split`: the suffix from
/// `split` on, then the prefix before it reversed and uppercased.
fn variant(word: &str, split: usize) -> String {
    let mut out = String::with_capacity(word.len());
    out.extend(word.chars().skip(split));
    out.extend(
        word.chars()
            .take(split)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|ch| ch.to_ascii_uppercase()),
    );
    out
}

/// Yields the anchored variants of `word`, one per split point. A word of
/// length n has n variants; split 0 is the word itself.
pub fn variants(word: &str) -> impl Iterator<Item = String> + '_ {
    (0..word.chars().count()).map(|split| variant(word, split))
}

impl AnchoredGraph {
    /// Builds the anchored graph for a vocabulary, in any order.
    ///
    /// Words are lowercased; every word is expanded to all of its
    /// variants, and the variants are sorted and fed through one ordinary
    /// builder run.
    pub fn from_words<S: AsRef<str>>(words: impl IntoIterator<Item = S>) -> Self {
        let mut all: Vec<String> = words
            .into_iter()
            .flat_map(|word| {
                let word = word.as_ref().to_lowercase();
                variants(&word).collect::<Vec<_>>()
            })
            .collect();
        all.sort();
        all.dedup();
        let inner = WordGraph::from_sorted_words(all)
            .expect("sorted, deduplicated variants are always in order");
        AnchoredGraph { inner }
    }

    /// Builds the anchored graph from a line-oriented word list, with the
    /// same line handling as [`WordGraph::from_word_reader`].
    pub fn from_word_reader(reader: impl BufRead) -> io::Result<Self> {
        Ok(Self::from_words(read_word_list(reader)?))
    }

    /// Builds the anchored graph from a word-list file.
    pub fn from_word_file(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::from_word_reader(BufReader::new(File::open(path)?))
    }

    /// True iff `word` is in the vocabulary (its split-0 variant is the
    /// word itself).
    pub fn contains(&self, word: &str) -> bool {
        self.inner.contains(word.to_lowercase())
    }

    /// True iff `left + letter + right` is a word.
    ///
    /// `left` is given in reading order (the letter adjacent to the
    /// anchor last); `right` likewise (adjacent letter first). One walk,
    /// regardless of how the contexts are shared across candidate
    /// letters.
    pub fn accepts_between(&self, left: &str, letter: char, right: &str) -> bool {
        self.inner.contains(Self::probe(left, letter, right))
    }

    /// Every letter L such that `left + L + right` is a word, via a
    /// single one-wildcard pattern search.
    pub fn letters_between(&self, left: &str, right: &str) -> BTreeSet<char> {
        let pattern = Self::probe(left, WordGraph::<char>::WILDCARD, right);
        self.inner
            .pattern_search(&pattern)
            .into_iter()
            .filter_map(|hit| hit.chars().next())
            .collect()
    }

    /// Node count of the underlying variant graph.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// The variant that decides `left + letter + right`: split just after
    /// `letter`, i.e. `letter + right + reverse(left)` uppercased.
    fn probe(left: &str, letter: char, right: &str) -> String {
        let mut out = String::with_capacity(left.len() + right.len() + 1);
        out.push(letter);
        out.extend(right.to_lowercase().chars());
        out.extend(
            left.to_lowercase()
                .chars()
                .rev()
                .map(|ch| ch.to_ascii_uppercase()),
        );
        out
    }
}

impl std::fmt::Debug for AnchoredGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchoredGraph")
            .field("node_count", &self.node_count())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn the_five_variants_of_apple() {
        let expanded: Vec<String> = variants("apple").collect();
        assert_eq!(expanded, vec!["apple", "ppleA", "plePA", "lePPA", "eLPPA"]);
    }

    #[test]
    fn single_word_anchor_query() {
        let graph = AnchoredGraph::from_words(["cat"]);
        let letters: Vec<char> = graph.letters_between("c", "t").into_iter().collect();
        assert_eq!(letters, vec!['a']);
    }

    #[test]
    fn membership_is_the_split_zero_variant() {
        let graph = AnchoredGraph::from_words(["cat", "cart"]);
        assert!(graph.contains("cat"));
        assert!(graph.contains("CART"));
        assert!(!graph.contains("car"));
        assert!(!graph.contains("at"));
    }

    #[test]
    fn accepts_between_every_split_of_a_word() {
        let graph = AnchoredGraph::from_words(["apple"]);
        assert!(graph.accepts_between("", 'a', "pple"));
        assert!(graph.accepts_between("a", 'p', "ple"));
        assert!(graph.accepts_between("ap", 'p', "le"));
        assert!(graph.accepts_between("app", 'l', "e"));
        assert!(graph.accepts_between("appl", 'e', ""));
        assert!(!graph.accepts_between("appl", 'y', ""));
        assert!(!graph.accepts_between("a", 'p', "le"));
    }

    #[test]
    fn letters_collect_across_words() {
        let graph = AnchoredGraph::from_words(["bat", "bet", "bit", "but", "bad"]);
        let letters: Vec<char> = graph.letters_between("b", "t").into_iter().collect();
        assert_eq!(letters, vec!['a', 'e', 'i', 'u']);
    }

    #[test]
    fn empty_left_context_finds_first_letters() {
        let graph = AnchoredGraph::from_words(["cat", "bat"]);
        let letters: Vec<char> = graph.letters_between("", "at").into_iter().collect();
        assert_eq!(letters, vec!['b', 'c']);
    }

    #[test]
    fn empty_right_context_finds_last_letters() {
        let graph = AnchoredGraph::from_words(["car", "cat"]);
        let letters: Vec<char> = graph.letters_between("ca", "").into_iter().collect();
        assert_eq!(letters, vec!['r', 't']);
    }

    #[test]
    fn both_contexts_empty_finds_one_letter_words() {
        let graph = AnchoredGraph::from_words(["a", "i", "cat"]);
        let letters: Vec<char> = graph.letters_between("", "").into_iter().collect();
        assert_eq!(letters, vec!['a', 'i']);
    }

    #[test]
    fn no_anchor_fits() {
        let graph = AnchoredGraph::from_words(["cat"]);
        assert!(graph.letters_between("x", "t").is_empty());
        assert!(graph.letters_between("c", "ts").is_empty());
    }

    #[test]
    fn reader_intake() {
        let text = "# fixture\ncat\nbat\n";
        let graph = AnchoredGraph::from_word_reader(std::io::Cursor::new(text)).unwrap();
        let letters: Vec<char> = graph.letters_between("", "at").into_iter().collect();
        assert_eq!(letters, vec!['b', 'c']);
    }

    #[test]
    fn input_is_lowercased_before_expansion() {
        let graph = AnchoredGraph::from_words(["CaT"]);
        assert!(graph.contains("cat"));
        let letters: Vec<char> = graph.letters_between("c", "t").into_iter().collect();
        assert_eq!(letters, vec!['a']);
    }
}
