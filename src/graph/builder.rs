use hashbrown::HashSet;
use smallvec::SmallVec;
use thiserror::Error;

#[cfg(feature = "arena")]
use typed_arena::Arena;

use super::letter::Letter;
use super::node::WordNode;

/// Trait for types that can be fed to the builder as one word.
///
/// Implemented for the common string and sequence types so that
/// [`Builder::add_word`] and [`build_graph`] accept them directly.
pub trait IntoWord<L: Letter> {
    /// Collects this word into a letter buffer.
    fn collect_word(self) -> SmallVec<[L; 32]>;
}

// String types → char

impl IntoWord<char> for &str {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.chars().collect()
    }
}

impl IntoWord<char> for &&str {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.chars().collect()
    }
}

impl IntoWord<char> for String {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.chars().collect()
    }
}

impl IntoWord<char> for &String {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.chars().collect()
    }
}

// Generic sequence types → L

impl<L: Letter> IntoWord<L> for &[L] {
    fn collect_word(self) -> SmallVec<[L; 32]> {
        self.iter().copied().collect()
    }
}

impl<L: Letter> IntoWord<L> for Vec<L> {
    fn collect_word(self) -> SmallVec<[L; 32]> {
        self.into_iter().collect()
    }
}

impl<L: Letter> IntoWord<L> for &Vec<L> {
    fn collect_word(self) -> SmallVec<[L; 32]> {
        self.iter().copied().collect()
    }
}

impl<L: Letter, const N: usize> IntoWord<L> for [L; N] {
    fn collect_word(self) -> SmallVec<[L; 32]> {
        self.into_iter().collect()
    }
}

/// Trait for arena-like allocators that can hold graph nodes.
pub(crate) trait NodeAlloc<'g, L: Letter> {
    /// Moves `node` into the allocator and returns a reference with the
    /// allocator's lifetime.
    fn alloc_node(&'g self, node: WordNode<'g, L>) -> &'g WordNode<'g, L>;
}

#[cfg(feature = "arena")]
impl<'g, L: Letter> NodeAlloc<'g, L> for Arena<WordNode<'g, L>> {
    fn alloc_node(&'g self, node: WordNode<'g, L>) -> &'g WordNode<'g, L> {
        self.alloc(node)
    }
}

/// Errors reported by the incremental builder.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError<L: Letter> {
    /// A word was inserted out of lexicographic order. Carries the
    /// previously inserted word and the offending one.
    #[error("words must be inserted in sorted order: {word:?} arrived after {previous:?}")]
    OutOfOrder {
        /// The word inserted immediately before the offending one.
        previous: Vec<L>,
        /// The word that violated the ordering.
        word: Vec<L>,
    },
    /// The graph was already frozen by [`Builder::finish`]; adding or
    /// removing words requires building a new graph from a word list.
    #[error("graph is frozen; build a new graph to change the word set")]
    Frozen,
}

/// One pending edge of the active build path: the label of the edge into
/// `node`, and `node` itself, still exclusively owned and mutable.
struct PathEntry<'g, L: Letter> {
    label: L,
    node: WordNode<'g, L>,
}

/// The core incremental builder, generic over the allocator.
///
/// Words must arrive in lexicographically sorted order (equal consecutive
/// words are ignored). Nodes below the shared-prefix depth are retired into
/// a canonical registry as soon as the next word proves they are complete,
/// which keeps the graph minimal at every step.
pub(crate) struct BuilderCore<'g, L: Letter, A: NodeAlloc<'g, L>> {
    arena: &'g A,
    /// The root while building; `None` once frozen.
    root: Option<WordNode<'g, L>>,
    /// Unretired tail of the most recently inserted word, root end first.
    path: Vec<PathEntry<'g, L>>,
    /// Canonical registry: one representative per structural signature.
    registry: HashSet<&'g WordNode<'g, L>>,
    previous: SmallVec<[L; 32]>,
    words: usize,
    letters: usize,
}

impl<'g, L: Letter, A: NodeAlloc<'g, L>> BuilderCore<'g, L, A> {
    pub(crate) fn new(arena: &'g A) -> Self {
        BuilderCore {
            arena,
            root: Some(WordNode::new(false)),
            path: Vec::new(),
            registry: HashSet::default(),
            previous: SmallVec::new(),
            words: 0,
            letters: 0,
        }
    }

    pub(crate) fn add_word(&mut self, word: impl IntoWord<L>) -> Result<(), BuildError<L>> {
        let word = word.collect_word();
        self.add_word_slice(&word)
    }

    fn add_word_slice(&mut self, word: &[L]) -> Result<(), BuildError<L>> {
        if self.root.is_none() {
            return Err(BuildError::Frozen);
        }
        match word.cmp(&self.previous) {
            std::cmp::Ordering::Less => {
                return Err(BuildError::OutOfOrder {
                    previous: self.previous.to_vec(),
                    word: word.to_vec(),
                })
            }
            // Equal consecutive words are tolerated as no-ops. This also
            // swallows empty words, which the initial sentinel equals.
            std::cmp::Ordering::Equal => return Ok(()),
            std::cmp::Ordering::Greater => {}
        }

        let shared = word
            .iter()
            .zip(&self.previous)
            .take_while(|(a, b)| a == b)
            .count();

        // Everything below the shared prefix belongs to finished words;
        // retire it before growing in a new direction.
        self.retire_to(shared);

        // `word > previous` and `word` is not a prefix of `previous`, so at
        // least one letter remains past the shared prefix.
        self.path.extend(word[shared..].iter().map(|&label| PathEntry {
            label,
            node: WordNode::new(false),
        }));
        self.path
            .last_mut()
            .expect("a strictly greater word extends past the shared prefix")
            .node
            .set_terminal();

        self.previous = word.iter().copied().collect();
        self.words += 1;
        self.letters += word.len();
        Ok(())
    }

    /// Pops path entries down to `keep` triples, interning each popped node
    /// and rewriting its parent edge to the canonical representative. The
    /// sole mechanism that enforces minimality.
    fn retire_to(&mut self, keep: usize) {
        while self.path.len() > keep {
            let entry = self.path.pop().expect("loop guard ensures a tail entry");
            let child = self.intern(entry.node);
            match self.path.last_mut() {
                Some(parent) => parent.node.link(entry.label, child),
                None => self
                    .root
                    .as_mut()
                    .expect("checked unfrozen on entry")
                    .link(entry.label, child),
            }
        }
    }

    /// Returns the canonical node for `node`'s signature, freezing and
    /// registering `node` itself if the signature is new.
    fn intern(&mut self, mut node: WordNode<'g, L>) -> &'g WordNode<'g, L> {
        if let Some(&canonical) = self.registry.get(&node) {
            canonical
        } else {
            node.set_frozen();
            let slot = self.arena.alloc_node(node);
            self.registry.insert(slot);
            slot
        }
    }

    /// Retires the whole remaining path, freezes the root and returns it.
    /// Afterwards every mutating call reports [`BuildError::Frozen`].
    pub(crate) fn finish(&mut self) -> Result<&'g WordNode<'g, L>, BuildError<L>> {
        if self.root.is_none() {
            return Err(BuildError::Frozen);
        }
        self.retire_to(0);
        let root = self.root.take().expect("checked unfrozen above");
        let root = self.intern(root);
        tracing::debug!(
            words = self.words,
            letters = self.letters,
            nodes = self.registry.len(),
            "word graph frozen"
        );
        Ok(root)
    }
}

/// Incremental builder for minimal word graphs over a caller-managed arena.
///
/// Accepts words in lexicographically sorted order and maintains the
/// minimal automaton online: after every insertion no two retired states
/// share a structural signature. Consuming the word list in order makes
/// construction linear in the total number of letters.
///
/// Requires the `arena` feature (enabled by default). [`WordGraph`] offers
/// the same construction without managing an arena.
///
/// [`WordGraph`]: super::frozen::WordGraph
#[cfg(feature = "arena")]
pub struct Builder<'g, L: Letter>(BuilderCore<'g, L, Arena<WordNode<'g, L>>>);

#[cfg(feature = "arena")]
impl<'g, L: Letter> Builder<'g, L> {
    /// Creates a builder allocating nodes from `arena`.
    pub fn new(arena: &'g Arena<WordNode<'g, L>>) -> Self {
        Builder(BuilderCore::new(arena))
    }

    /// Adds a word.
    ///
    /// The word may be any [`IntoWord`] type: `&str`, `String`, `&[u8]`,
    /// `Vec<u8>`, fixed-size arrays, …
    ///
    /// # Errors
    ///
    /// [`BuildError::OutOfOrder`] if `word` sorts before the previously
    /// added word (adding the same word twice in a row is a no-op), and
    /// [`BuildError::Frozen`] after [`finish`](Self::finish).
    pub fn add_word(&mut self, word: impl IntoWord<L>) -> Result<(), BuildError<L>> {
        self.0.add_word(word)
    }

    /// Freezes the graph and returns its root.
    ///
    /// # Errors
    ///
    /// [`BuildError::Frozen`] if the builder was already finished.
    pub fn finish(&mut self) -> Result<&'g WordNode<'g, L>, BuildError<L>> {
        self.0.finish()
    }
}

/// Builds a frozen word graph from sorted words and returns its root.
///
/// # Examples
///
/// ```
/// use wordgraph::graph::{build_graph, Arena};
///
/// let arena = Arena::new();
/// let root = build_graph(&arena, ["bake", "cake", "lake"]).unwrap();
///
/// assert!(root.accepts("cake".chars()));
/// assert!(!root.accepts("ake".chars()));
/// ```
///
/// Byte sequences work the same way:
///
/// ```
/// use wordgraph::graph::{build_graph, Arena};
///
/// let arena = Arena::new();
/// let words: Vec<Vec<u8>> = vec![vec![1, 2, 3], vec![1, 2, 4], vec![2, 3]];
/// let root = build_graph(&arena, words).unwrap();
///
/// assert!(root.accepts([1u8, 2, 4]));
/// assert!(!root.accepts([1u8, 2]));
/// ```
#[cfg(feature = "arena")]
pub fn build_graph<'g, L, W>(
    arena: &'g Arena<WordNode<'g, L>>,
    words: impl IntoIterator<Item = W>,
) -> Result<&'g WordNode<'g, L>, BuildError<L>>
where
    L: Letter,
    W: IntoWord<L>,
{
    let mut builder = Builder::new(arena);
    for word in words {
        builder.add_word(word)?;
    }
    builder.finish()
}

/// Returns true if this word-list line is a comment.
pub(crate) fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Reads a line-oriented word list: one word per line, trimmed and
/// lowercased, with blank lines and `#` comments skipped.
pub(crate) fn read_word_list(mut reader: impl std::io::BufRead) -> std::io::Result<Vec<String>> {
    let mut words = Vec::new();
    // read_line instead of lines() so one buffer serves every line.
    let mut buf = String::with_capacity(80);
    loop {
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let word = buf.trim();
        if !word.is_empty() && !is_comment(word) {
            words.push(word.to_lowercase());
        }
        buf.clear();
    }
    Ok(words)
}

#[cfg(test)]
mod test {
    use super::*;

    #[cfg(feature = "arena")]
    fn order_err(previous: &str, word: &str) -> BuildError<char> {
        BuildError::OutOfOrder {
            previous: previous.chars().collect(),
            word: word.chars().collect(),
        }
    }

    #[cfg(feature = "arena")]
    #[test]
    fn suffix_sharing_keeps_the_graph_small() {
        let arena1 = Arena::new();
        let _ = build_graph(&arena1, ["abcdef"]).unwrap();
        assert_eq!(arena1.len(), "abcdef".len() + 1);

        // Every word below collapses into the suffix chain of the first.
        let arena2 = Arena::new();
        let _ = build_graph(&arena2, ["abcdef", "abdef", "abef", "af"]).unwrap();
        assert_eq!(arena1.len(), arena2.len());
    }

    #[cfg(feature = "arena")]
    #[test]
    fn sorted_words_accepted() {
        let arena = Arena::new();
        assert!(build_graph(&arena, ["alfa", "bravo", "charlie", "delta"]).is_ok());
    }

    #[cfg(feature = "arena")]
    #[test]
    fn every_unsorted_permutation_rejected() {
        use itertools::Itertools;
        const SORTED: [&str; 6] = ["alfa", "bravo", "charlie", "delta", "echo", "foxtrot"];
        let arena = Arena::new();
        let mut sorted_count = 0;
        for wordlist in SORTED.iter().cloned().permutations(SORTED.len()) {
            let is_sorted = wordlist == SORTED;
            let res = build_graph(&arena, &wordlist);
            assert_eq!(res.is_ok(), is_sorted, "{wordlist:?}");
            sorted_count += is_sorted as i32;
        }
        assert_eq!(sorted_count, 1);
    }

    #[cfg(feature = "arena")]
    #[test]
    fn out_of_order_error_names_both_words() {
        let arena = Arena::new();
        let res = build_graph(&arena, ["alfa", "bravo", "delta", "charlie"]);
        assert_eq!(res.unwrap_err(), order_err("delta", "charlie"));

        let arena = Arena::new();
        let res = build_graph(&arena, ["zulu", "alfa"]);
        assert_eq!(res.unwrap_err(), order_err("zulu", "alfa"));
    }

    #[cfg(feature = "arena")]
    #[test]
    fn repeated_word_is_a_no_op() {
        let arena = Arena::new();
        let root =
            build_graph(&arena, ["alfa", "bravo", "bravo", "charlie", "charlie"]).unwrap();
        for word in ["alfa", "bravo", "charlie"] {
            assert!(root.accepts(word.chars()), "{word}");
        }
    }

    #[cfg(feature = "arena")]
    #[test]
    fn empty_words_are_ignored() {
        let arena = Arena::new();
        let root = build_graph(&arena, ["", "", "alfa"]).unwrap();
        assert!(!root.is_terminal());
        assert!(root.accepts("alfa".chars()));
    }

    #[cfg(feature = "arena")]
    #[test]
    fn prefix_inserted_after_extension_is_out_of_order() {
        let arena = Arena::new();
        let res = build_graph(&arena, ["tester", "test"]);
        assert_eq!(res.unwrap_err(), order_err("tester", "test"));
    }

    #[cfg(feature = "arena")]
    #[test]
    fn finish_freezes_the_builder() {
        let arena = Arena::new();
        let mut builder = Builder::new(&arena);
        builder.add_word("alfa").unwrap();
        builder.finish().unwrap();

        assert_eq!(builder.add_word("bravo"), Err(BuildError::Frozen));
        assert!(matches!(builder.finish(), Err(BuildError::Frozen)));
    }

    #[cfg(feature = "arena")]
    #[test]
    fn empty_vocabulary_builds_an_empty_graph() {
        let arena = Arena::new();
        let root = build_graph::<char, &str>(&arena, []).unwrap();
        assert!(!root.is_terminal());
        assert_eq!(root.edge_count(), 0);
    }

    #[cfg(feature = "arena")]
    #[test]
    fn terminal_flags_follow_word_ends() {
        let arena = Arena::new();
        let root = build_graph(&arena, ["test", "tester"]).unwrap();

        let n = root.walk("tes".chars()).unwrap();
        assert!(!n.is_terminal());
        let n = root.walk("test".chars()).unwrap();
        assert!(n.is_terminal());
        let n = root.walk("teste".chars()).unwrap();
        assert!(!n.is_terminal());
        let n = root.walk("tester".chars()).unwrap();
        assert!(n.is_terminal());
        assert!(root.walk("testers".chars()).is_none());
    }

    #[cfg(feature = "arena")]
    #[test]
    fn shared_suffixes_are_one_node() {
        let words = [
            "asuffix",
            "bsuffix",
            "cdesuffix",
            "fffffffsuffix",
            "inbetween",
            "jsuffix",
            "xxsuffix",
        ];
        let arena = Arena::new();
        let root = build_graph(&arena, words).unwrap();
        let suffix_node = root.walk("as".chars()).unwrap();
        for word in words {
            if let Some(prefix_len) = word.len().checked_sub("suffix".len()) {
                if !word.ends_with("suffix") {
                    continue;
                }
                let node = root.walk(word[..prefix_len + 1].chars()).unwrap();
                assert!(std::ptr::eq(node, suffix_node), "{word}");
            }
        }
    }

    #[cfg(feature = "arena")]
    #[test]
    fn generic_labels() {
        let arena = Arena::new();
        let mut builder = Builder::<u8>::new(&arena);
        builder.add_word([1, 2, 3]).unwrap();
        builder.add_word([1, 2, 4]).unwrap();
        builder.add_word([2, 3, 4]).unwrap();
        let root = builder.finish().unwrap();
        assert!(root.accepts([1u8, 2, 3]));
        assert!(root.accepts([2u8, 3, 4]));
        assert!(!root.accepts([1u8, 2, 5]));
        assert!(!root.accepts([1u8, 2]));
    }

    #[test]
    fn comment_lines() {
        assert!(is_comment("# a comment"));
        assert!(is_comment("   # indented comment"));
        assert!(!is_comment("reverberate"));
        assert!(!is_comment(" reverberate"));
    }
}
