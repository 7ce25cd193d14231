use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use hashbrown::HashSet;

use super::builder::{read_word_list, BuildError, BuilderCore, IntoWord};
use super::codec::{self, CodecError, LetterCode};
use super::letter::Letter;
use super::node::WordNode;
use super::node_arena::NodeArena;
use super::query::{self, Words};

/// A self-contained frozen word graph that owns its node storage.
///
/// Unlike the arena-based [`Builder`](super::builder::Builder) API, where
/// the caller manages an external arena, `WordGraph` allocates internally
/// and can be freely moved and stored. It is frozen from the moment it
/// exists: every query method takes `&self` and mutates nothing, so a
/// graph can be shared across any number of threads without locking.
///
/// Changing the word set means building a replacement graph:
/// [`add_word`](WordGraph::add_word) and
/// [`remove_word`](WordGraph::remove_word) extract the word list, splice
/// it, rebuild, and swap — O(vocabulary), by design. Readers in other
/// threads keep the graph alive by holding it in an `Arc` and swapping
/// the handle.
///
/// # Examples
///
/// ```
/// use wordgraph::graph::WordGraph;
///
/// let graph = WordGraph::from_words(["cake", "bake", "lake"]);
/// assert!(graph.contains("bake"));
/// assert!(!graph.contains("ake"));
///
/// let all: Vec<String> = graph.words().map(|w| w.into_iter().collect()).collect();
/// assert_eq!(all, vec!["bake", "cake", "lake"]);
/// ```
pub struct WordGraph<L: Letter + 'static> {
    // SAFETY: `root` points into `arena`'s heap chunks, which never move
    // and live exactly as long as this struct. All references handed out
    // are re-bounded to `&self` in `root()`.
    arena: NodeArena<WordNode<'static, L>>,
    root: *const WordNode<'static, L>,
}

// SAFETY: the graph is frozen — no method mutates a node or the arena
// after construction — and access to the raw pointer is mediated by
// `&self`/`&mut self` borrows. Rebuild operations replace the arena and
// pointer together under `&mut self`.
unsafe impl<L: Letter + 'static> Send for WordGraph<L> {}
unsafe impl<L: Letter + 'static> Sync for WordGraph<L> {}

/// Creates a builder whose lifetime parameter is `'static` from a borrowed
/// arena.
///
/// # Safety
///
/// The caller must consume the builder before returning and move `arena`
/// into a [`WordGraph`] together with the resulting root pointer, so the
/// forged `'static` references never outlive the arena.
unsafe fn make_builder<L: Letter + 'static>(
    arena: &NodeArena<WordNode<'static, L>>,
) -> BuilderCore<'static, L, NodeArena<WordNode<'static, L>>> {
    let arena_ref: &'static NodeArena<WordNode<'static, L>> =
        &*(arena as *const NodeArena<WordNode<'static, L>>);
    BuilderCore::new(arena_ref)
}

impl<L: Letter + 'static> WordGraph<L> {
    /// Builds a graph from words in lexicographically sorted order.
    ///
    /// Equal consecutive words are tolerated; a word sorting before its
    /// predecessor is reported as [`BuildError::OutOfOrder`].
    ///
    /// # Examples
    ///
    /// ```
    /// use wordgraph::graph::WordGraph;
    ///
    /// let graph = WordGraph::from_sorted_words(["apple", "banana"]).unwrap();
    /// assert!(graph.contains("banana"));
    ///
    /// assert!(WordGraph::<char>::from_sorted_words(["banana", "apple"]).is_err());
    /// ```
    pub fn from_sorted_words<W>(words: impl IntoIterator<Item = W>) -> Result<Self, BuildError<L>>
    where
        W: IntoWord<L>,
    {
        let arena: NodeArena<WordNode<'static, L>> = NodeArena::new();

        // SAFETY: the builder is consumed inside this block and the arena
        // moves into the returned graph alongside the root pointer.
        let root = unsafe {
            let mut builder = make_builder(&arena);
            for word in words {
                builder.add_word(word)?;
            }
            builder.finish()? as *const WordNode<'static, L>
        };

        Ok(WordGraph { arena, root })
    }

    /// Builds a graph from words in any order, sorting and deduplicating
    /// first.
    pub fn from_words<W>(words: impl IntoIterator<Item = W>) -> Self
    where
        W: IntoWord<L>,
    {
        let mut words: Vec<_> = words.into_iter().map(IntoWord::collect_word).collect();
        words.sort();
        words.dedup();
        Self::from_sorted_words(words.into_iter().map(|w| w.into_vec()))
            .expect("sorted, deduplicated input is always in order")
    }

    pub(crate) fn from_raw_parts(
        arena: NodeArena<WordNode<'static, L>>,
        root: *const WordNode<'static, L>,
    ) -> Self {
        WordGraph { arena, root }
    }

    /// Returns the root node for direct traversal with the
    /// [`WordNode`] API.
    pub fn root(&self) -> &WordNode<'_, L> {
        // SAFETY: the pointee lives in our own arena; `WordNode` is
        // covariant in its lifetime, so `'static` shortens to the borrow
        // of `self`.
        unsafe { &*self.root }
    }

    /// True iff `word` is in the accepted set. One walk, no allocation
    /// beyond collecting the word itself.
    pub fn contains(&self, word: impl IntoWord<L>) -> bool {
        self.root().accepts(word.collect_word())
    }

    /// True iff some accepted word starts with `prefix`.
    pub fn contains_prefix(&self, prefix: impl IntoWord<L>) -> bool {
        self.root().walk(prefix.collect_word()).is_some()
    }

    /// Lazily enumerates every accepted word in lexicographic order.
    ///
    /// Each call starts a fresh traversal; two passes over the same graph
    /// yield identical sequences.
    pub fn words(&self) -> Words<'_, L> {
        query::words(self.root())
    }

    /// Number of unique nodes.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Number of edges, counting each shared node's edges once.
    pub fn edge_count(&self) -> usize {
        let mut seen = HashSet::new();
        let mut stack = vec![self.root()];
        let mut edges = 0;
        while let Some(node) = stack.pop() {
            if !seen.insert(node as *const WordNode<L>) {
                continue;
            }
            edges += node.edge_count();
            for (_, child) in node.edges() {
                stack.push(child);
            }
        }
        edges
    }

    /// Adds a word by rebuilding the graph around it. Returns `false` if
    /// the word was already present (or empty), `true` otherwise.
    ///
    /// Cost is O(vocabulary): the accepted set is extracted, spliced and
    /// rebuilt through a fresh builder. The frozen graph itself is never
    /// patched in place.
    pub fn add_word(&mut self, word: impl IntoWord<L>) -> bool {
        let word = word.collect_word().into_vec();
        if word.is_empty() {
            return false;
        }
        let mut list: Vec<Vec<L>> = self.words().collect();
        let pos = match list.binary_search(&word) {
            Ok(_) => return false,
            Err(pos) => pos,
        };
        list.insert(pos, word);
        *self = Self::from_sorted_words(list).expect("extracted word list stays sorted");
        true
    }

    /// Removes a word by rebuilding the graph without it. Returns `false`
    /// if the word was not present. Same O(vocabulary) cost as
    /// [`add_word`](WordGraph::add_word).
    pub fn remove_word(&mut self, word: impl IntoWord<L>) -> bool {
        let word = word.collect_word().into_vec();
        let mut list: Vec<Vec<L>> = self.words().collect();
        match list.binary_search(&word) {
            Ok(pos) => {
                list.remove(pos);
                *self = Self::from_sorted_words(list).expect("extracted word list stays sorted");
                true
            }
            Err(_) => false,
        }
    }
}

impl<L: LetterCode + 'static> WordGraph<L> {
    /// Serializes the graph to its compact binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::serialize(self)
    }

    /// Reconstructs a graph from [`to_bytes`](WordGraph::to_bytes) output
    /// without re-running the builder. The result answers every query
    /// identically to the graph that was serialized.
    ///
    /// # Errors
    ///
    /// [`CodecError`] describing the offending offset and field if the
    /// bytes are malformed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::deserialize(bytes)
    }
}

impl WordGraph<char> {
    /// Single-letter wildcard recognized by
    /// [`pattern_search`](WordGraph::pattern_search).
    pub const WILDCARD: char = '.';

    /// Collects every accepted word matching `pattern`, where
    /// [`WILDCARD`](Self::WILDCARD) (`.`) matches any single letter and
    /// every other character only itself.
    ///
    /// Words match only at exactly the pattern's length; patterns that
    /// cannot match anything yield an empty vec rather than an error. The
    /// result is sorted and duplicate-free.
    ///
    /// # Examples
    ///
    /// ```
    /// use wordgraph::graph::WordGraph;
    ///
    /// let graph = WordGraph::from_words(["bat", "can", "car", "cat"]);
    /// assert_eq!(graph.pattern_search("ca."), vec!["can", "car", "cat"]);
    /// assert_eq!(graph.pattern_search("..t"), vec!["bat", "cat"]);
    /// assert!(graph.pattern_search("ca").is_empty());
    /// ```
    pub fn pattern_search(&self, pattern: &str) -> Vec<String> {
        let pattern: Vec<Option<char>> = pattern
            .chars()
            .map(|ch| (ch != Self::WILDCARD).then_some(ch))
            .collect();
        query::pattern_search(self.root(), &pattern)
            .into_iter()
            .map(|word| word.into_iter().collect())
            .collect()
    }

    /// Builds a graph from a line-oriented word list.
    ///
    /// One word per line; surrounding whitespace is trimmed, words are
    /// lowercased, blank lines and lines starting with `#` are skipped.
    /// The list does not need to be sorted.
    pub fn from_word_reader(reader: impl BufRead) -> io::Result<Self> {
        Ok(Self::from_words(read_word_list(reader)?))
    }

    /// Builds a graph from a word-list file, with the same line handling
    /// as [`from_word_reader`](WordGraph::from_word_reader).
    pub fn from_word_file(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::from_word_reader(BufReader::new(File::open(path)?))
    }
}

impl<L: Letter + 'static> std::fmt::Debug for WordGraph<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordGraph")
            .field("node_count", &self.node_count())
            .finish()
    }
}
