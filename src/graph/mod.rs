/// Anchored (suffix + reversed-prefix) cross-context query layer.
pub mod anchored;
/// Incremental builder for minimal word graphs from sorted word lists.
pub mod builder;
/// Binary codec for frozen graphs.
pub mod codec;
/// Owned frozen graph with query, rebuild and codec front ends.
pub mod frozen;
/// Edge-label trait.
pub mod letter;
/// Graph nodes and their edge tables.
pub mod node;
/// Internal chunked arena allocator.
pub(crate) mod node_arena;
/// Enumeration and wildcard search over frozen graphs.
pub mod query;

pub use anchored::AnchoredGraph;
#[cfg(feature = "arena")]
pub use builder::{build_graph, Builder};
pub use builder::{BuildError, IntoWord};
pub use codec::{CodecError, LetterCode};
pub use frozen::WordGraph;
pub use letter::Letter;
pub use node::WordNode;
pub use query::{pattern_search, words, Words};

/// Re-export of `typed_arena::Arena` for the arena-based builder API.
#[cfg(feature = "arena")]
pub use typed_arena::Arena;

#[cfg(test)]
mod test {
    use super::WordGraph;
    use std::io::Cursor;

    const WORDLIST: &str = "\
# small fixture, deliberately unsorted
lake
bake
cake
bake
baked
";

    #[test]
    fn reader_to_queries_to_codec() {
        let graph = WordGraph::from_word_reader(Cursor::new(WORDLIST)).unwrap();

        for word in ["bake", "baked", "cake", "lake"] {
            assert!(graph.contains(word), "{word}");
        }
        assert!(!graph.contains("bak"));
        assert_eq!(graph.pattern_search(".ake"), vec!["bake", "cake", "lake"]);

        let restored = WordGraph::from_bytes(&graph.to_bytes()).unwrap();
        assert_eq!(restored.pattern_search(".ake"), vec!["bake", "cake", "lake"]);
        assert_eq!(restored.node_count(), graph.node_count());
    }

    #[test]
    fn rebuild_round_trip_after_codec_load() {
        let graph = WordGraph::from_word_reader(Cursor::new(WORDLIST)).unwrap();
        let mut restored = WordGraph::from_bytes(&graph.to_bytes()).unwrap();

        assert!(restored.add_word("fake"));
        assert!(restored.contains("fake"));
        assert!(restored.remove_word("fake"));

        let before: Vec<Vec<char>> = graph.words().collect();
        let after: Vec<Vec<char>> = restored.words().collect();
        assert_eq!(before, after);
    }
}
