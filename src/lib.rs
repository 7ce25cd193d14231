//! # wordgraph
//!
//! A minimal acyclic word-automaton
//! ([DAWG](https://en.wikipedia.org/wiki/Deterministic_acyclic_finite_state_automaton))
//! engine: ingest a vocabulary, get the smallest deterministic acyclic
//! automaton accepting exactly that vocabulary, and query it — membership,
//! fixed-length wildcard patterns, full enumeration, and anchored
//! cross-context letter lookups — with a compact binary codec for shipping
//! the frozen graph around. Construction follows the incremental
//! sorted-order minimization of [Daciuk et al. (2000)](https://arxiv.org/abs/cs/0007009v1):
//! each new word retires the unshared tail of its predecessor into a
//! canonical registry, so the graph is minimal at every step and building
//! is linear in total letters.
//!
//! ## Features
//!
//! - **Generic over edge labels**: `char`, `u8`, `u16`, or anything
//!   implementing [`Letter`](graph::Letter)
//! - **Minimal and frozen**: suffix sharing is maintained online; the
//!   finished graph is immutable and freely shared across threads
//! - **Single-walk context queries**: the anchored layer answers "which
//!   letters fit between these neighbors" in one traversal
//! - **Self-contained persistence**: serialized graphs reload without a
//!   builder pass and answer queries identically
//!
//! ## Quick start
//!
//! The simplest entry point is [`WordGraph`](graph::WordGraph), which owns
//! its storage:
//!
//! ```
//! use wordgraph::graph::WordGraph;
//!
//! let graph = WordGraph::from_words(["bake", "cake", "fake", "lake"]);
//! assert!(graph.contains("cake"));
//! assert!(!graph.contains("ake"));
//! assert_eq!(graph.pattern_search(".ake").len(), 4);
//! ```
//!
//! For explicit control over allocation (requires the `arena` feature,
//! enabled by default):
//!
//! ```
//! # #[cfg(feature = "arena")] {
//! use wordgraph::graph::{build_graph, Arena};
//!
//! let arena = Arena::new();
//! let root = build_graph(&arena, ["bake", "cake", "fake"]).unwrap();
//! assert!(root.accepts("fake".chars()));
//! # }
//! ```
//!
//! Anchored queries answer letter-in-context questions in one walk:
//!
//! ```
//! use wordgraph::graph::AnchoredGraph;
//!
//! let graph = AnchoredGraph::from_words(["bat", "bet", "bit"]);
//! let fits: Vec<char> = graph.letters_between("b", "t").into_iter().collect();
//! assert_eq!(fits, vec!['a', 'e', 'i']);
//! ```

#![warn(missing_docs)]

/// Core word-graph engine: node model, builder, queries, anchored layer
/// and codec.
pub mod graph;
