//! Read-only queries over a frozen graph: lazy enumeration of the accepted
//! set and fixed-length wildcard search.

use super::letter::Letter;
use super::node::{EdgeIter, WordNode};

/// Lazy depth-first enumeration of every accepted word, in lexicographic
/// order (a word precedes its extensions, siblings follow label order).
///
/// Created by [`words`]; each call starts a fresh traversal, so the same
/// frozen graph always yields the same sequence.
pub struct Words<'g, L: Letter> {
    start: Option<&'g WordNode<'g, L>>,
    stack: Vec<EdgeIter<'g, L>>,
    prefix: Vec<L>,
}

/// Enumerates every word accepted from `root`.
pub fn words<'g, L: Letter>(root: &'g WordNode<'g, L>) -> Words<'g, L> {
    Words {
        start: Some(root),
        stack: Vec::new(),
        prefix: Vec::new(),
    }
}

impl<'g, L: Letter> Iterator for Words<'g, L> {
    type Item = Vec<L>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.start.take() {
            self.stack.push(root.edges());
            if root.is_terminal() {
                return Some(Vec::new());
            }
        }
        while let Some(edges) = self.stack.last_mut() {
            match edges.next() {
                Some((label, child)) => {
                    self.prefix.push(label);
                    self.stack.push(child.edges());
                    if child.is_terminal() {
                        return Some(self.prefix.clone());
                    }
                }
                None => {
                    self.stack.pop();
                    self.prefix.pop();
                }
            }
        }
        None
    }
}

/// Collects every accepted word that matches `pattern`, where `None` is a
/// single-letter wildcard and `Some(l)` matches exactly `l`.
///
/// A word matches only if its length equals the pattern length; there are
/// no variable-length wildcards. Patterns that cannot match anything
/// (including the empty pattern) simply produce an empty vec. The result
/// is sorted and free of duplicates.
pub fn pattern_search<'g, L: Letter>(
    root: &'g WordNode<'g, L>,
    pattern: &[Option<L>],
) -> Vec<Vec<L>> {
    let mut results = Vec::new();
    let mut prefix = Vec::with_capacity(pattern.len());
    descend(root, pattern, &mut prefix, &mut results);
    // Depth-first over sorted edge tables already yields sorted output;
    // keep the contract explicit and independent of traversal order.
    results.sort();
    results.dedup();
    results
}

fn descend<'g, L: Letter>(
    node: &'g WordNode<'g, L>,
    pattern: &[Option<L>],
    prefix: &mut Vec<L>,
    results: &mut Vec<Vec<L>>,
) {
    match pattern.split_first() {
        None => {
            if node.is_terminal() && !prefix.is_empty() {
                results.push(prefix.clone());
            }
        }
        Some((&Some(letter), rest)) => {
            if let Some(child) = node.get(letter) {
                prefix.push(letter);
                descend(child, rest, prefix, results);
                prefix.pop();
            }
        }
        Some((&None, rest)) => {
            for (letter, child) in node.edges() {
                prefix.push(letter);
                descend(child, rest, prefix, results);
                prefix.pop();
            }
        }
    }
}
