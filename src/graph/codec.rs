//! Compact binary codec for frozen word graphs.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! magic  b"wgf\n"        4 bytes
//! version                u8
//! node count             u32
//! root id                u32
//! node record * count, in dense post-order (children before parents):
//!     flags              u8   (bit 0: terminal)
//!     out-degree         u32
//!     edge * out-degree: label code u32, child id u32
//! ```
//!
//! Shared nodes are written exactly once; edges reference them by id.
//! Because ids are assigned in post-order, every child id is strictly
//! smaller than its parent's id, which is what lets [`deserialize`]
//! rebuild the graph in one forward pass — and reject any byte stream
//! that could not have come from an acyclic graph.

use hashbrown::HashMap;
use thiserror::Error;

use super::frozen::WordGraph;
use super::letter::Letter;
use super::node::WordNode;
use super::node_arena::NodeArena;

const MAGIC: [u8; 4] = *b"wgf\n";
const VERSION: u8 = 1;

/// Letters that can cross the codec boundary as a `u32` code.
///
/// `encode`/`decode` must round-trip: `decode(encode(l)) == Some(l)`.
pub trait LetterCode: Letter {
    /// This letter's wire code.
    fn encode(self) -> u32;
    /// The letter for `code`, if `code` is valid.
    fn decode(code: u32) -> Option<Self>;
}

impl LetterCode for char {
    fn encode(self) -> u32 {
        self as u32
    }
    fn decode(code: u32) -> Option<Self> {
        char::from_u32(code)
    }
}

impl LetterCode for u8 {
    fn encode(self) -> u32 {
        self.into()
    }
    fn decode(code: u32) -> Option<Self> {
        code.try_into().ok()
    }
}

impl LetterCode for u16 {
    fn encode(self) -> u32 {
        self.into()
    }
    fn decode(code: u32) -> Option<Self> {
        code.try_into().ok()
    }
}

impl LetterCode for u32 {
    fn encode(self) -> u32 {
        self
    }
    fn decode(code: u32) -> Option<Self> {
        Some(code)
    }
}

/// Failures while decoding a serialized graph. Every variant names the
/// byte offset (and field) that proved the data corrupt.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// The stream does not start with the word-graph magic bytes.
    #[error("bad magic at offset 0: not a serialized word graph")]
    BadMagic,
    /// The format version is newer than this library understands.
    #[error("unsupported format version {version} at offset 4")]
    UnsupportedVersion {
        /// The version byte found in the stream.
        version: u8,
    },
    /// The stream ended in the middle of a field.
    #[error("truncated stream: {field} at offset {offset} needs {needs} more bytes")]
    Truncated {
        /// Byte offset where the field starts.
        offset: usize,
        /// Name of the field being read.
        field: &'static str,
        /// How many bytes were missing.
        needs: usize,
    },
    /// The declared node count cannot fit in the remaining bytes.
    #[error("node count {count} at offset 5 exceeds the remaining stream")]
    ImplausibleNodeCount {
        /// The declared node count.
        count: u32,
    },
    /// An edge referenced a node at or above its parent, which no
    /// post-order encoding of an acyclic graph can produce.
    #[error("edge at offset {offset} in node {node} references child {child}, not yet defined")]
    DanglingChild {
        /// Byte offset of the edge record.
        offset: usize,
        /// Id of the node whose edge is invalid.
        node: u32,
        /// The out-of-range child id.
        child: u32,
    },
    /// A node's edge labels were not strictly ascending.
    #[error("edge labels out of order at offset {offset} in node {node}")]
    UnsortedEdges {
        /// Byte offset of the offending edge record.
        offset: usize,
        /// Id of the node whose edges are unsorted.
        node: u32,
    },
    /// An edge label code does not decode to a letter.
    #[error("invalid label code {code} at offset {offset}")]
    BadLabel {
        /// Byte offset of the label field.
        offset: usize,
        /// The undecodable code.
        code: u32,
    },
    /// The root id is not a valid node id.
    #[error("root id {root} at offset 9 out of range for {count} nodes")]
    BadRoot {
        /// The declared root id.
        root: u32,
        /// The declared node count.
        count: u32,
    },
    /// Well-formed records were followed by leftover bytes.
    #[error("{extra} trailing bytes at offset {offset}")]
    TrailingBytes {
        /// Offset of the first unexpected byte.
        offset: usize,
        /// Number of unexpected bytes.
        extra: usize,
    },
}

/// Serializes a frozen graph to bytes.
///
/// Deterministic for a given graph: nodes are numbered by the post-order
/// depth-first traversal from the root, so children always precede their
/// parents in the stream.
pub fn serialize<L: LetterCode + 'static>(graph: &WordGraph<L>) -> Vec<u8> {
    let mut ids: HashMap<*const WordNode<L>, u32> = HashMap::new();
    let mut records = Vec::new();
    let root_id = number(graph.root(), &mut ids, &mut records);

    let mut out = Vec::with_capacity(13 + records.len());
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&(ids.len() as u32).to_le_bytes());
    out.extend_from_slice(&root_id.to_le_bytes());
    out.extend_from_slice(&records);
    out
}

/// Assigns `node` (and, first, its unvisited descendants) a post-order id
/// and appends its record. Returns `node`'s id.
fn number<'a, L: LetterCode>(
    node: &'a WordNode<'a, L>,
    ids: &mut HashMap<*const WordNode<'a, L>, u32>,
    records: &mut Vec<u8>,
) -> u32 {
    if let Some(&id) = ids.get(&(node as *const WordNode<L>)) {
        return id;
    }
    let edges: Vec<(u32, u32)> = node
        .edges()
        .map(|(label, child)| (label.encode(), number(child, ids, records)))
        .collect();

    let id = ids.len() as u32;
    ids.insert(node as *const WordNode<L>, id);

    records.push(node.is_terminal() as u8);
    records.extend_from_slice(&(edges.len() as u32).to_le_bytes());
    for (label, child) in edges {
        records.extend_from_slice(&label.to_le_bytes());
        records.extend_from_slice(&child.to_le_bytes());
    }
    id
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], CodecError> {
        match self.buf.get(self.pos..self.pos + N) {
            Some(bytes) => {
                let bytes: [u8; N] = bytes.try_into().expect("slice length checked");
                self.pos += N;
                Ok(bytes)
            }
            None => Err(CodecError::Truncated {
                offset: self.pos,
                field,
                needs: self.pos + N - self.buf.len(),
            }),
        }
    }

    fn u8(&mut self, field: &'static str) -> Result<u8, CodecError> {
        Ok(self.take::<1>(field)?[0])
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.take::<4>(field)?))
    }
}

/// Reconstructs a graph from [`serialize`] output.
///
/// Validates the whole stream before trusting it: magic, version, node
/// count against the remaining length, child ids strictly below their
/// parent's id, strictly ascending edge labels, decodable label codes,
/// the root id, and the absence of trailing bytes. Succeeds only on
/// streams a frozen acyclic graph could actually have produced; the
/// result answers queries identically to the serialized graph, with no
/// builder pass.
pub fn deserialize<L: LetterCode + 'static>(bytes: &[u8]) -> Result<WordGraph<L>, CodecError> {
    let mut r = Reader { buf: bytes, pos: 0 };

    if r.take::<4>("magic")? != MAGIC {
        return Err(CodecError::BadMagic);
    }
    let version = r.u8("version")?;
    if version != VERSION {
        return Err(CodecError::UnsupportedVersion { version });
    }
    let count = r.u32("node count")?;
    let root_id = r.u32("root id")?;

    // Each record is at least 5 bytes; reject absurd counts before
    // reserving anything.
    let min_body = (count as usize)
        .checked_mul(5)
        .ok_or(CodecError::ImplausibleNodeCount { count })?;
    if min_body > bytes.len() - r.pos {
        return Err(CodecError::ImplausibleNodeCount { count });
    }
    if root_id >= count {
        return Err(CodecError::BadRoot {
            root: root_id,
            count,
        });
    }

    let arena: NodeArena<WordNode<'static, L>> = NodeArena::new();
    // SAFETY: same containment as the owned builder — the forged 'static
    // references point into `arena`, which moves into the returned graph
    // below and outlives every one of them.
    let arena_ref: &'static NodeArena<WordNode<'static, L>> =
        unsafe { &*(&arena as *const NodeArena<WordNode<'static, L>>) };

    let mut nodes: Vec<&'static WordNode<'static, L>> = Vec::with_capacity(count as usize);
    for id in 0..count {
        let flags = r.u8("node flags")?;
        let mut node = WordNode::new(flags & 1 != 0);
        let degree = r.u32("out-degree")?;
        let mut previous_label: Option<L> = None;
        for _ in 0..degree {
            let label_offset = r.pos;
            let code = r.u32("edge label")?;
            let label = L::decode(code).ok_or(CodecError::BadLabel {
                offset: label_offset,
                code,
            })?;
            if previous_label.is_some_and(|p| p >= label) {
                return Err(CodecError::UnsortedEdges {
                    offset: label_offset,
                    node: id,
                });
            }
            previous_label = Some(label);

            let child_offset = r.pos;
            let child = r.u32("child id")?;
            if child >= id {
                return Err(CodecError::DanglingChild {
                    offset: child_offset,
                    node: id,
                    child,
                });
            }
            node.link(label, nodes[child as usize]);
        }
        node.set_frozen();
        nodes.push(arena_ref.alloc(node));
    }

    if r.pos != bytes.len() {
        return Err(CodecError::TrailingBytes {
            offset: r.pos,
            extra: bytes.len() - r.pos,
        });
    }

    let root = nodes[root_id as usize] as *const WordNode<'static, L>;
    Ok(WordGraph::from_raw_parts(arena, root))
}
