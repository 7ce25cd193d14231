use std::fmt::Debug;
use std::hash::Hash;

/// Trait for types that can serve as edge labels in a word graph.
///
/// Automatically implemented for any type satisfying the bounds
/// (`char`, `u8`, `u16`, `u32`, …).
///
/// - `Copy`: edges store labels by value
/// - `Eq + Ord`: label comparison keeps edge tables sorted
/// - `Hash`: structural deduplication of nodes during construction
/// - `Debug`: error values and debug printing
pub trait Letter: Copy + Eq + Ord + Hash + Debug {}

impl<T: Copy + Eq + Ord + Hash + Debug> Letter for T {}
