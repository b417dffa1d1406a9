//! ## Introduction
//!
//! This crate implements a self-adjusting sequence of integers based on a splay tree. Unlike a
//! search tree, the sequence is addressed purely by *position*: the in-order traversal of the
//! tree is the sequence itself, and no value comparison ever takes place. Because the tree is
//! self-organising, any contiguous run of the sequence can be isolated as a single subtree in
//! amortised logarithmic time, which is what makes ranged updates cheap.
//!
//! ## Benefits
//!
//! The crate complements `alloc::vec::Vec` for workloads that edit the middle of a long
//! sequence, and provides the following:
//!
//! - Block insertion and block removal at any position in amortised O(log n) (plus the cost of
//!   the block itself for insertion).
//! - Uniform assignment and reversal over any range in amortised O(log n), independent of the
//!   range length, through lazily propagated range tags.
//! - Range-sum queries in amortised O(log n) and a whole-sequence best-contiguous-run query in
//!   O(1), through aggregates maintained on every subtree.
//! - Storage in a single arena indexed by plain integers, with removed slots recycled for
//!   future insertions and a hard capacity bound fixed at construction.
//! - The crate is small and `#![no_std]`.
//!
//! ## Contents
//!
//! | Type | Purpose |
//! |:-----------------|:---------------------------------------------------------|
//! | `Sequence` | The positional sequence with ranged updates and queries |
//! | `Command` | A line-oriented vocabulary mapping 1:1 onto `Sequence` |
//! | `Error` | The error taxonomy shared across the crate |
//! | `util::Tree` | The low-level rank-indexed splay tree engine |
//!
//! The `util::Tree` type manages the arena, rotations, lazy tags and aggregates without any
//! notion of sentinels or 0-based positions. It is exposed to support development of
//! additional sequence types.

#![no_std]
#![warn(missing_docs)]

mod command;
mod error;
mod seq;
pub mod util;

pub use command::*;
pub use error::*;
pub use seq::*;
