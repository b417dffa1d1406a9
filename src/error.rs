//! Error types shared across the crate

#![warn(missing_docs)]

use compact_str::CompactString;
use thiserror::Error;

//-----------------------------------------------------------------------------------------------//

/// Errors surfaced by sequence operations and command parsing
///
/// No operation is retried internally and none fails part-way: a `Sequence` that returns an
/// error is exactly as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The node arena has reached its configured capacity
    ///
    /// This is fatal for the operation that hit it; the capacity is fixed at construction and
    /// the structure never grows past it.
    #[error("node capacity of {capacity} exhausted")]
    CapacityExhausted {
        /// The configured maximum number of elements
        capacity: usize,
    },

    /// A position or count fell outside the live sequence
    #[error("range at position {pos} with count {count} is outside a sequence of length {len}")]
    OutOfRange {
        /// The requested position
        pos: usize,
        /// The requested number of elements
        count: usize,
        /// The sequence length at the time of the call
        len: usize,
    },

    /// An element value was below the supported range
    ///
    /// Element values must be at least `Sequence::MIN_VALUE`: anything lower would undercut
    /// the internal boundary records and corrupt the best-run aggregate.
    #[error("value {value} is below the supported minimum of {min}")]
    ValueOutOfRange {
        /// The rejected value
        value: i64,
        /// The smallest supported element value
        min: i64,
    },

    /// A command line could not be parsed
    #[error("malformed command: {what}")]
    Malformed {
        /// The offending token, or a short description of what was missing
        what: CompactString,
    },
}
