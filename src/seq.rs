//! Implementation of a positional integer sequence, backed by a splay tree
#![warn(missing_docs)]

extern crate alloc;

use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt::Display;

use crate::util::{Tree, NEG};
use crate::Error;

//-----------------------------------------------------------------------------------------------//

/// A sequence of integers addressed purely by position, implemented using a splay tree.
///
/// The sequence supports, at arbitrary positions and in amortised logarithmic time, insertion
/// and removal of contiguous blocks, uniform assignment over a range, reversal of a range and
/// range-sum queries, plus a constant-time query for the largest sum of any non-empty
/// contiguous run of the whole sequence.
///
/// Positions are 0-based. The capacity given at construction is a hard bound: the sequence
/// never grows past it, and an `insert` that would do so fails with `CapacityExhausted` and
/// leaves the sequence untouched. Internally the live elements are bounded by two permanent
/// sentinel nodes holding a value low enough never to win a best-run comparison, so every
/// range operation can isolate its run without special-casing the ends. Element values must
/// be at least [`Sequence::MIN_VALUE`]; lower values would undercut the sentinels and are
/// rejected with `ValueOutOfRange`.
///
/// Queries take `&self` but still reshape the tree: a splay tree moves accessed nodes toward
/// the root as a side effect of lookup, which is what makes repeated access fast.
#[derive(Clone)]
pub struct Sequence {
    tree: RefCell<Tree>,
}

impl Sequence {
    /// The smallest element value the sequence can hold
    ///
    /// The internal sentinels must lose every best-run comparison to a live element; an
    /// element at or below their value would let a sentinel win instead, so the supported
    /// range stops one above it.
    pub const MIN_VALUE: i64 = NEG + 1;

    /// Construct a sequence holding `values`, able to grow to at most `capacity` elements
    pub fn new(values: &[i64], capacity: usize) -> Result<Sequence, Error> {
        if values.len() > capacity {
            return Err(Error::CapacityExhausted { capacity });
        }
        vet(values)?;

        let mut tree = Tree::new(capacity + 2);

        let mut bounded = Vec::with_capacity(values.len() + 2);
        bounded.push(NEG);
        bounded.extend_from_slice(values);
        bounded.push(NEG);
        tree.rebuild(&bounded)?;

        Ok(Sequence {
            tree: RefCell::new(tree),
        })
    }

    /// Get the number of elements in the sequence
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.borrow().count() - 2
    }

    /// Check if there are any elements in the sequence
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the maximum number of elements the sequence can hold
    #[inline]
    pub fn capacity(&self) -> usize {
        self.tree.borrow().limit() - 2
    }

    /// Insert a block of values before position `pos`
    ///
    /// `pos` may be anywhere from 0 to `len()` inclusive; `len()` appends. Fails with
    /// `OutOfRange` if `pos` is past the end, `ValueOutOfRange` if a value is below
    /// [`Sequence::MIN_VALUE`], and `CapacityExhausted` if the block would not fit, leaving
    /// the sequence untouched in every case. O(log n) amortised plus O(k) for the block.
    pub fn insert(&mut self, pos: usize, values: &[i64]) -> Result<(), Error> {
        let len = self.len();
        if pos > len {
            return Err(Error::OutOfRange {
                pos,
                count: values.len(),
                len,
            });
        }
        vet(values)?;
        if values.len() > self.capacity() - len {
            return Err(Error::CapacityExhausted {
                capacity: self.capacity(),
            });
        }

        // The leading sentinel sits at rank 1, so position `pos` is rank `pos + 2` and the
        // block lands between ranks `pos + 1` and `pos + 2`.
        self.tree.borrow_mut().insert_at(pos + 1, values)
    }

    /// Remove the `count` elements starting at position `pos`
    ///
    /// The removed nodes are recycled for future insertions. O(log n) amortised, independent
    /// of `count`.
    pub fn remove(&mut self, pos: usize, count: usize) -> Result<(), Error> {
        self.guard(pos, count)?;
        self.tree.borrow_mut().remove_at(pos + 2, count);
        Ok(())
    }

    /// Assign `value` to the `count` elements starting at position `pos`
    ///
    /// `value` must be at least [`Sequence::MIN_VALUE`]. The assignment is recorded lazily on
    /// the isolated run, so the cost is O(log n) amortised, independent of `count`.
    pub fn assign(&mut self, pos: usize, count: usize, value: i64) -> Result<(), Error> {
        self.guard(pos, count)?;
        vet(&[value])?;
        self.tree.borrow_mut().assign_at(pos + 2, count, value);
        Ok(())
    }

    /// Reverse the order of the `count` elements starting at position `pos`
    ///
    /// The reversal is recorded lazily on the isolated run, so the cost is O(log n)
    /// amortised, independent of `count`.
    pub fn reverse(&mut self, pos: usize, count: usize) -> Result<(), Error> {
        self.guard(pos, count)?;
        self.tree.borrow_mut().reverse_at(pos + 2, count);
        Ok(())
    }

    /// Get the sum of the `count` elements starting at position `pos`
    ///
    /// An empty range sums to zero. O(log n) amortised.
    pub fn range_sum(&self, pos: usize, count: usize) -> Result<i64, Error> {
        self.guard(pos, count)?;
        Ok(self.tree.borrow_mut().sum_at(pos + 2, count))
    }

    /// Get the largest sum of any non-empty contiguous run of the sequence
    ///
    /// Returns `None` if the sequence is empty. O(1): the answer is an aggregate maintained at
    /// the root.
    pub fn max_sum(&self) -> Option<i64> {
        if self.is_empty() {
            None
        } else {
            Some(self.tree.borrow().best())
        }
    }

    /// Get the element at position `pos`
    ///
    /// Returns `None` if the position is past the end. The accessed node is promoted to the
    /// root, so repeated access to nearby positions stays fast.
    pub fn get(&self, pos: usize) -> Option<i64> {
        if pos >= self.len() {
            return None;
        }
        Some(self.tree.borrow_mut().value_at(pos + 2))
    }

    /// Collect the sequence into a vector. O(n).
    pub fn to_vec(&self) -> Vec<i64> {
        let values = self.tree.borrow_mut().collect();
        values[1..values.len() - 1].to_vec()
    }

    // Check a range against the current length
    fn guard(&self, pos: usize, count: usize) -> Result<(), Error> {
        let len = self.len();
        if pos > len || count > len - pos {
            return Err(Error::OutOfRange { pos, count, len });
        }
        Ok(())
    }
}

// Check a batch of element values against the supported floor
fn vet(values: &[i64]) -> Result<(), Error> {
    for &value in values {
        if value < Sequence::MIN_VALUE {
            return Err(Error::ValueOutOfRange {
                value,
                min: Sequence::MIN_VALUE,
            });
        }
    }
    Ok(())
}

impl Display for Sequence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[ ")?;
        for value in self.to_vec() {
            write!(f, "{value} ")?;
        }
        write!(f, "]")?;
        Ok(())
    }
}

//-----------------------------------------------------------------------------------------------//

// The largest sum of any non-empty contiguous run, by Kadane's scan. Test oracle.
#[cfg(test)]
fn best_run(values: &[i64]) -> Option<i64> {
    let mut best: Option<i64> = None;
    let mut run = 0;
    for &value in values {
        run = if run > 0 { run + value } else { value };
        best = Some(match best {
            Some(b) => core::cmp::max(b, run),
            None => run,
        });
    }
    best
}

#[test]
// The worked scenario: assignment raises the best run, reversal leaves sums and the best run
// unchanged
fn test_seq_0() {
    use alloc::vec;

    let mut seq = Sequence::new(&[-1, 2, -3, 4, -5], 16).unwrap();

    assert_eq!(seq.len(), 5);
    assert_eq!(seq.max_sum(), Some(4));
    assert_eq!(seq.range_sum(0, 5), Ok(-3));

    seq.assign(1, 1, 10).unwrap();
    assert_eq!(seq.to_vec(), vec![-1, 10, -3, 4, -5]);
    assert_eq!(seq.max_sum(), Some(11));

    seq.reverse(0, 5).unwrap();
    assert_eq!(seq.to_vec(), vec![-5, 4, -3, 10, -1]);
    assert_eq!(seq.range_sum(0, 5), Ok(5));
    assert_eq!(seq.max_sum(), Some(11));
    assert_eq!(seq.get(3), Some(10));
}

#[test]
// Inserting a block and removing it again restores the original sequence
fn test_seq_1() {
    use alloc::{format, vec};

    let mut seq = Sequence::new(&[1, 2, 3], 16).unwrap();

    seq.insert(1, &[9, 8, 7]).unwrap();
    assert_eq!(seq.len(), 6);
    assert_eq!(seq.to_vec(), vec![1, 9, 8, 7, 2, 3]);
    assert_eq!(seq.get(1), Some(9));
    assert_eq!(format!("{seq}"), "[ 1 9 8 7 2 3 ]");

    seq.remove(1, 3).unwrap();
    assert_eq!(seq.len(), 3);
    assert_eq!(seq.to_vec(), vec![1, 2, 3]);
    assert_eq!(seq.max_sum(), Some(6));

    seq.insert(3, &[4]).unwrap();
    assert_eq!(seq.to_vec(), vec![1, 2, 3, 4]);
}

#[test]
// Reversing the same range twice is the identity
fn test_seq_2() {
    use alloc::vec;

    let mut seq = Sequence::new(&[5, -2, 7, 0, -1, 3], 8).unwrap();

    seq.reverse(1, 4).unwrap();
    assert_eq!(seq.to_vec(), vec![5, -1, 0, 7, -2, 3]);

    seq.reverse(1, 4).unwrap();
    assert_eq!(seq.to_vec(), vec![5, -2, 7, 0, -1, 3]);

    seq.reverse(0, 6).unwrap();
    assert_eq!(seq.to_vec(), vec![3, -1, 0, 7, -2, 5]);
    assert_eq!(seq.max_sum(), Some(12));
}

#[test]
// Uniform assignment drives sums and the best run, including the all-negative case
fn test_seq_3() {
    use alloc::vec;

    let mut seq = Sequence::new(&[1, 1, 1, 1, 1], 8).unwrap();

    seq.assign(1, 3, 4).unwrap();
    assert_eq!(seq.to_vec(), vec![1, 4, 4, 4, 1]);
    assert_eq!(seq.range_sum(1, 3), Ok(12));
    assert_eq!(seq.range_sum(0, 5), Ok(14));
    assert_eq!(seq.range_sum(2, 0), Ok(0));
    assert_eq!(seq.max_sum(), Some(14));

    seq.assign(0, 5, -5).unwrap();
    assert_eq!(seq.range_sum(0, 5), Ok(-25));
    assert_eq!(seq.max_sum(), Some(-5));
}

#[test]
// Out-of-range and over-capacity calls fail atomically
fn test_seq_4() {
    use alloc::vec;

    assert_eq!(
        Sequence::new(&[1, 2], 1).err(),
        Some(Error::CapacityExhausted { capacity: 1 })
    );

    let mut seq = Sequence::new(&[1, 2, 3], 4).unwrap();

    assert_eq!(
        seq.remove(2, 2),
        Err(Error::OutOfRange {
            pos: 2,
            count: 2,
            len: 3
        })
    );
    assert_eq!(
        seq.insert(4, &[9]),
        Err(Error::OutOfRange {
            pos: 4,
            count: 1,
            len: 3
        })
    );
    assert_eq!(
        seq.range_sum(0, 4),
        Err(Error::OutOfRange {
            pos: 0,
            count: 4,
            len: 3
        })
    );

    assert_eq!(
        seq.insert(3, &[9, 9]),
        Err(Error::CapacityExhausted { capacity: 4 })
    );
    assert_eq!(seq.to_vec(), vec![1, 2, 3]);

    seq.insert(3, &[9]).unwrap();
    assert_eq!(seq.to_vec(), vec![1, 2, 3, 9]);
    assert_eq!(
        seq.insert(0, &[0]),
        Err(Error::CapacityExhausted { capacity: 4 })
    );

    // Removal recycles, so there is room again
    seq.remove(0, 2).unwrap();
    seq.insert(0, &[6, 6]).unwrap();
    assert_eq!(seq.to_vec(), vec![6, 6, 3, 9]);
}

#[test]
// The empty sequence answers every query without special cases
fn test_seq_5() {
    use alloc::{format, vec};

    let mut seq = Sequence::new(&[], 8).unwrap();

    assert_eq!(seq.len(), 0);
    assert!(seq.is_empty());
    assert_eq!(seq.max_sum(), None);
    assert_eq!(seq.get(0), None);
    assert_eq!(seq.range_sum(0, 0), Ok(0));
    assert_eq!(seq.to_vec(), vec![]);
    assert_eq!(format!("{seq}"), "[ ]");

    seq.insert(0, &[3, -1]).unwrap();
    assert_eq!(seq.len(), 2);
    assert_eq!(seq.max_sum(), Some(3));

    seq.remove(0, 2).unwrap();
    assert!(seq.is_empty());
    assert_eq!(seq.max_sum(), None);
}

#[test]
// A stress test driving a random operation mix against a naive model
fn test_seq_6() {
    use rand::prelude::*;

    const ROUNDS: usize = 3000;
    const CAPACITY: usize = 64;

    let mut rng = SmallRng::seed_from_u64(1234567890);

    let mut seq = Sequence::new(&[], CAPACITY).unwrap();
    let mut model: Vec<i64> = Vec::new();

    for _ in 0..ROUNDS {
        match rng.random_range(0..6) {
            0 => {
                let pos = rng.random_range(0..=model.len());
                let count = rng.random_range(0..=6);
                let block: Vec<i64> = (0..count).map(|_| rng.random_range(-50..=50)).collect();

                if model.len() + block.len() <= CAPACITY {
                    seq.insert(pos, &block).unwrap();
                    model.splice(pos..pos, block.iter().copied());
                } else {
                    assert_eq!(
                        seq.insert(pos, &block),
                        Err(Error::CapacityExhausted {
                            capacity: CAPACITY
                        })
                    );
                }
            }
            1 => {
                if !model.is_empty() {
                    let pos = rng.random_range(0..model.len());
                    let count = rng.random_range(0..=model.len() - pos);
                    seq.remove(pos, count).unwrap();
                    model.drain(pos..pos + count);
                }
            }
            2 => {
                let pos = rng.random_range(0..=model.len());
                let count = rng.random_range(0..=model.len() - pos);
                let value = rng.random_range(-50..=50);
                seq.assign(pos, count, value).unwrap();
                model[pos..pos + count].fill(value);
            }
            3 => {
                let pos = rng.random_range(0..=model.len());
                let count = rng.random_range(0..=model.len() - pos);
                seq.reverse(pos, count).unwrap();
                model[pos..pos + count].reverse();
            }
            4 => {
                let pos = rng.random_range(0..=model.len());
                let count = rng.random_range(0..=model.len() - pos);
                let sum: i64 = model[pos..pos + count].iter().sum();
                assert_eq!(seq.range_sum(pos, count), Ok(sum));
            }
            _ => {
                assert_eq!(seq.max_sum(), best_run(&model));
            }
        }

        assert_eq!(seq.len(), model.len());
        seq.tree.borrow().check();
    }

    assert_eq!(seq.to_vec(), model);
}

#[test]
// Values below the supported floor are rejected before any mutation, and the floor itself
// still beats the sentinels in every best-run comparison
fn test_seq_7() {
    use alloc::vec;

    assert_eq!(
        Sequence::new(&[i64::MIN], 4).err(),
        Some(Error::ValueOutOfRange {
            value: i64::MIN,
            min: Sequence::MIN_VALUE,
        })
    );

    let mut seq = Sequence::new(&[1, 2, 3], 8).unwrap();

    assert_eq!(
        seq.insert(1, &[0, i64::MIN / 4]),
        Err(Error::ValueOutOfRange {
            value: i64::MIN / 4,
            min: Sequence::MIN_VALUE,
        })
    );
    assert_eq!(
        seq.assign(0, 3, i64::MIN),
        Err(Error::ValueOutOfRange {
            value: i64::MIN,
            min: Sequence::MIN_VALUE,
        })
    );
    assert_eq!(seq.to_vec(), vec![1, 2, 3]);

    // The floor itself is allowed and reported as the best run when it is all there is
    let floor = Sequence::new(&[Sequence::MIN_VALUE], 4).unwrap();
    assert_eq!(floor.max_sum(), Some(Sequence::MIN_VALUE));
}
