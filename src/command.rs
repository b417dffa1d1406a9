//! A line-oriented command vocabulary for driving a `Sequence`
//!
//! The vocabulary exists for harness parity with the classic exercise format and maps 1:1 onto
//! the `Sequence` API. Positions on the wire are 1-based; `INSERT pos` inserts *after* position
//! `pos`, so `pos` ranges from 0 to the current length. This module only parses and applies
//! lines - it owns no reader or writer.

#![warn(missing_docs)]

extern crate alloc;

use alloc::vec::Vec;
use compact_str::CompactString;
use core::str::{FromStr, SplitWhitespace};

use crate::{Error, Sequence};

//-----------------------------------------------------------------------------------------------//

/// A single parsed command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `INSERT pos n v1 .. vn` - insert a block after 1-based position `pos`
    Insert {
        /// The 1-based position to insert after (0 prepends)
        pos: usize,
        /// The values of the block, in order
        values: Vec<i64>,
    },
    /// `DELETE pos n` - remove `count` elements starting at 1-based position `pos`
    Delete {
        /// The 1-based position of the first removed element
        pos: usize,
        /// The number of elements to remove
        count: usize,
    },
    /// `MAKE-SAME pos n c` - assign `value` to `count` elements starting at `pos`
    MakeSame {
        /// The 1-based position of the first assigned element
        pos: usize,
        /// The number of elements to assign
        count: usize,
        /// The value every element in the range takes
        value: i64,
    },
    /// `REVERSE pos n` - reverse `count` elements starting at `pos`
    Reverse {
        /// The 1-based position of the first reversed element
        pos: usize,
        /// The number of elements to reverse
        count: usize,
    },
    /// `GET-SUM pos n` - sum `count` elements starting at `pos`
    GetSum {
        /// The 1-based position of the first summed element
        pos: usize,
        /// The number of elements to sum
        count: usize,
    },
    /// `MAX-SUM` - the largest sum of any non-empty contiguous run
    MaxSum,
}

impl Command {
    /// Parse a single command line
    ///
    /// Fields are whitespace-separated; an unknown verb, a missing or unparseable field, or
    /// trailing fields all fail with `Malformed`.
    pub fn parse(line: &str) -> Result<Command, Error> {
        let mut fields = line.split_whitespace();
        let verb = fields.next().ok_or_else(|| malformed("empty line"))?;

        let command = match verb {
            "INSERT" => {
                let pos = field(&mut fields)?;
                let count: usize = field(&mut fields)?;
                // `count` comes straight off the wire; clamp the preallocation and let the
                // field loop report what is actually missing.
                let mut values = Vec::with_capacity(count.min(64));
                for _ in 0..count {
                    values.push(field(&mut fields)?);
                }
                Command::Insert { pos, values }
            }
            "DELETE" => Command::Delete {
                pos: field(&mut fields)?,
                count: field(&mut fields)?,
            },
            "MAKE-SAME" => Command::MakeSame {
                pos: field(&mut fields)?,
                count: field(&mut fields)?,
                value: field(&mut fields)?,
            },
            "REVERSE" => Command::Reverse {
                pos: field(&mut fields)?,
                count: field(&mut fields)?,
            },
            "GET-SUM" => Command::GetSum {
                pos: field(&mut fields)?,
                count: field(&mut fields)?,
            },
            "MAX-SUM" => Command::MaxSum,
            _ => return Err(malformed(verb)),
        };

        if fields.next().is_some() {
            return Err(malformed("trailing fields"));
        }
        Ok(command)
    }

    /// Run the command against a sequence
    ///
    /// Query commands return `Some(answer)`, mutating commands `None`. `MAX-SUM` against an
    /// empty sequence is reported as `OutOfRange`, since the best run over no elements does
    /// not exist.
    pub fn apply(&self, seq: &mut Sequence) -> Result<Option<i64>, Error> {
        match self {
            Command::Insert { pos, values } => {
                seq.insert(*pos, values)?;
                Ok(None)
            }
            Command::Delete { pos, count } => {
                let pos = base(*pos, seq.len())?;
                seq.remove(pos, *count)?;
                Ok(None)
            }
            Command::MakeSame { pos, count, value } => {
                let pos = base(*pos, seq.len())?;
                seq.assign(pos, *count, *value)?;
                Ok(None)
            }
            Command::Reverse { pos, count } => {
                let pos = base(*pos, seq.len())?;
                seq.reverse(pos, *count)?;
                Ok(None)
            }
            Command::GetSum { pos, count } => {
                let pos = base(*pos, seq.len())?;
                Ok(Some(seq.range_sum(pos, *count)?))
            }
            Command::MaxSum => {
                let best = seq.max_sum().ok_or(Error::OutOfRange {
                    pos: 0,
                    count: 1,
                    len: 0,
                })?;
                Ok(Some(best))
            }
        }
    }
}

//-----------------------------------------------------------------------------------------------//

// Parse the next whitespace-separated field
fn field<T: FromStr>(fields: &mut SplitWhitespace<'_>) -> Result<T, Error> {
    let token = fields.next().ok_or_else(|| malformed("missing field"))?;
    token.parse().map_err(|_| malformed(token))
}

// Translate a 1-based wire position to a 0-based sequence position
fn base(pos: usize, len: usize) -> Result<usize, Error> {
    pos.checked_sub(1).ok_or(Error::OutOfRange {
        pos: 0,
        count: 0,
        len,
    })
}

fn malformed(what: &str) -> Error {
    Error::Malformed {
        what: CompactString::new(what),
    }
}

//-----------------------------------------------------------------------------------------------//

#[test]
// Every command form parses, and bad lines are rejected
fn test_command_0() {
    use alloc::vec;

    assert_eq!(
        Command::parse("INSERT 3 2 -7 9"),
        Ok(Command::Insert {
            pos: 3,
            values: vec![-7, 9]
        })
    );
    assert_eq!(
        Command::parse("DELETE 1 4"),
        Ok(Command::Delete { pos: 1, count: 4 })
    );
    assert_eq!(
        Command::parse("MAKE-SAME 2 3 -1"),
        Ok(Command::MakeSame {
            pos: 2,
            count: 3,
            value: -1
        })
    );
    assert_eq!(
        Command::parse("REVERSE 1 5"),
        Ok(Command::Reverse { pos: 1, count: 5 })
    );
    assert_eq!(
        Command::parse("GET-SUM 2 2"),
        Ok(Command::GetSum { pos: 2, count: 2 })
    );
    assert_eq!(Command::parse("MAX-SUM"), Ok(Command::MaxSum));

    assert_eq!(
        Command::parse("FROB 1"),
        Err(Error::Malformed {
            what: CompactString::new("FROB")
        })
    );
    assert_eq!(
        Command::parse(""),
        Err(Error::Malformed {
            what: CompactString::new("empty line")
        })
    );
    assert_eq!(
        Command::parse("INSERT 1 2 5"),
        Err(Error::Malformed {
            what: CompactString::new("missing field")
        })
    );
    // An absurd count must come back as a parse error, not abort on preallocation
    assert_eq!(
        Command::parse("INSERT 1 18446744073709551615"),
        Err(Error::Malformed {
            what: CompactString::new("missing field")
        })
    );
    assert_eq!(
        Command::parse("DELETE 1 x"),
        Err(Error::Malformed {
            what: CompactString::new("x")
        })
    );
    assert_eq!(
        Command::parse("MAX-SUM 1"),
        Err(Error::Malformed {
            what: CompactString::new("trailing fields")
        })
    );
}

#[test]
// Applied commands match the direct API, 1-based positions included
fn test_command_1() {
    use alloc::vec;

    let mut seq = Sequence::new(&[-1, 2, -3, 4, -5], 16).unwrap();

    let run = |seq: &mut Sequence, line: &str| Command::parse(line).unwrap().apply(seq);

    assert_eq!(run(&mut seq, "MAX-SUM"), Ok(Some(4)));
    assert_eq!(run(&mut seq, "MAKE-SAME 2 1 10"), Ok(None));
    assert_eq!(run(&mut seq, "MAX-SUM"), Ok(Some(11)));
    assert_eq!(run(&mut seq, "REVERSE 1 5"), Ok(None));
    assert_eq!(run(&mut seq, "GET-SUM 1 5"), Ok(Some(5)));
    assert_eq!(seq.to_vec(), vec![-5, 4, -3, 10, -1]);

    assert_eq!(run(&mut seq, "INSERT 0 2 8 9"), Ok(None));
    assert_eq!(seq.to_vec(), vec![8, 9, -5, 4, -3, 10, -1]);
    assert_eq!(run(&mut seq, "DELETE 1 2"), Ok(None));
    assert_eq!(seq.to_vec(), vec![-5, 4, -3, 10, -1]);

    assert_eq!(
        run(&mut seq, "DELETE 0 1"),
        Err(Error::OutOfRange {
            pos: 0,
            count: 0,
            len: 5
        })
    );

    let mut empty = Sequence::new(&[], 4).unwrap();
    assert_eq!(
        run(&mut empty, "MAX-SUM"),
        Err(Error::OutOfRange {
            pos: 0,
            count: 1,
            len: 0
        })
    );
}
