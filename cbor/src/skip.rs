/*!
Discarding one complete item without decoding it.

The skip engine walks arbitrarily nested, definite or indefinite items with an
explicit stack of open containers instead of recursion, so hostile input can
only cost memory proportional to its nesting depth, and never stack space.
Each iteration resolves one step of the container on top of the stack:

- scalars resolve immediately;
- strings are skipped in one step, chunk by chunk if indefinite;
- arrays and maps read one sub-item per step and push it, popping themselves
  before their final sub-item is pushed;
- tags are replaced by the item they tag.

A break is only ever consumed as the lookahead that closes an indefinite
container; anywhere else it is an error.
*/

use super::*;
use header::{ItemHeader, Major, parse_header};
use smallvec::SmallVec;
use tracing::debug;

#[cfg(feature = "instrument")]
use tracing::instrument;

/// Open containers tracked before the stack spills to the heap.
const INLINE_FRAMES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Remaining {
    Definite(u64),
    Indefinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    ExpectKey,
    ExpectValue,
}

/// What a container needs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Nothing, the container is complete.
    Empty,
    /// Its final sub-item.
    Last,
    /// A sub-item, with more to follow.
    Another,
    /// A sub-item or a break; `value` is set when a map is owed a value.
    Open { value: bool },
}

#[derive(Debug)]
struct Frame {
    header: ItemHeader,
    remaining: Remaining,
    phase: Phase,
}

impl Frame {
    fn new(header: ItemHeader) -> Self {
        Self {
            remaining: match header.length() {
                Some(n) => Remaining::Definite(n),
                None => Remaining::Indefinite,
            },
            phase: Phase::ExpectKey,
            header,
        }
    }

    /// Claim the next sub-item slot of an array or map.
    ///
    /// Map entries take two slots; the count only drops on the value half.
    fn next_slot(&mut self) -> Slot {
        let is_map = self.header.major() == Major::Map;
        let value = is_map && self.phase == Phase::ExpectValue;
        if is_map {
            self.phase = match self.phase {
                Phase::ExpectKey => Phase::ExpectValue,
                Phase::ExpectValue => Phase::ExpectKey,
            };
        }

        match &mut self.remaining {
            Remaining::Indefinite => Slot::Open { value },
            Remaining::Definite(0) => Slot::Empty,
            Remaining::Definite(_) if is_map && !value => Slot::Another,
            Remaining::Definite(n) => {
                *n -= 1;
                if *n == 0 { Slot::Last } else { Slot::Another }
            }
        }
    }
}

struct Stack {
    frames: SmallVec<[Frame; INLINE_FRAMES]>,
    max_depth: usize,
}

impl Stack {
    fn push(&mut self, header: ItemHeader) -> Result<(), Error> {
        if self.frames.len() >= self.max_depth {
            debug!("Refusing to skip item nested deeper than {}", self.max_depth);
            return Err(Error::ResourceExhausted);
        }
        self.frames.try_reserve(1).map_err(|_| {
            debug!("Failed to grow skip stack beyond {} frames", self.frames.len());
            Error::ResourceExhausted
        })?;
        self.frames.push(Frame::new(header));
        Ok(())
    }
}

fn skip_string<R: Read + ?Sized>(input: &mut R, header: ItemHeader) -> Result<(), Error> {
    if let Some(len) = header.length() {
        return input.discard(len).map_err(Into::into);
    }

    loop {
        let chunk = parse_header(input)?;
        if chunk.is_break() {
            return Ok(());
        }
        if chunk.major() != header.major() || chunk.is_indefinite() {
            return Err(Error::InvalidIndefiniteSubitem(chunk.lead()));
        }
        input.discard(chunk.argument())?;
    }
}

/// Consume exactly one item, however deeply nested, and leave `input`
/// positioned at the byte following it.
///
/// The only limit on nesting depth is the memory available for the frame
/// stack; running out is reported as [`Error::ResourceExhausted`].
pub fn skip_item<R: Read + ?Sized>(input: &mut R) -> Result<(), Error> {
    skip_item_bounded(input, usize::MAX)
}

/// As [`skip_item`], but refuse items with more than `max_depth` containers
/// open at once.
///
/// A scalar needs a depth of 1, `[1]` needs 1 (the array is resolved before its
/// last element is read) and `[[1], 2]` needs 2.
#[cfg_attr(feature = "instrument", instrument(skip(input)))]
pub fn skip_item_bounded<R: Read + ?Sized>(input: &mut R, max_depth: usize) -> Result<(), Error> {
    let mut stack = Stack {
        frames: SmallVec::new(),
        max_depth,
    };
    stack.push(parse_header(input)?)?;

    while let Some(top) = stack.frames.last_mut() {
        match top.header.major() {
            Major::Unsigned | Major::Negative => {
                stack.frames.pop();
            }
            Major::Special if top.header.is_break() => {
                return Err(Error::ItemTypeMismatch {
                    expected: "data item",
                    found: header::BREAK,
                });
            }
            Major::Special => {
                stack.frames.pop();
            }
            Major::Bytes | Major::Text => {
                let header = top.header;
                stack.frames.pop();
                skip_string(input, header)?;
            }
            Major::Tag => {
                stack.frames.pop();
                stack.push(parse_header(input)?)?;
            }
            Major::Array | Major::Map => match top.next_slot() {
                Slot::Empty => {
                    stack.frames.pop();
                }
                Slot::Last => {
                    stack.frames.pop();
                    stack.push(parse_header(input)?)?;
                }
                Slot::Another => {
                    stack.push(parse_header(input)?)?;
                }
                Slot::Open { value } => {
                    let sub = parse_header(input)?;
                    if !sub.is_break() {
                        stack.push(sub)?;
                    } else if value {
                        return Err(Error::ItemTypeMismatch {
                            expected: "map value",
                            found: header::BREAK,
                        });
                    } else {
                        stack.frames.pop();
                    }
                }
            },
        }
    }
    Ok(())
}
