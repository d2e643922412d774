/*!
The error type shared by the header codec, the value codecs and the skip engine.

Every fallible operation in this crate stops at the first problem and hands it
back as an [`Error`]; nothing is retried or recovered locally.
*/

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The item's major type or sub-code is not what the decode target accepts.
    #[error("Incorrect type: expected {expected}, found item starting {found:#04x}")]
    ItemTypeMismatch { expected: &'static str, found: u8 },

    /// The decoded value does not fit the destination type.
    #[error("Value out of range for the destination type")]
    ItemValueOutOfRange,

    /// A chunk of an indefinite-length string is not a definite string of the same major type.
    #[error("Chunked string contains an invalid chunk starting {0:#04x}")]
    InvalidIndefiniteSubitem(u8),

    /// Reserved additional information, an illegal indefinite marker, or a truncated header.
    #[error("Malformed item header starting {0:#04x}")]
    MalformedHeader(u8),

    /// The skip engine could not grow its frame stack.
    #[error("Nesting too deep to track")]
    ResourceExhausted,

    #[error("Text string is not valid UTF-8")]
    InvalidUtf8,

    /// A definite-length array or map was given the wrong number of items.
    #[error("Definite length sequence expected {expected} items, got {actual}")]
    SequenceLength { expected: usize, actual: usize },

    #[error(transparent)]
    Stream(#[from] tessera_io::Error),
}
