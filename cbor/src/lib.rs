#![no_std]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use tessera_io::{Read, Write};

pub mod decode;
pub mod encode;
pub mod header;
pub mod skip;

mod error;

pub use error::Error;
pub use tessera_io as io;

/// The `null` simple value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Null;


#[cfg(test)]
mod encode_tests;
