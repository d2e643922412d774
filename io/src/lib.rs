/*!
Lease-based stream traits shared by the tessera CBOR codec.

A *lease* is a bounded view over the next bytes of a stream, granted for a
single read or write step. Readers never advance on [`Read::lease`]; the caller
acknowledges the bytes it used with [`Read::consume`]. Writers hand out a
mutable lease that becomes part of the output as soon as it is granted.

Running out of input or output space is always reported as an [`Error`].
*/

#![no_std]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use thiserror::Error;

mod adapter;
mod slice;

pub use adapter::{Reader, Writer};
pub use slice::{SliceReader, SliceWriter};

/// Upper bound on the size of a single lease taken by [`Read::discard`].
const DISCARD_CHUNK: usize = 4096;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Unexpected end of input")]
    EndOfInput,

    #[error("Output capacity exhausted")]
    CapacityExhausted,

    #[error("I/O error: {0:?}")]
    Io(embedded_io::ErrorKind),
}

/// A source of bytes that lends out bounded views of its next bytes.
pub trait Read {
    /// Borrow exactly the next `len` bytes without advancing the stream.
    fn lease(&mut self, len: usize) -> Result<&[u8], Error>;

    /// Advance past `len` bytes previously granted by [`Read::lease`].
    fn consume(&mut self, len: usize) -> Result<(), Error>;

    /// Copy the next `buf.len()` bytes into `buf` and advance past them.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let lease = self.lease(buf.len())?;
        buf.copy_from_slice(lease);
        self.consume(buf.len())
    }

    /// Advance past the next `len` bytes without looking at them.
    fn discard(&mut self, mut len: u64) -> Result<(), Error> {
        while len > 0 {
            let step = len.min(DISCARD_CHUNK as u64) as usize;
            self.lease(step)?;
            self.consume(step)?;
            len -= step as u64;
        }
        Ok(())
    }
}

/// A sink of bytes that lends out bounded, writable views of its next bytes.
pub trait Write {
    /// Borrow the next `len` bytes of output for the caller to fill.
    fn lease_mut(&mut self, len: usize) -> Result<&mut [u8], Error>;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Error> {
        self.lease_mut(data.len())?.copy_from_slice(data);
        Ok(())
    }
}

impl<T: Read + ?Sized> Read for &mut T {
    #[inline]
    fn lease(&mut self, len: usize) -> Result<&[u8], Error> {
        (**self).lease(len)
    }

    #[inline]
    fn consume(&mut self, len: usize) -> Result<(), Error> {
        (**self).consume(len)
    }

    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        (**self).read_exact(buf)
    }

    #[inline]
    fn discard(&mut self, len: u64) -> Result<(), Error> {
        (**self).discard(len)
    }
}

impl<T: Write + ?Sized> Write for &mut T {
    #[inline]
    fn lease_mut(&mut self, len: usize) -> Result<&mut [u8], Error> {
        (**self).lease_mut(len)
    }

    #[inline]
    fn write_all(&mut self, data: &[u8]) -> Result<(), Error> {
        (**self).write_all(data)
    }
}

impl Write for alloc::vec::Vec<u8> {
    fn lease_mut(&mut self, len: usize) -> Result<&mut [u8], Error> {
        let start = self.len();
        self.resize(start + len, 0);
        Ok(&mut self[start..])
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Error> {
        self.extend_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn vec_writer() {
        let mut out = Vec::new();
        out.lease_mut(2).unwrap().copy_from_slice(&[1, 2]);
        out.write_all(&[3]).unwrap();
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn default_discard_chunks() {
        // Only implements the required methods, so discard() takes the chunked path
        struct Counting {
            len: usize,
            consumed: usize,
            scratch: [u8; DISCARD_CHUNK],
        }

        impl Read for Counting {
            fn lease(&mut self, len: usize) -> Result<&[u8], Error> {
                if len > self.len - self.consumed {
                    return Err(Error::EndOfInput);
                }
                Ok(&self.scratch[..len])
            }

            fn consume(&mut self, len: usize) -> Result<(), Error> {
                self.consumed += len;
                Ok(())
            }
        }

        let mut r = Counting {
            len: DISCARD_CHUNK * 2 + 7,
            consumed: 0,
            scratch: [0; DISCARD_CHUNK],
        };
        r.discard((DISCARD_CHUNK * 2 + 5) as u64).unwrap();
        assert_eq!(r.consumed, DISCARD_CHUNK * 2 + 5);
        assert_eq!(r.discard(3), Err(Error::EndOfInput));
    }

    #[test]
    fn forwarding_through_mut_ref() {
        fn take_two<R: Read>(mut r: R) -> [u8; 2] {
            let mut buf = [0u8; 2];
            r.read_exact(&mut buf).unwrap();
            buf
        }

        let mut r = SliceReader::new(&[1, 2, 3]);
        assert_eq!(take_two(&mut r), [1, 2]);
        assert_eq!(r.position(), 2);
    }
}
