/*!
Buffered adapters from `embedded-io` byte streams to the lease traits.
*/

use super::*;
use alloc::vec::Vec;
use embedded_io::Error as _;

/// Bytes requested from the inner reader per refill.
const READ_CHUNK: usize = 512;

/// Buffered output is written through once it reaches this size.
const WRITE_CHUNK: usize = 512;

/// Buffers an [`embedded_io::Read`] so that it can grant leases.
///
/// The buffer only grows by what the inner reader actually delivers, so a
/// lease for an absurd length fails with [`Error::EndOfInput`] once the inner
/// reader runs dry instead of allocating up front.
pub struct Reader<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
}

impl<R: embedded_io::Read> Reader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            pos: 0,
        }
    }

    /// Returns the inner reader, dropping any read-ahead bytes.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self, len: usize) -> Result<(), Error> {
        if self.buf.len() - self.pos >= len {
            return Ok(());
        }

        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }

        while self.buf.len() < len {
            let start = self.buf.len();
            self.buf.resize(start + READ_CHUNK, 0);
            match self.inner.read(&mut self.buf[start..]) {
                Ok(0) => {
                    self.buf.truncate(start);
                    return Err(Error::EndOfInput);
                }
                Ok(n) => self.buf.truncate(start + n),
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(Error::Io(e.kind()));
                }
            }
        }
        Ok(())
    }
}

impl<R: embedded_io::Read> Read for Reader<R> {
    fn lease(&mut self, len: usize) -> Result<&[u8], Error> {
        self.fill(len)?;
        Ok(&self.buf[self.pos..self.pos + len])
    }

    fn consume(&mut self, len: usize) -> Result<(), Error> {
        if len > self.buf.len() - self.pos {
            return Err(Error::EndOfInput);
        }
        self.pos += len;
        Ok(())
    }
}

/// Buffers writes to an [`embedded_io::Write`].
///
/// Leased bytes are held until the buffer fills up, [`Writer::flush`] is
/// called, or the writer is unwrapped with [`Writer::into_inner`].
pub struct Writer<W: embedded_io::Write> {
    inner: W,
    buf: Vec<u8>,
}

impl<W: embedded_io::Write> Writer<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buf: Vec::new(),
        }
    }

    fn write_through(&mut self) -> Result<(), Error> {
        let mut written = 0;
        let r = loop {
            if written == self.buf.len() {
                break Ok(());
            }
            match self.inner.write(&self.buf[written..]) {
                Ok(0) => break Err(Error::CapacityExhausted),
                Ok(n) => written += n,
                Err(e) => break Err(Error::Io(e.kind())),
            }
        };
        self.buf.drain(..written);
        r
    }

    /// Write all buffered bytes and flush the inner writer.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.write_through()?;
        self.inner.flush().map_err(|e| Error::Io(e.kind()))
    }

    pub fn into_inner(mut self) -> Result<W, Error> {
        self.flush()?;
        Ok(self.inner)
    }
}

impl<W: embedded_io::Write> Write for Writer<W> {
    fn lease_mut(&mut self, len: usize) -> Result<&mut [u8], Error> {
        if self.buf.len() >= WRITE_CHUNK {
            self.write_through()?;
        }
        let start = self.buf.len();
        self.buf.resize(start + len, 0);
        Ok(&mut self.buf[start..])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use core::convert::Infallible;

    /// Hands out at most `step` bytes per read call
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl embedded_io::ErrorType for Trickle<'_> {
        type Error = Infallible;
    }

    impl embedded_io::Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let n = buf.len().min(self.step).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    /// Accepts at most `limit` bytes in total
    struct Sink {
        data: Vec<u8>,
        limit: usize,
        flushed: bool,
    }

    impl embedded_io::ErrorType for Sink {
        type Error = Infallible;
    }

    impl embedded_io::Write for Sink {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            let n = buf.len().min(self.limit - self.data.len());
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.flushed = true;
            Ok(())
        }
    }

    #[test]
    fn reader_reassembles_short_reads() {
        let data: Vec<u8> = (0..=255).cycle().take(2000).collect();
        let mut r = Reader::new(Trickle {
            data: &data,
            step: 3,
        });

        assert_eq!(r.lease(5).unwrap(), &data[..5]);
        r.consume(1).unwrap();
        assert_eq!(r.lease(1000).unwrap(), &data[1..1001]);
        r.discard(999).unwrap();

        let mut buf = [0u8; 4];
        r.read_exact(&mut buf).unwrap();
        assert_eq!(buf, data[1000..1004]);

        r.discard(996).unwrap();
        assert_eq!(r.lease(1), Err(Error::EndOfInput));
    }

    #[test]
    fn reader_rejects_unleased_consume() {
        let mut r = Reader::new(Trickle {
            data: &[1, 2, 3],
            step: 8,
        });
        assert_eq!(r.consume(1), Err(Error::EndOfInput));
        r.lease(1).unwrap();
        r.consume(1).unwrap();
        assert_eq!(r.lease(3), Err(Error::EndOfInput));
        assert_eq!(r.lease(2).unwrap(), [2, 3]);
    }

    #[test]
    fn writer_buffers_and_flushes() {
        let mut w = Writer::new(Sink {
            data: Vec::new(),
            limit: usize::MAX,
            flushed: false,
        });
        for i in 0..1000u16 {
            w.write_all(&i.to_be_bytes()).unwrap();
        }
        let sink = w.into_inner().unwrap();
        assert!(sink.flushed);
        assert_eq!(sink.data.len(), 2000);
        assert_eq!(sink.data[1998..], 999u16.to_be_bytes());
    }

    #[test]
    fn writer_reports_full_sink() {
        let mut w = Writer::new(Sink {
            data: Vec::new(),
            limit: 4,
            flushed: false,
        });
        w.write_all(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(w.flush(), Err(Error::CapacityExhausted));
    }
}
