use super::*;

/// Zero-copy reader over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    pub fn is_empty(&self) -> bool {
        self.position == self.data.len()
    }
}

impl Read for SliceReader<'_> {
    fn lease(&mut self, len: usize) -> Result<&[u8], Error> {
        self.remaining().get(..len).ok_or(Error::EndOfInput)
    }

    fn consume(&mut self, len: usize) -> Result<(), Error> {
        if len > self.data.len() - self.position {
            return Err(Error::EndOfInput);
        }
        self.position += len;
        Ok(())
    }

    fn discard(&mut self, len: u64) -> Result<(), Error> {
        self.consume(usize::try_from(len).map_err(|_| Error::EndOfInput)?)
    }
}

/// Writer into a fixed-size buffer.
#[derive(Debug)]
pub struct SliceWriter<'a> {
    data: &'a mut [u8],
    position: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// The bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.data[..self.position]
    }
}

impl Write for SliceWriter<'_> {
    fn lease_mut(&mut self, len: usize) -> Result<&mut [u8], Error> {
        let start = self.position;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(Error::CapacityExhausted)?;
        self.position = end;
        Ok(&mut self.data[start..end])
    }
}
