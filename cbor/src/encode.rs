use super::*;
use alloc::{collections::BTreeMap, string::String, vec::Vec};
use header::{Major, write_break, write_header, write_indefinite, write_lead};
use num_traits::ToPrimitive;

/// A type that can be written as one CBOR item.
pub trait ToCbor {
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error>;
}

/// Borrowed contents of a byte string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bytes<'a>(pub &'a [u8]);

pub struct Encoder<W> {
    out: W,
}

impl Default for Encoder<Vec<u8>> {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<Vec<u8>> {
    pub fn new() -> Self {
        Self { out: Vec::new() }
    }

    pub fn build(self) -> Vec<u8> {
        self.out
    }

    pub fn offset(&self) -> usize {
        self.out.len()
    }
}

impl<W: Write> Encoder<W> {
    pub fn from_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn emit_header(&mut self, major: Major, argument: u64) -> Result<(), Error> {
        write_header(&mut self.out, major, argument)
    }

    fn emit_float(&mut self, lead: u8, be: &[u8]) -> Result<(), Error> {
        let lease = self.out.lease_mut(1 + be.len())?;
        lease[0] = lead;
        lease[1..].copy_from_slice(be);
        Ok(())
    }

    fn emit_tags<I, T>(&mut self, tags: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = T>,
        T: ToPrimitive,
    {
        for tag in tags {
            self.emit_header(Major::Tag, tag.to_u64().ok_or(Error::ItemValueOutOfRange)?)?;
        }
        Ok(())
    }

    /// Append pre-encoded CBOR verbatim.
    pub fn emit_raw_slice(&mut self, data: &[u8]) -> Result<(), Error> {
        self.out.write_all(data).map_err(Into::into)
    }

    pub fn emit<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ToCbor + ?Sized,
    {
        value.to_cbor(self)
    }

    pub fn emit_tagged<T, I, U>(&mut self, value: &T, tags: I) -> Result<(), Error>
    where
        T: ToCbor + ?Sized,
        I: IntoIterator<Item = U>,
        U: ToPrimitive,
    {
        self.emit_tags(tags)?;
        self.emit(value)
    }

    pub fn emit_null(&mut self) -> Result<(), Error> {
        write_lead(&mut self.out, header::NULL)
    }

    pub fn emit_byte_stream<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut ByteStream<W>) -> Result<(), Error>,
    {
        write_indefinite(&mut self.out, Major::Bytes)?;
        f(&mut ByteStream { encoder: &mut *self })?;
        write_break(&mut self.out)
    }

    pub fn emit_text_stream<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut TextStream<W>) -> Result<(), Error>,
    {
        write_indefinite(&mut self.out, Major::Text)?;
        f(&mut TextStream { encoder: &mut *self })?;
        write_break(&mut self.out)
    }

    /// Emit an array, indefinite-length if `count` is `None`.
    pub fn emit_array<F>(&mut self, count: Option<usize>, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Array<W>) -> Result<(), Error>,
    {
        let mut a = Array::new(self, count)?;
        f(&mut a)?;
        a.end()
    }

    pub fn emit_slice<T>(&mut self, values: &[T]) -> Result<(), Error>
    where
        T: ToCbor,
    {
        self.emit_array(Some(values.len()), |a| {
            values.iter().try_for_each(|value| a.emit(value))
        })
    }

    /// Emit a map, indefinite-length if `count` is `None`.
    ///
    /// `count` is the number of entries; keys and values are emitted alternately.
    pub fn emit_map<F>(&mut self, count: Option<usize>, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Map<W>) -> Result<(), Error>,
    {
        let mut m = Map::new(self, count)?;
        f(&mut m)?;
        m.end()
    }
}

pub struct ByteStream<'a, W> {
    encoder: &'a mut Encoder<W>,
}

impl<W: Write> ByteStream<'_, W> {
    /// Emit one chunk.
    pub fn emit<V>(&mut self, value: &V) -> Result<(), Error>
    where
        V: AsRef<[u8]> + ?Sized,
    {
        self.encoder.emit(&Bytes(value.as_ref()))
    }
}

pub struct TextStream<'a, W> {
    encoder: &'a mut Encoder<W>,
}

impl<W: Write> TextStream<'_, W> {
    /// Emit one chunk.
    pub fn emit<V>(&mut self, value: &V) -> Result<(), Error>
    where
        V: AsRef<str> + ?Sized,
    {
        self.encoder.emit(value.as_ref())
    }
}

/// An array (`D == 1`) or map (`D == 2`) under construction.
pub struct Sequence<'a, W, const D: usize> {
    encoder: &'a mut Encoder<W>,
    count: Option<usize>,
    idx: usize,
}

pub type Array<'a, W> = Sequence<'a, W, 1>;
pub type Map<'a, W> = Sequence<'a, W, 2>;

impl<'a, W: Write, const D: usize> Sequence<'a, W, D> {
    fn new(encoder: &'a mut Encoder<W>, count: Option<usize>) -> Result<Self, Error> {
        let major = if D == 1 { Major::Array } else { Major::Map };
        match count {
            Some(count) => encoder.emit_header(major, count as u64)?,
            None => write_indefinite(&mut encoder.out, major)?,
        }
        Ok(Self {
            encoder,
            count: count.map(|c| c.saturating_mul(D)),
            idx: 0,
        })
    }

    fn next_field(&mut self) -> Result<&mut Encoder<W>, Error> {
        self.idx += 1;
        match self.count {
            Some(count) if self.idx > count => Err(Error::SequenceLength {
                expected: count,
                actual: self.idx,
            }),
            _ => Ok(&mut *self.encoder),
        }
    }

    fn end(self) -> Result<(), Error> {
        match self.count {
            Some(count) if self.idx != count => Err(Error::SequenceLength {
                expected: count,
                actual: self.idx,
            }),
            Some(_) => Ok(()),
            None if self.idx % D != 0 => Err(Error::SequenceLength {
                expected: self.idx + 1,
                actual: self.idx,
            }),
            None => write_break(&mut self.encoder.out),
        }
    }

    /// Number of items emitted so far; a map entry counts as two.
    pub fn len(&self) -> usize {
        self.idx
    }

    pub fn is_empty(&self) -> bool {
        self.idx == 0
    }

    /// Append one pre-encoded item verbatim.
    pub fn emit_raw_slice(&mut self, data: &[u8]) -> Result<(), Error> {
        self.next_field()?.emit_raw_slice(data)
    }

    pub fn emit<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ToCbor + ?Sized,
    {
        self.next_field()?.emit(value)
    }

    pub fn emit_tagged<T, I, U>(&mut self, value: &T, tags: I) -> Result<(), Error>
    where
        T: ToCbor + ?Sized,
        I: IntoIterator<Item = U>,
        U: ToPrimitive,
    {
        self.next_field()?.emit_tagged(value, tags)
    }

    pub fn emit_null(&mut self) -> Result<(), Error> {
        self.next_field()?.emit_null()
    }

    pub fn emit_byte_stream<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut ByteStream<W>) -> Result<(), Error>,
    {
        self.next_field()?.emit_byte_stream(f)
    }

    pub fn emit_text_stream<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut TextStream<W>) -> Result<(), Error>,
    {
        self.next_field()?.emit_text_stream(f)
    }

    pub fn emit_array<F>(&mut self, count: Option<usize>, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Array<W>) -> Result<(), Error>,
    {
        self.next_field()?.emit_array(count, f)
    }

    pub fn emit_map<F>(&mut self, count: Option<usize>, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Map<W>) -> Result<(), Error>,
    {
        self.next_field()?.emit_map(count, f)
    }
}

macro_rules! impl_uint_to_cbor {
    ($($ty:ty),*) => {
        $(
            impl ToCbor for $ty {
                fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
                    encoder.emit_header(Major::Unsigned, *self as u64)
                }
            }
        )*
    };
}

impl_uint_to_cbor!(u8, u16, u32, u64, usize);

fn emit_i64<W: Write>(encoder: &mut Encoder<W>, value: i64) -> Result<(), Error> {
    // All ones for negative values, turning the value into its magnitude -v-1
    let sign = (value >> 63) as u64;
    let major = if sign == 0 {
        Major::Unsigned
    } else {
        Major::Negative
    };
    encoder.emit_header(major, value as u64 ^ sign)
}

macro_rules! impl_int_to_cbor {
    ($($ty:ty),*) => {
        $(
            impl ToCbor for $ty {
                fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
                    emit_i64(encoder, *self as i64)
                }
            }
        )*
    };
}

impl_int_to_cbor!(i8, i16, i32, i64, isize);

impl ToCbor for half::f16 {
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        encoder.emit_float(header::HALF_FLOAT, &self.to_be_bytes())
    }
}

impl ToCbor for f32 {
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        encoder.emit_float(header::SINGLE_FLOAT, &self.to_be_bytes())
    }
}

impl ToCbor for f64 {
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        encoder.emit_float(header::DOUBLE_FLOAT, &self.to_be_bytes())
    }
}

impl ToCbor for bool {
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        write_lead(
            &mut encoder.out,
            if *self { header::TRUE } else { header::FALSE },
        )
    }
}

impl ToCbor for Null {
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        encoder.emit_null()
    }
}

impl<T> ToCbor for Option<T>
where
    T: ToCbor,
{
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        match self {
            Some(value) => encoder.emit(value),
            None => encoder.emit_null(),
        }
    }
}

impl<T> ToCbor for &T
where
    T: ToCbor + ?Sized,
{
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        (**self).to_cbor(encoder)
    }
}

fn emit_string<W: Write>(encoder: &mut Encoder<W>, major: Major, data: &[u8]) -> Result<(), Error> {
    encoder.emit_header(major, data.len() as u64)?;
    encoder.emit_raw_slice(data)
}

impl ToCbor for str {
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        emit_string(encoder, Major::Text, self.as_bytes())
    }
}

impl ToCbor for String {
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        self.as_str().to_cbor(encoder)
    }
}

impl ToCbor for Bytes<'_> {
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        emit_string(encoder, Major::Bytes, self.0)
    }
}

impl ToCbor for decode::ByteBuf {
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        emit_string(encoder, Major::Bytes, &self.0)
    }
}

impl<T> ToCbor for [T]
where
    T: ToCbor,
{
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        encoder.emit_slice(self)
    }
}

impl<T, const N: usize> ToCbor for [T; N]
where
    T: ToCbor,
{
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        encoder.emit_slice(self)
    }
}

impl<T> ToCbor for Vec<T>
where
    T: ToCbor,
{
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        encoder.emit_slice(self)
    }
}

impl<K, V> ToCbor for BTreeMap<K, V>
where
    K: ToCbor,
    V: ToCbor,
{
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        encoder.emit_map(Some(self.len()), |m| {
            for (key, value) in self {
                m.emit(key)?;
                m.emit(value)?;
            }
            Ok(())
        })
    }
}

macro_rules! impl_tuple_to_cbor {
    ($(($len:literal, $($name:ident: $idx:tt),+)),*) => {
        $(
            impl<$($name),+> ToCbor for ($($name,)+)
            where
                $($name: ToCbor),+
            {
                fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
                    encoder.emit_array(Some($len), |a| {
                        $(a.emit(&self.$idx)?;)+
                        Ok(())
                    })
                }
            }
        )*
    };
}

impl_tuple_to_cbor!(
    (1, A: 0),
    (2, A: 0, B: 1),
    (3, A: 0, B: 1, C: 2),
    (4, A: 0, B: 1, C: 2, D: 3)
);

pub fn emit<T>(value: &T) -> Result<Vec<u8>, Error>
where
    T: ToCbor + ?Sized,
{
    let mut e = Encoder::new();
    e.emit(value)?;
    Ok(e.build())
}

pub fn emit_tagged<T, I, U>(value: &T, tags: I) -> Result<Vec<u8>, Error>
where
    T: ToCbor + ?Sized,
    I: IntoIterator<Item = U>,
    U: ToPrimitive,
{
    let mut e = Encoder::new();
    e.emit_tagged(value, tags)?;
    Ok(e.build())
}

macro_rules! impl_stream_emit_functions {
    ($(( $method:ident, $stream_type:ident)),*) => {
        $(
            pub fn $method<F>(f: F) -> Result<Vec<u8>, Error>
            where
                F: FnOnce(&mut $stream_type<Vec<u8>>) -> Result<(), Error>,
            {
                let mut e = Encoder::new();
                e.$method(f)?;
                Ok(e.build())
            }
        )*
    };
}

impl_stream_emit_functions!(
    (emit_byte_stream, ByteStream),
    (emit_text_stream, TextStream)
);

macro_rules! impl_collection_emit_functions {
    ($(( $method:ident, $collection_type:ident)),*) => {
        $(
            pub fn $method<F>(count: Option<usize>, f: F) -> Result<Vec<u8>, Error>
            where
                F: FnOnce(&mut $collection_type<Vec<u8>>) -> Result<(), Error>,
            {
                let mut e = Encoder::new();
                e.$method(count, f)?;
                Ok(e.build())
            }
        )*
    };
}

impl_collection_emit_functions!((emit_array, Array), (emit_map, Map));
