use super::*;
use alloc::{collections::BTreeMap, string::String, vec::Vec};
use header::{ItemHeader, Major, parse_header};
use tessera_io::SliceReader;

/// Counts read off the wire are trusted this far when pre-allocating.
const MAX_PREALLOC: u64 = 64;

/// A type that can be read from one CBOR item.
///
/// On success exactly the bytes of that item have been consumed. On error the
/// stream position is unspecified and the stream should not be reused.
pub trait FromCbor: Sized {
    type Error: From<Error>;

    fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error>;
}

/// Owned contents of a byte string, definite or chunked.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteBuf(pub Vec<u8>);

/// Any single item, discarded unread.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Ignored;

/// A value with the tags that preceded it, outermost first.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tagged<T> {
    pub tags: Vec<u64>,
    pub value: T,
}

pub fn from_reader<T, R>(input: &mut R) -> Result<T, T::Error>
where
    T: FromCbor,
    R: Read + ?Sized,
{
    T::from_cbor(input)
}

/// Decode the item at the start of `data`, returning it with its encoded length.
pub fn parse_detail<T>(data: &[u8]) -> Result<(T, usize), T::Error>
where
    T: FromCbor,
{
    let mut input = SliceReader::new(data);
    let value = T::from_cbor(&mut input)?;
    Ok((value, input.position()))
}

/// Decode the item at the start of `data`; anything after it is ignored.
pub fn parse<T>(data: &[u8]) -> Result<T, T::Error>
where
    T: FromCbor,
{
    parse_detail(data).map(|(v, _)| v)
}

fn mismatch(expected: &'static str, header: &ItemHeader) -> Error {
    Error::ItemTypeMismatch {
        expected,
        found: header.lead(),
    }
}

fn peek<R: Read + ?Sized>(input: &mut R) -> Result<u8, Error> {
    Ok(input.lease(1)?[0])
}

/// Consume a break if one is next.
fn at_break<R: Read + ?Sized>(input: &mut R) -> Result<bool, Error> {
    if peek(input)? == header::BREAK {
        input.consume(1)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

macro_rules! impl_uint_from_cbor {
    ($($ty:ty),*) => {
        $(
            impl FromCbor for $ty {
                type Error = Error;

                fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
                    let header = parse_header(input)?;
                    if header.major() != Major::Unsigned {
                        return Err(mismatch("Unsigned Integer", &header));
                    }
                    <$ty>::try_from(header.argument()).map_err(|_| Error::ItemValueOutOfRange)
                }
            }
        )*
    };
}

impl_uint_from_cbor!(u8, u16, u32, u64, usize);

macro_rules! impl_int_from_cbor {
    ($($ty:ty),*) => {
        $(
            impl FromCbor for $ty {
                type Error = Error;

                fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
                    let header = parse_header(input)?;
                    // Unsigned and Negative differ only in the lowest major bit
                    if (header.lead() >> 5) & !1 != 0 {
                        return Err(mismatch("Integer", &header));
                    }
                    if header.argument() > <$ty>::MAX as u64 {
                        return Err(Error::ItemValueOutOfRange);
                    }
                    // Smear that bit: all ones for Negative, so the xor yields -1 - n
                    let sign = ((((header.lead() as u64) << 58) as i64) >> 63) as u64;
                    Ok((header.argument() ^ sign) as $ty)
                }
            }
        )*
    };
}

impl_int_from_cbor!(i8, i16, i32, i64, isize);

impl FromCbor for bool {
    type Error = Error;

    fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
        let lead = peek(input)?;
        if lead & !1 != header::FALSE {
            return Err(Error::ItemTypeMismatch {
                expected: "Boolean",
                found: lead,
            });
        }
        input.consume(1)?;
        Ok(lead == header::TRUE)
    }
}

impl FromCbor for Null {
    type Error = Error;

    fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
        let lead = peek(input)?;
        if lead != header::NULL {
            return Err(Error::ItemTypeMismatch {
                expected: "Null",
                found: lead,
            });
        }
        input.consume(1)?;
        Ok(Null)
    }
}

/// `null` decodes as `None`; anything else must decode as `T`.
impl<T> FromCbor for Option<T>
where
    T: FromCbor,
{
    type Error = T::Error;

    fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
        if peek(input)? == header::NULL {
            input.consume(1).map_err(Error::from)?;
            return Ok(None);
        }
        T::from_cbor(input).map(Some)
    }
}

/// 2^e, for exponents within the normal double range.
fn exp2(e: i32) -> f64 {
    f64::from_bits(((e + 1023) as u64) << 52)
}

/// Widen an IEEE 754 binary16 bit pattern.
pub fn half_to_f64(bits: u16) -> f64 {
    let mantissa = bits & 0x3FF;
    let value = match (bits >> 10) & 0x1F {
        0 => mantissa as f64 * exp2(-24),
        0x1F if mantissa == 0 => f64::INFINITY,
        0x1F => f64::NAN,
        exponent => (mantissa + 0x400) as f64 * exp2(exponent as i32 - 25),
    };
    if bits & 0x8000 != 0 { -value } else { value }
}

enum Float {
    Half(u16),
    Single(f32),
    Double(f64),
}

fn parse_float<R: Read + ?Sized>(input: &mut R) -> Result<Float, Error> {
    let header = parse_header(input)?;
    match header.lead() {
        header::HALF_FLOAT => Ok(Float::Half(header.argument() as u16)),
        header::SINGLE_FLOAT => Ok(Float::Single(f32::from_bits(header.argument() as u32))),
        header::DOUBLE_FLOAT => Ok(Float::Double(f64::from_bits(header.argument()))),
        _ => Err(mismatch("Floating Point", &header)),
    }
}

impl FromCbor for f64 {
    type Error = Error;

    fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
        Ok(match parse_float(input)? {
            Float::Half(bits) => half_to_f64(bits),
            Float::Single(v) => v as f64,
            Float::Double(v) => v,
        })
    }
}

/// Half and single precision only; doubles are never narrowed.
impl FromCbor for f32 {
    type Error = Error;

    fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
        match parse_float(input)? {
            Float::Half(bits) => Ok(half_to_f64(bits) as f32),
            Float::Single(v) => Ok(v),
            Float::Double(_) => Err(Error::ItemValueOutOfRange),
        }
    }
}

impl FromCbor for half::f16 {
    type Error = Error;

    fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
        match parse_float(input)? {
            Float::Half(bits) => Ok(half::f16::from_bits(bits)),
            _ => Err(Error::ItemValueOutOfRange),
        }
    }
}

fn append_chunk<R: Read + ?Sized>(
    input: &mut R,
    len: u64,
    out: &mut Vec<u8>,
    check: fn(&[u8]) -> Result<(), Error>,
) -> Result<(), Error> {
    let len = usize::try_from(len).map_err(|_| Error::ItemValueOutOfRange)?;
    let chunk = input.lease(len)?;
    check(chunk)?;
    out.extend_from_slice(chunk);
    input.consume(len).map_err(Into::into)
}

/// Read a whole string of `major`, concatenating the chunks of an indefinite one.
fn parse_string<R: Read + ?Sized>(
    input: &mut R,
    major: Major,
    check: fn(&[u8]) -> Result<(), Error>,
) -> Result<Vec<u8>, Error> {
    let header = parse_header(input)?;
    if header.major() != major {
        return Err(mismatch(major.name(), &header));
    }

    let mut out = Vec::new();
    if let Some(len) = header.length() {
        append_chunk(input, len, &mut out, check)?;
        return Ok(out);
    }

    loop {
        let chunk = parse_header(input)?;
        if chunk.is_break() {
            return Ok(out);
        }
        if chunk.major() != major || chunk.is_indefinite() {
            return Err(Error::InvalidIndefiniteSubitem(chunk.lead()));
        }
        append_chunk(input, chunk.argument(), &mut out, check)?;
    }
}

impl FromCbor for ByteBuf {
    type Error = Error;

    fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
        parse_string(input, Major::Bytes, |_| Ok(())).map(ByteBuf)
    }
}

/// Each chunk of a chunked text string must be valid UTF-8 on its own.
impl FromCbor for String {
    type Error = Error;

    fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
        let bytes = parse_string(input, Major::Text, |chunk| {
            core::str::from_utf8(chunk)
                .map(|_| ())
                .map_err(|_| Error::InvalidUtf8)
        })?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
    }
}

/// Read an array or map header, then `f` once per element (or entry) until the
/// count runs out or, for an indefinite item, a break is found.
fn parse_sequence<R, E, F>(input: &mut R, major: Major, mut f: F) -> Result<(), E>
where
    R: Read + ?Sized,
    E: From<Error>,
    F: FnMut(&mut R) -> Result<(), E>,
{
    let header = parse_header(input)?;
    if header.major() != major {
        return Err(mismatch(major.name(), &header).into());
    }
    match header.length() {
        Some(count) => {
            for _ in 0..count {
                f(input)?;
            }
        }
        None => {
            while !at_break(input)? {
                f(input)?;
            }
        }
    }
    Ok(())
}

fn capacity_hint<R: Read + ?Sized>(input: &mut R) -> Result<usize, Error> {
    // Peeks the header that parse_sequence is about to consume
    let lead = peek(input)?;
    if lead & 0x1F < 24 {
        Ok((lead & 0x1F) as usize)
    } else {
        Ok(MAX_PREALLOC as usize)
    }
}

impl<T> FromCbor for Vec<T>
where
    T: FromCbor,
{
    type Error = T::Error;

    fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
        let mut values = Vec::with_capacity(capacity_hint(input)?);
        parse_sequence(input, Major::Array, |input| -> Result<(), T::Error> {
            values.push(T::from_cbor(input)?);
            Ok(())
        })?;
        Ok(values)
    }
}

/// Duplicate keys are accepted; the last value wins.
impl<K, V> FromCbor for BTreeMap<K, V>
where
    K: FromCbor + Ord,
    V: FromCbor<Error = K::Error>,
{
    type Error = K::Error;

    fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
        let mut map = BTreeMap::new();
        parse_sequence(input, Major::Map, |input| -> Result<(), K::Error> {
            let key = K::from_cbor(input)?;
            map.insert(key, V::from_cbor(input)?);
            Ok(())
        })?;
        Ok(map)
    }
}

impl FromCbor for Ignored {
    type Error = Error;

    fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
        skip::skip_item(input)?;
        Ok(Ignored)
    }
}

impl<T> FromCbor for Tagged<T>
where
    T: FromCbor,
{
    type Error = T::Error;

    fn from_cbor<R: Read + ?Sized>(input: &mut R) -> Result<Self, Self::Error> {
        let mut tags = Vec::new();
        while Major::from_lead(peek(input)?) == Major::Tag {
            tags.push(parse_header(input)?.argument());
        }
        Ok(Self {
            tags,
            value: T::from_cbor(input)?,
        })
    }
}
