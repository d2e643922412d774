/*!
The item header: one lead byte carrying the major type and additional
information, followed by up to eight big-endian argument bytes.
*/

use super::*;

/// The special sub-codes, as complete lead bytes.
pub const FALSE: u8 = 0xF4;
pub const TRUE: u8 = 0xF5;
pub const NULL: u8 = 0xF6;
pub const HALF_FLOAT: u8 = 0xF9;
pub const SINGLE_FLOAT: u8 = 0xFA;
pub const DOUBLE_FLOAT: u8 = 0xFB;
pub const BREAK: u8 = 0xFF;

const INDEFINITE: u8 = 31;

/// The top three bits of a lead byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Major {
    Unsigned = 0,
    Negative = 1,
    Bytes = 2,
    Text = 3,
    Array = 4,
    Map = 5,
    Tag = 6,
    Special = 7,
}

impl Major {
    pub const fn from_lead(lead: u8) -> Self {
        match lead >> 5 {
            0 => Self::Unsigned,
            1 => Self::Negative,
            2 => Self::Bytes,
            3 => Self::Text,
            4 => Self::Array,
            5 => Self::Map,
            6 => Self::Tag,
            _ => Self::Special,
        }
    }

    /// Whether the indefinite-length marker is legal for this major type.
    pub const fn can_be_indefinite(self) -> bool {
        matches!(self, Self::Bytes | Self::Text | Self::Array | Self::Map)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Unsigned => "Unsigned Integer",
            Self::Negative => "Negative Integer",
            Self::Bytes => "Byte String",
            Self::Text => "Text String",
            Self::Array => "Array",
            Self::Map => "Map",
            Self::Tag => "Tag",
            Self::Special => "Simple Value",
        }
    }
}

/// A parsed item header.
///
/// For indefinite-length items the argument is zero and carries no meaning;
/// use [`ItemHeader::length`] rather than [`ItemHeader::argument`] when a count
/// is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemHeader {
    lead: u8,
    argument: u64,
    header_len: u8,
}

impl ItemHeader {
    pub fn lead(&self) -> u8 {
        self.lead
    }

    pub fn major(&self) -> Major {
        Major::from_lead(self.lead)
    }

    pub fn minor(&self) -> u8 {
        self.lead & 0x1F
    }

    /// The raw argument, before any sign transform.
    pub fn argument(&self) -> u64 {
        self.argument
    }

    /// Encoded size of the header itself: 1, 2, 3, 5 or 9.
    pub fn header_len(&self) -> usize {
        self.header_len as usize
    }

    /// True for indefinite-length strings and containers, and for break.
    pub fn is_indefinite(&self) -> bool {
        self.minor() == INDEFINITE
    }

    pub fn is_break(&self) -> bool {
        self.lead == BREAK
    }

    /// The length or count of a definite item, `None` if indefinite.
    pub fn length(&self) -> Option<u64> {
        (!self.is_indefinite()).then_some(self.argument)
    }
}

/// Parse one item header, leaving the stream positioned at the item's payload.
///
/// An empty stream reports the stream's own end-of-input error; a stream that
/// ends part way through the header is [`Error::MalformedHeader`].
pub fn parse_header<R: Read + ?Sized>(input: &mut R) -> Result<ItemHeader, Error> {
    let lead = input.lease(1)?[0];
    let ext = match lead & 0x1F {
        minor @ 0..=23 => {
            input.consume(1)?;
            return Ok(ItemHeader {
                lead,
                argument: minor as u64,
                header_len: 1,
            });
        }
        24 => 1,
        25 => 2,
        26 => 4,
        27 => 8,
        INDEFINITE if lead == BREAK || Major::from_lead(lead).can_be_indefinite() => {
            input.consume(1)?;
            return Ok(ItemHeader {
                lead,
                argument: 0,
                header_len: 1,
            });
        }
        _ => return Err(Error::MalformedHeader(lead)),
    };

    let mut be = [0u8; 8];
    let lease = input.lease(1 + ext).map_err(|e| match e {
        tessera_io::Error::EndOfInput => Error::MalformedHeader(lead),
        e => e.into(),
    })?;
    be[8 - ext..].copy_from_slice(&lease[1..]);
    input.consume(1 + ext)?;

    Ok(ItemHeader {
        lead,
        argument: u64::from_be_bytes(be),
        header_len: 1 + ext as u8,
    })
}

/// The header size [`write_header`] picks for `argument`.
pub const fn header_len_for(argument: u64) -> usize {
    if argument < 24 {
        1
    } else if argument <= u8::MAX as u64 {
        2
    } else if argument <= u16::MAX as u64 {
        3
    } else if argument <= u32::MAX as u64 {
        5
    } else {
        9
    }
}

/// Write a header in its shortest form.
pub fn write_header<W: Write + ?Sized>(out: &mut W, major: Major, argument: u64) -> Result<(), Error> {
    let len = header_len_for(argument);
    let minor = match len {
        1 => argument as u8,
        2 => 24,
        3 => 25,
        5 => 26,
        _ => 27,
    };
    let lease = out.lease_mut(len)?;
    lease[0] = ((major as u8) << 5) | minor;
    lease[1..].copy_from_slice(&argument.to_be_bytes()[9 - len..]);
    Ok(())
}

/// Open an indefinite-length string or container.
pub fn write_indefinite<W: Write + ?Sized>(out: &mut W, major: Major) -> Result<(), Error> {
    if !major.can_be_indefinite() {
        return Err(Error::ItemTypeMismatch {
            expected: "indefinite-length capable major type",
            found: (major as u8) << 5,
        });
    }
    write_lead(out, ((major as u8) << 5) | INDEFINITE)
}

/// Close an indefinite-length string or container.
pub fn write_break<W: Write + ?Sized>(out: &mut W) -> Result<(), Error> {
    write_lead(out, BREAK)
}

pub(crate) fn write_lead<W: Write + ?Sized>(out: &mut W, lead: u8) -> Result<(), Error> {
    out.lease_mut(1)?[0] = lead;
    Ok(())
}
