//! Channel type descriptor decoding.
//!
//! IIO describes every scan element with a descriptor such as
//! `le:s12/16>>4`: endianness, signedness, real bits, storage bits and a
//! right shift. Storage bits fix the channel's footprint in the device
//! report; the rest tells how to pull a value out of those bytes.

use std::fmt;

/// Decoded channel type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    /// Big-endian storage (`be:`), little-endian otherwise
    pub big_endian: bool,
    /// Two's complement value (`s`), unsigned otherwise (`u`)
    pub signed: bool,
    /// Significant bits
    pub realbits: u8,
    /// Bits occupied in the report
    pub storagebits: u8,
    /// Right shift applied before masking
    pub shift: u8,
    /// Number of repeated elements (`X<n>`, 1 when absent)
    pub repeat: u8,
}

impl TypeSpec {
    /// Parse a descriptor string. Returns `None` when malformed.
    pub fn parse(spec: &str) -> Option<Self> {
        let (endian, rest) = spec.trim().split_once(':')?;
        let big_endian = match endian {
            "le" => false,
            "be" => true,
            _ => return None,
        };

        let mut chars = rest.chars();
        let signed = match chars.next()? {
            's' | 'S' => true,
            'u' | 'U' => false,
            _ => return None,
        };
        let rest = chars.as_str();

        let (bits, shift) = match rest.split_once(">>") {
            Some((bits, shift)) => (bits, shift.parse::<u8>().ok()?),
            None => (rest, 0),
        };
        let (realbits, storage) = bits.split_once('/')?;
        let realbits = realbits.parse::<u8>().ok()?;
        let (storagebits, repeat) = match storage.split_once('X') {
            Some((storage, repeat)) => (storage.parse::<u8>().ok()?, repeat.parse::<u8>().ok()?),
            None => (storage.parse::<u8>().ok()?, 1),
        };

        if !matches!(storagebits, 8 | 16 | 32 | 64) || repeat == 0 {
            return None;
        }
        if realbits == 0 || u16::from(realbits) + u16::from(shift) > u16::from(storagebits) {
            return None;
        }

        Some(Self {
            big_endian,
            signed,
            realbits,
            storagebits,
            shift,
            repeat,
        })
    }

    /// Bytes occupied by the channel in the device report.
    pub const fn size(&self) -> usize {
        (self.storagebits as usize / 8) * self.repeat as usize
    }

    /// Extract the value of the first element from its storage bytes.
    ///
    /// Returns `None` if `raw` is shorter than one element.
    pub fn decode(&self, raw: &[u8]) -> Option<i64> {
        let width = self.storagebits as usize / 8;
        let bytes = raw.get(..width)?;

        let mut word: u64 = 0;
        if self.big_endian {
            for &b in bytes {
                word = (word << 8) | u64::from(b);
            }
        } else {
            for &b in bytes.iter().rev() {
                word = (word << 8) | u64::from(b);
            }
        }

        word >>= self.shift;
        if self.realbits < 64 {
            word &= (1u64 << self.realbits) - 1;
        }

        if self.signed && self.realbits < 64 {
            let sign_shift = 64 - u32::from(self.realbits);
            Some(((word << sign_shift) as i64) >> sign_shift)
        } else {
            Some(word as i64)
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}{}/{}",
            if self.big_endian { "be" } else { "le" },
            if self.signed { 's' } else { 'u' },
            self.realbits,
            self.storagebits
        )?;
        if self.repeat > 1 {
            write!(f, "X{}", self.repeat)?;
        }
        write!(f, ">>{}", self.shift)
    }
}
