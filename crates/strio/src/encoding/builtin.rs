use super::{Encoding, EncodingError};

const MAX_CODEPOINT: u32 = 0x10_FFFF;

fn is_surrogate(codepoint: u32) -> bool {
    (0xD800..=0xDFFF).contains(&codepoint)
}

fn invalid(encoding: &'static str, offset: usize) -> EncodingError {
    EncodingError::InvalidByteSequence { encoding, offset }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8;

impl Utf8 {
    fn lead_len(b0: u8) -> Option<usize> {
        match b0 {
            0x00..=0x7F => Some(1),
            0xC2..=0xDF => Some(2),
            0xE0..=0xEF => Some(3),
            0xF0..=0xF4 => Some(4),
            _ => None,
        }
    }
}

impl Encoding for Utf8 {
    fn name(&self) -> &'static str {
        "UTF-8"
    }

    fn codepoint_len(&self, bytes: &[u8], offset: usize) -> Result<usize, EncodingError> {
        Utf8::lead_len(bytes[offset]).ok_or_else(|| invalid(self.name(), offset))
    }

    fn decode_codepoint(&self, bytes: &[u8], offset: usize) -> Result<(u32, usize), EncodingError> {
        let len = self.codepoint_len(bytes, offset)?;
        let seq = bytes
            .get(offset..offset + len)
            .ok_or_else(|| invalid(self.name(), offset))?;
        // Let core do the overlong/surrogate/continuation checks.
        let s = core::str::from_utf8(seq).map_err(|_| invalid(self.name(), offset))?;
        let ch = s.chars().next().ok_or_else(|| invalid(self.name(), offset))?;
        Ok((u32::from(ch), len))
    }

    fn encode_codepoint(&self, codepoint: u32, out: &mut Vec<u8>) -> Result<usize, EncodingError> {
        let ch = char::from_u32(codepoint).ok_or(EncodingError::InvalidCodepoint {
            codepoint,
            encoding: self.name(),
        })?;
        let mut tmp = [0u8; 4];
        let s = ch.encode_utf8(&mut tmp);
        out.extend_from_slice(s.as_bytes());
        Ok(s.len())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UsAscii;

impl Encoding for UsAscii {
    fn name(&self) -> &'static str {
        "US-ASCII"
    }

    fn codepoint_len(&self, _bytes: &[u8], _offset: usize) -> Result<usize, EncodingError> {
        Ok(1)
    }

    fn decode_codepoint(&self, bytes: &[u8], offset: usize) -> Result<(u32, usize), EncodingError> {
        match bytes[offset] {
            b @ 0x00..=0x7F => Ok((u32::from(b), 1)),
            _ => Err(invalid(self.name(), offset)),
        }
    }

    fn encode_codepoint(&self, codepoint: u32, out: &mut Vec<u8>) -> Result<usize, EncodingError> {
        match u8::try_from(codepoint) {
            Ok(b) if b.is_ascii() => {
                out.push(b);
                Ok(1)
            }
            _ => Err(EncodingError::InvalidCodepoint {
                codepoint,
                encoding: self.name(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Binary;

impl Encoding for Binary {
    fn name(&self) -> &'static str {
        "ASCII-8BIT"
    }

    fn codepoint_len(&self, _bytes: &[u8], _offset: usize) -> Result<usize, EncodingError> {
        Ok(1)
    }

    fn decode_codepoint(&self, bytes: &[u8], offset: usize) -> Result<(u32, usize), EncodingError> {
        Ok((u32::from(bytes[offset]), 1))
    }

    fn encode_codepoint(&self, codepoint: u32, out: &mut Vec<u8>) -> Result<usize, EncodingError> {
        let b = u8::try_from(codepoint).map_err(|_| EncodingError::InvalidCodepoint {
            codepoint,
            encoding: self.name(),
        })?;
        out.push(b);
        Ok(1)
    }

    fn is_binary(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Utf16 {
    pub big_endian: bool,
}

impl Utf16 {
    fn unit(self, bytes: &[u8], at: usize) -> Option<u16> {
        let pair = [*bytes.get(at)?, *bytes.get(at + 1)?];
        Some(if self.big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        })
    }

    fn push_unit(self, unit: u16, out: &mut Vec<u8>) {
        if self.big_endian {
            out.extend_from_slice(&unit.to_be_bytes());
        } else {
            out.extend_from_slice(&unit.to_le_bytes());
        }
    }
}

impl Encoding for Utf16 {
    fn name(&self) -> &'static str {
        if self.big_endian { "UTF-16BE" } else { "UTF-16LE" }
    }

    fn codepoint_len(&self, bytes: &[u8], offset: usize) -> Result<usize, EncodingError> {
        // The high byte decides; for little-endian it is the second one.
        let high = if self.big_endian {
            bytes.get(offset).copied()
        } else {
            bytes.get(offset + 1).copied()
        };
        match high {
            Some(0xD8..=0xDB) => Ok(4),
            _ => Ok(2),
        }
    }

    fn decode_codepoint(&self, bytes: &[u8], offset: usize) -> Result<(u32, usize), EncodingError> {
        let lead = self.unit(bytes, offset).ok_or_else(|| invalid(self.name(), offset))?;
        match lead {
            0xD800..=0xDBFF => {
                let trail = self
                    .unit(bytes, offset + 2)
                    .filter(|t| (0xDC00..=0xDFFF).contains(t))
                    .ok_or_else(|| invalid(self.name(), offset))?;
                let codepoint =
                    0x1_0000 + ((u32::from(lead) - 0xD800) << 10) + (u32::from(trail) - 0xDC00);
                Ok((codepoint, 4))
            }
            0xDC00..=0xDFFF => Err(invalid(self.name(), offset)),
            _ => Ok((u32::from(lead), 2)),
        }
    }

    fn encode_codepoint(&self, codepoint: u32, out: &mut Vec<u8>) -> Result<usize, EncodingError> {
        if codepoint > MAX_CODEPOINT || is_surrogate(codepoint) {
            return Err(EncodingError::InvalidCodepoint {
                codepoint,
                encoding: self.name(),
            });
        }
        if let Ok(unit) = u16::try_from(codepoint) {
            self.push_unit(unit, out);
            return Ok(2);
        }
        let v = codepoint - 0x1_0000;
        // Both halves fit in 10 bits by construction.
        #[allow(clippy::cast_possible_truncation)]
        let (hi, lo) = (0xD800 + (v >> 10) as u16, 0xDC00 + (v & 0x3FF) as u16);
        self.push_unit(hi, out);
        self.push_unit(lo, out);
        Ok(4)
    }

    fn is_ascii_compatible(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Utf32 {
    pub big_endian: bool,
}

impl Encoding for Utf32 {
    fn name(&self) -> &'static str {
        if self.big_endian { "UTF-32BE" } else { "UTF-32LE" }
    }

    fn codepoint_len(&self, _bytes: &[u8], _offset: usize) -> Result<usize, EncodingError> {
        Ok(4)
    }

    fn decode_codepoint(&self, bytes: &[u8], offset: usize) -> Result<(u32, usize), EncodingError> {
        let quad: [u8; 4] = bytes
            .get(offset..offset + 4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| invalid(self.name(), offset))?;
        let codepoint = if self.big_endian {
            u32::from_be_bytes(quad)
        } else {
            u32::from_le_bytes(quad)
        };
        if codepoint > MAX_CODEPOINT || is_surrogate(codepoint) {
            return Err(invalid(self.name(), offset));
        }
        Ok((codepoint, 4))
    }

    fn encode_codepoint(&self, codepoint: u32, out: &mut Vec<u8>) -> Result<usize, EncodingError> {
        if codepoint > MAX_CODEPOINT || is_surrogate(codepoint) {
            return Err(EncodingError::InvalidCodepoint {
                codepoint,
                encoding: self.name(),
            });
        }
        if self.big_endian {
            out.extend_from_slice(&codepoint.to_be_bytes());
        } else {
            out.extend_from_slice(&codepoint.to_le_bytes());
        }
        Ok(4)
    }

    fn is_ascii_compatible(&self) -> bool {
        false
    }
}
