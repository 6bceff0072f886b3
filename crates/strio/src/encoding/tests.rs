use super::*;

#[test]
fn utf8_lengths_follow_lead_byte() {
    let text = "aé€😀".as_bytes();
    assert_eq!(UTF_8.codepoint_len(text, 0), Ok(1));
    assert_eq!(UTF_8.codepoint_len(text, 1), Ok(2));
    assert_eq!(UTF_8.codepoint_len(text, 3), Ok(3));
    assert_eq!(UTF_8.codepoint_len(text, 6), Ok(4));
    assert!(UTF_8.codepoint_len(&[0x80], 0).is_err());
    assert!(UTF_8.codepoint_len(&[0xC0], 0).is_err());
}

#[test]
fn utf8_decode_rejects_truncated_and_surrogates() {
    assert_eq!(UTF_8.decode_codepoint("é".as_bytes(), 0), Ok((0xE9, 2)));
    assert!(UTF_8.decode_codepoint(&[0xE2, 0x82], 0).is_err());
    // CESU-style encoded surrogate
    assert!(UTF_8.decode_codepoint(&[0xED, 0xA0, 0x80], 0).is_err());
}

#[test]
fn clamped_length_never_runs_past_end() {
    let text = "€".as_bytes();
    assert_eq!(UTF_8.char_len_clamped(text, 0, 3), 3);
    assert_eq!(UTF_8.char_len_clamped(text, 0, 2), 2);
    // stray continuation byte counts as one character
    assert_eq!(UTF_8.char_len_clamped(text, 1, 3), 1);
}

#[test]
fn right_adjust_moves_to_next_boundary() {
    let text = "a€b".as_bytes();
    assert_eq!(UTF_8.right_adjust_char_head(text, 0, 1, text.len()), 1);
    assert_eq!(UTF_8.right_adjust_char_head(text, 0, 2, text.len()), 4);
    assert_eq!(UTF_8.right_adjust_char_head(text, 0, 3, text.len()), 4);
    assert_eq!(UTF_8.right_adjust_char_head(text, 0, 9, 3), 3);
    assert_eq!(BINARY.right_adjust_char_head(text, 0, 2, text.len()), 2);
}

#[test]
fn utf16_surrogate_pairs() {
    let mut out = Vec::new();
    assert_eq!(UTF_16BE.encode_codepoint(0x1F600, &mut out), Ok(4));
    assert_eq!(out, [0xD8, 0x3D, 0xDE, 0x00]);
    assert_eq!(UTF_16BE.codepoint_len(&out, 0), Ok(4));
    assert_eq!(UTF_16BE.decode_codepoint(&out, 0), Ok((0x1F600, 4)));

    out.clear();
    UTF_16LE.encode_codepoint(u32::from('A'), &mut out).unwrap();
    assert_eq!(out, [0x41, 0x00]);
    assert!(!UTF_16LE.is_ascii_compatible());
}

#[test]
fn utf32_round_trips_scalar_values() {
    let mut out = Vec::new();
    UTF_32LE.encode_codepoint(0xE9, &mut out).unwrap();
    assert_eq!(out, [0xE9, 0, 0, 0]);
    assert_eq!(UTF_32LE.decode_codepoint(&out, 0), Ok((0xE9, 4)));
    assert!(UTF_32BE.encode_codepoint(0xD800, &mut out).is_err());
}

#[test]
fn ascii_and_binary_codepoint_ranges() {
    let mut out = Vec::new();
    assert!(US_ASCII.encode_codepoint(0x80, &mut out).is_err());
    assert_eq!(BINARY.encode_codepoint(0xFF, &mut out), Ok(1));
    assert!(BINARY.encode_codepoint(0x100, &mut out).is_err());
    assert!(BINARY.is_binary());
    assert!(!UTF_8.is_binary());
}

#[test]
fn find_accepts_aliases_in_any_case() {
    assert!(same(find("utf-8").unwrap(), UTF_8));
    assert!(same(find("binary").unwrap(), BINARY));
    assert!(same(find("ASCII").unwrap(), US_ASCII));
    assert!(same(find("utf-16le").unwrap(), UTF_16LE));
    assert!(find("EBCDIC").is_none());
}

#[test]
fn transcode_between_unicode_forms() {
    let utf16 = transcode("hé".as_bytes(), UTF_8, UTF_16BE).unwrap();
    assert_eq!(utf16, [0x00, b'h', 0x00, 0xE9]);
    let back = transcode(&utf16, UTF_16BE, UTF_8).unwrap();
    assert_eq!(back, "hé".as_bytes());
}

#[test]
fn transcode_reports_unmappable_codepoint() {
    let err = transcode("é".as_bytes(), UTF_8, US_ASCII).unwrap_err();
    assert_eq!(
        err,
        EncodingError::Undefined {
            codepoint: 0xE9,
            from: "UTF-8",
            to: "US-ASCII",
        }
    );
}

/// A two-byte-per-character test encoding whose lead bytes are `0x81..=0x9F`.
#[derive(Debug)]
struct Pairs;

impl Encoding for Pairs {
    fn name(&self) -> &'static str {
        "X-PAIRS"
    }

    fn codepoint_len(&self, bytes: &[u8], offset: usize) -> Result<usize, EncodingError> {
        Ok(if (0x81..=0x9F).contains(&bytes[offset]) { 2 } else { 1 })
    }

    fn decode_codepoint(&self, bytes: &[u8], offset: usize) -> Result<(u32, usize), EncodingError> {
        let len = self.codepoint_len(bytes, offset)?;
        let cp = bytes[offset..offset + len]
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
        Ok((cp, len))
    }

    fn encode_codepoint(&self, codepoint: u32, out: &mut Vec<u8>) -> Result<usize, EncodingError> {
        let b = u8::try_from(codepoint).map_err(|_| EncodingError::InvalidCodepoint {
            codepoint,
            encoding: self.name(),
        })?;
        out.push(b);
        Ok(1)
    }
}

#[test]
fn default_boundary_walk_uses_injected_lengths() {
    static PAIRS: Pairs = Pairs;
    let bytes = [b'a', 0x81, b'x', b'b'];
    assert_eq!(PAIRS.right_adjust_char_head(&bytes, 0, 2, bytes.len()), 3);
    assert_eq!(PAIRS.char_len_clamped(&bytes, 1, 2), 1);
}
