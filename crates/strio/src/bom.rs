//! Byte-order-mark detection.

use crate::encoding::{EncodingRef, UTF_8, UTF_16BE, UTF_16LE, UTF_32BE, UTF_32LE};

/// Returns the encoding announced by a byte-order mark at the start of
/// `bytes`, with the length of the mark.
///
/// A prefix too short for a given mark simply does not match it.
pub(crate) fn detect_bom(bytes: &[u8]) -> Option<(EncodingRef, usize)> {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => Some((UTF_8, 3)),
        [0xFE, 0xFF, ..] => Some((UTF_16BE, 2)),
        [0xFF, 0xFE, 0x00, 0x00, ..] => Some((UTF_32LE, 4)),
        [0xFF, 0xFE, ..] => Some((UTF_16LE, 2)),
        [0x00, 0x00, 0xFE, 0xFF, ..] => Some((UTF_32BE, 4)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(&[0xEF, 0xBB, 0xBF, b'a'], "UTF-8", 3)]
    #[case(&[0xFE, 0xFF], "UTF-16BE", 2)]
    #[case(&[0xFF, 0xFE, b'a', 0x00], "UTF-16LE", 2)]
    #[case(&[0xFF, 0xFE, 0x00], "UTF-16LE", 2)]
    #[case(&[0xFF, 0xFE, 0x00, 0x00], "UTF-32LE", 4)]
    #[case(&[0x00, 0x00, 0xFE, 0xFF, 0x00], "UTF-32BE", 4)]
    fn detects_marks(#[case] bytes: &[u8], #[case] name: &str, #[case] len: usize) {
        let (enc, bom_len) = detect_bom(bytes).unwrap();
        assert_eq!(enc.name(), name);
        assert_eq!(bom_len, len);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[0xEF])]
    #[case(&[0xFE])]
    #[case(&[0xFF])]
    #[case(&[0x00])]
    #[case(&[0xEF, 0xBB])]
    #[case(&[0x00, 0x00, 0xFE])]
    #[case(b"abc")]
    fn short_or_plain_input_has_no_mark(#[case] bytes: &[u8]) {
        assert!(detect_bom(bytes).is_none());
    }
}
