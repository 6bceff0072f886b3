#![allow(missing_docs)]
#![allow(dead_code)]

use strio::{ByteString, LineOptions, Stream};

/// Every remaining record, as raw bytes.
pub fn records(io: &Stream, options: &LineOptions) -> Vec<Vec<u8>> {
    io.readlines(options)
        .expect("readlines")
        .into_iter()
        .map(ByteString::into_bytes)
        .collect()
}

/// Reference record splitter for a separator of two or more bytes.
pub fn split_on(data: &[u8], sep: &[u8], chomp: bool) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        if let Some(i) = rest.windows(sep.len()).position(|w| w == sep) {
            let next = i + sep.len();
            out.push(rest[..if chomp { i } else { next }].to_vec());
            rest = &rest[next..];
        } else {
            out.push(rest.to_vec());
            break;
        }
    }
    out
}

/// Maps arbitrary bytes onto a tiny alphabet so separators actually occur.
pub fn squash(bytes: &[u8], alphabet: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .map(|b| alphabet[usize::from(*b) % alphabet.len()])
        .collect()
}
