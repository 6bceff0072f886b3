#![expect(missing_docs)]

use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};

use rstest::rstest;
use strio::{ByteString, Stream};

#[test]
fn copy_between_streams() {
    let src = Stream::from_string("copied through std::io\n");
    let dst = Stream::new();
    let n = io::copy(&mut &src, &mut &dst).unwrap();
    assert_eq!(n, 23);
    assert_eq!(dst.string().unwrap(), "copied through std::io\n");
    assert!(src.eof().unwrap());
}

#[test]
fn read_to_string_from_cursor() {
    let mut io = Stream::from_string("skip:keep");
    Seek::seek(&mut io, SeekFrom::Start(5)).unwrap();
    let mut out = String::new();
    io.read_to_string(&mut out).unwrap();
    assert_eq!(out, "keep");
}

#[rstest]
#[case::from_start(SeekFrom::Start(2), 2, "cdef")]
#[case::from_end(SeekFrom::End(-2), 4, "ef")]
#[case::past_end(SeekFrom::End(3), 9, "")]
#[case::from_current(SeekFrom::Current(1), 2, "cdef")]
fn seek_from(#[case] target: SeekFrom, #[case] pos: u64, #[case] rest: &str) {
    let mut io = Stream::from_string("abcdef");
    io.getbyte().unwrap();
    assert_eq!(Seek::seek(&mut io, target).unwrap(), pos);
    let mut out = Vec::new();
    io.read_to_end(&mut out).unwrap();
    assert_eq!(out, rest.as_bytes());
}

#[test]
fn negative_seek_is_invalid_input() {
    let mut io = Stream::from_string("abc");
    let err = Seek::seek(&mut io, SeekFrom::End(-4)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    assert_eq!(io.pos().unwrap(), 0);
}

#[test]
fn buffered_lines() {
    let io = Stream::from_string("alpha\nbeta\r\ngamma");
    let lines: Vec<String> = BufReader::new(&io).lines().map(Result::unwrap).collect();
    assert_eq!(lines, ["alpha", "beta", "gamma"]);
}

#[test]
fn formatted_write_lands_at_cursor() {
    let mut io = Stream::from_string(ByteString::binary(b"0123456789".to_vec()));
    Seek::seek(&mut io, SeekFrom::Start(8)).unwrap();
    Write::write_fmt(&mut io, format_args!("{}-{}", 'a', 'b')).unwrap();
    Write::flush(&mut io).unwrap();
    assert_eq!(io.string().unwrap().as_bytes(), b"01234567a-b");
}

#[test]
fn closed_write_side_is_permission_denied() {
    let io = Stream::from_string("abc");
    io.close_write().unwrap();
    let err = Write::write(&mut &io, b"x").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
}

#[test]
fn read_on_empty_buffer_is_zero() {
    let mut io = Stream::new();
    let mut buf = [0_u8; 4];
    assert_eq!(Read::read(&mut io, &mut buf).unwrap(), 0);
    assert_eq!(Read::read(&mut io, &mut []).unwrap(), 0);
}
