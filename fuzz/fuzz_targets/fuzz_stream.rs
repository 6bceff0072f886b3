#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use strio::{ByteString, LineOptions, Separator, Stream, StreamError, Whence};

#[derive(Debug, Arbitrary)]
enum Op {
    Read(Option<u8>),
    Getc,
    Getbyte,
    Gets { sep: Vec<u8>, limit: Option<u8>, chomp: bool },
    Ungetc(char),
    Ungetbyte(u8),
    Write(Vec<u8>),
    Seek(i16, u8),
    Truncate(u16),
    Pread(u8, u8),
    Lineno,
    CloseRead,
}

#[derive(Debug, Arbitrary)]
struct Input {
    initial: Vec<u8>,
    utf8: bool,
    ops: Vec<Op>,
}

fn run(input: Input) {
    let initial = if input.utf8 {
        ByteString::from(String::from_utf8_lossy(&input.initial).into_owned())
    } else {
        ByteString::binary(input.initial)
    };
    let io = Stream::from_string(initial);

    for op in input.ops {
        let before = io.pos().unwrap();
        let len = io.length().unwrap();
        match op {
            Op::Read(n) => {
                let got = io.read(n.map(i64::from)).unwrap();
                let taken = got.as_ref().map_or(0, ByteString::len);
                assert_eq!(io.pos().unwrap(), before + taken);
                assert!(taken <= len.saturating_sub(before));
            }
            Op::Getc => {
                if let Ok(Some(c)) = io.getc() {
                    assert!(!c.is_empty());
                    assert_eq!(io.pos().unwrap(), before + c.len());
                }
            }
            Op::Getbyte => {
                let got = io.getbyte().unwrap();
                assert_eq!(got.is_some(), before < len);
            }
            Op::Gets { sep, limit, chomp } => {
                let options = LineOptions {
                    separator: Separator::from_bytes(sep),
                    limit: limit.map(usize::from),
                    chomp,
                };
                if let Some(line) = io.gets(&options).unwrap() {
                    assert!(io.pos().unwrap() >= before);
                    assert!(line.len() <= io.pos().unwrap() - before);
                }
            }
            Op::Ungetc(c) => {
                let s = c.to_string();
                io.ungetc(s.as_str()).unwrap();
                assert_eq!(io.pos().unwrap(), before.saturating_sub(s.len()));
                assert!(io.length().unwrap() >= len);
            }
            Op::Ungetbyte(b) => {
                io.ungetbyte(b).unwrap();
                assert_eq!(io.string().unwrap().as_bytes()[io.pos().unwrap()], b);
            }
            Op::Write(data) => {
                let n = io.write(data.as_slice()).unwrap();
                assert_eq!(n, data.len());
                assert_eq!(io.pos().unwrap(), before + n);
            }
            Op::Seek(offset, whence) => {
                let whence = match whence % 3 {
                    0 => Whence::Start,
                    1 => Whence::Current,
                    _ => Whence::End,
                };
                match io.seek(i64::from(offset), whence) {
                    Ok(()) => {}
                    Err(StreamError::InvalidSeek(_)) => assert_eq!(io.pos().unwrap(), before),
                    Err(err) => panic!("unexpected seek error: {err:?}"),
                }
            }
            Op::Truncate(n) => {
                io.truncate(i64::from(n)).unwrap();
                assert_eq!(io.length().unwrap(), usize::from(n));
                assert_eq!(io.pos().unwrap(), before);
            }
            Op::Pread(n, offset) => match io.pread(i64::from(n), i64::from(offset)) {
                Ok(got) => {
                    let start = usize::from(offset).min(len);
                    let end = (start + usize::from(n)).min(len);
                    assert_eq!(got, &io.string().unwrap().as_bytes()[start..end]);
                    assert_eq!(io.pos().unwrap(), before);
                }
                Err(StreamError::EndOfFile) => assert!(usize::from(offset) >= len),
                Err(err) => panic!("unexpected pread error: {err:?}"),
            },
            Op::Lineno => {
                io.set_lineno(io.lineno().unwrap().wrapping_add(1)).unwrap();
            }
            Op::CloseRead => {
                io.close_read().unwrap();
                assert!(matches!(io.getbyte(), Err(StreamError::NotReadable)));
                return;
            }
        }
    }
}

fuzz_target!(|input: Input| run(input));
