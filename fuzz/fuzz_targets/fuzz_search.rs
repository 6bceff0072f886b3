#![no_main]

use libfuzzer_sys::fuzz_target;
use strio::search::{find_horspool, find_naive};

fuzz_target!(|data: (Vec<u8>, Vec<u8>)| {
    let (haystack, needle) = data;
    if needle.len() < 2 {
        return;
    }
    assert_eq!(
        find_naive(&haystack, &needle),
        find_horspool(&haystack, &needle),
        "haystack={haystack:?} needle={needle:?}"
    );
});
