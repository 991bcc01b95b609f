#![no_main]

use libfuzzer_sys::fuzz_target;
use shard39::combine_mnemonics;

fuzz_target!(|data: &[u8]| {
    // Split arbitrary input into candidate mnemonic lines and feed
    // them through the whole combine pipeline. Must never panic.
    if let Ok(s) = std::str::from_utf8(data) {
        let lines: Vec<&str> = s.lines().collect();
        let _ = combine_mnemonics(&lines, "fuzz");
    }
});
