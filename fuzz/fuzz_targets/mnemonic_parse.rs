#![no_main]

use libfuzzer_sys::fuzz_target;
use shard39::Share;

fuzz_target!(|data: &[u8]| {
    // Try parsing arbitrary bytes as a UTF-8 string, then as a share
    // mnemonic. from_mnemonic must never panic — it always returns
    // Ok or Err.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(share) = Share::from_mnemonic(s) {
            // Anything that parses must re-encode to a valid mnemonic.
            let reencoded = Share::from_mnemonic(&share.mnemonic()).unwrap();
            assert_eq!(reencoded, share);
        }
    }
});
