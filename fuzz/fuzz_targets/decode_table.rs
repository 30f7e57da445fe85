#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    use tzcompact::{decode, encode, Config};

    if let Ok(table) = std::str::from_utf8(data) {
        if let Ok(list) = decode("Fuzz/Zone", table) {
            let _ = encode(&list, &Config::new());
        }
    }
});
