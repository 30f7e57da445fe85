#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    use tzcompact::{compile_batch, parse_sources, Config};

    if let Ok(text) = std::str::from_utf8(data) {
        let config = Config::new().with_years(1990, 2000);

        if let Ok(tz_data) = parse_sources([("fuzz", text)], &config) {
            let _ = compile_batch(&tz_data, &config, None, None);
        }
    }
});
