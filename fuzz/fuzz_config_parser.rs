//! Fuzz target for the TOML configuration parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser
//!
//! Any config that validates must also yield a usable loader.

#![no_main]

use libfuzzer_sys::fuzz_target;
use scarfconv_core::{AttributeLoader, MemorySource};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = scarfconv_config::AppConfig::parse(s) {
        let loader = AttributeLoader::from_config(&config);
        let _ = loader.load(&MemorySource::new(r#"{"default": ["a"]}"#), "tool");
    }
});
