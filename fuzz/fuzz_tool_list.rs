//! Fuzz target for both tool list passes.
//!
//! Run with: cargo +nightly fuzz run fuzz_tool_list
//!
//! The first byte picks the tool name; the rest is the document. Whatever the
//! input, loading must not panic, and a successful load may only mark
//! attributes the resolution pass asked for.

#![no_main]

use libfuzzer_sys::fuzz_target;
use scarfconv_config::tool_list::DuplicatePolicy;
use scarfconv_core::{AttributeLoader, MemorySource};

const TOOLS: [&str; 4] = ["ToolA", "ToolB", "generic", "default"];

fuzz_target!(|data: &[u8]| {
    let Some((&pick, document)) = data.split_first() else {
        return;
    };
    let tool = TOOLS[pick as usize % TOOLS.len()];
    let source = MemorySource::from_bytes(document);

    for policy in [DuplicatePolicy::Reject, DuplicatePolicy::Ignore] {
        let loader = AttributeLoader::new(Default::default(), policy);
        if let Ok(loaded) = loader.load(&source, tool) {
            let wanted = loaded.resolution.valid_attributes();
            for entry in loaded.registry.valid_entries() {
                assert!(wanted.iter().any(|name| name == entry.name()));
            }
        }
    }
});
