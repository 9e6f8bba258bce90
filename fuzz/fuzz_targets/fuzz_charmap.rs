#![no_main]
use std::error::Error;

use glyphmesh::{raw::FontRef, Charmap};
use libfuzzer_sys::fuzz_target;

/// Format 12 groups can cover the whole codespace.
const MAX_MAPPINGS: usize = 1 << 16;

fn do_charmap_things(data: &[u8]) -> Result<(), Box<dyn Error>> {
    let font = FontRef::new(data)?;
    let charmap = Charmap::new(&font);

    // we don't care about the result, just that we don't panic, hang, etc
    let _ = charmap.has_map();
    let _ = charmap.is_symbol();
    let _ = charmap.mapping_kind();
    for (cp, _) in charmap.mappings().take(MAX_MAPPINGS) {
        let _ = charmap.map(cp);
    }
    let _ = charmap.map(0xFFFFu32);
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let _ = do_charmap_things(data);
});
