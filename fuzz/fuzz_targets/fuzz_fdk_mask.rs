#![no_main]

use libfuzzer_sys::fuzz_target;

use term_ebds::ActiveFdks;

fuzz_target!(|data: &[u8]| {
    let Ok(mask) = std::str::from_utf8(data) else { return };

    match ActiveFdks::parse(mask) {
        Ok(set) => {
            // Every FDK activated from a well-formed mask is in the closed
            // alphabet A..I (§8's ActiveFDKs subset invariant).
            for key in set.iter() {
                assert!(set.is_active(key));
            }
        }
        Err(_) => {}
    }
});
