#![no_main]

use libfuzzer_sys::fuzz_target;

use term_ebds::Card;

fuzz_target!(|data: &[u8]| {
    let Ok(track2) = std::str::from_utf8(data) else { return };

    if let Ok(card) = Card::parse(track2) {
        assert_eq!(card.service_code().len(), 3);
        assert_eq!(card.track2(), track2);
    }
});
