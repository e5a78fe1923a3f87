#![no_main]

use libfuzzer_sys::fuzz_target;

use term_ebds::OpcodeBuffer;

fuzz_target!(|data: (usize, char, String)| {
    let (index, ch, template) = data;

    let mut buf = OpcodeBuffer::new();
    let _ = buf.set_at(index, ch);
    assert_eq!(buf.get().chars().count(), 8);

    buf.load_from_state(&template);
    assert_eq!(buf.get().chars().count(), 8);
});
