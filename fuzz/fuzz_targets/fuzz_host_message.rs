#![no_main]

use std::collections::HashMap;

use libfuzzer_sys::fuzz_target;

use term_ebds::{Collaborators, Crypto, Display, Fits, HostMessage, Reply, Screen, Screens, States, Terminal};
use term_ebds::State;

struct NullScreens;
impl Screens for NullScreens {
    fn add(&mut self, _screen_data: &str) -> bool {
        true
    }
    fn parse_dynamic_screen_data(&self, raw: &str) -> Screen {
        Screen(raw.to_string())
    }
    fn parse_screen_display_update(&self, raw: &str) -> Screen {
        Screen(raw.to_string())
    }
}

struct NullStates;
impl States for NullStates {
    fn add(&mut self, _state_data: &str) -> bool {
        true
    }
    fn get(&self, _number: &str) -> Option<State> {
        None
    }
}

struct NullFits;
impl Fits for NullFits {
    fn add(&mut self, _data: &str) -> bool {
        true
    }
    fn institution_by_card_number(&self, _pan: &str) -> Option<String> {
        None
    }
    fn max_pin_length(&self, _pan: &str) -> Option<usize> {
        None
    }
}

struct NullCrypto;
impl Crypto for NullCrypto {
    fn encrypted_pin(&self, _clear_pin: &str, _pan: &str) -> term_ebds::Result<String> {
        Ok("0000000000000000".to_string())
    }
    fn set_comms_key(&mut self, _data: &[u8], _length: usize) -> bool {
        true
    }
}

struct NullDisplay;
impl Display for NullDisplay {
    fn set_screen(&mut self, _screen: &Screen) {}
    fn set_screen_by_number(&mut self, _number: &str) {}
    fn insert_text(&mut self, _text: &str, _mask_char: Option<char>) {}
}

struct NullHardware;
impl term_ebds::Hardware for NullHardware {
    fn hardware_fitness(&self) -> String {
        "OK".to_string()
    }
    fn supplies_status(&self) -> String {
        "OK".to_string()
    }
    fn release_number(&self) -> String {
        "1.0.0".to_string()
    }
    fn hardware_id(&self) -> String {
        "FUZZ-HW".to_string()
    }
}

#[derive(Default)]
struct MapSettings(HashMap<String, String>);
impl term_ebds::Settings for MapSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
    fn set(&mut self, key: &str, value: String) {
        self.0.insert(key.to_string(), value);
    }
}

fn collaborators() -> Collaborators {
    Collaborators {
        screens: Box::new(NullScreens),
        states: Box::new(NullStates),
        fits: Box::new(NullFits),
        crypto: Box::new(NullCrypto),
        display: Box::new(NullDisplay),
        hardware: Box::new(NullHardware),
        settings: Box::new(MapSettings::default()),
    }
}

fuzz_target!(|message: HostMessage| {
    let mut terminal = Terminal::new(collaborators());
    let reply: Reply = terminal.process_host_message(message);
    // Any reply must round-trip through its own Display impl without panicking.
    let _ = reply.to_string();
});
