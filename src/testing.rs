//! In-memory fakes for the collaborator traits (§9: "tests provide fakes").
//!
//! Only compiled for tests; nothing here is part of the crate's public
//! surface.

#![cfg(test)]

use std::collections::HashMap;

use crate::collaborators::{Collaborators, Crypto, Display, Fits, Hardware, Screen, Screens, Settings, States};
use crate::error::Result;
use crate::state::State;

#[derive(Default)]
pub struct FakeScreens {
    pub loaded: Vec<String>,
    pub reject_next: bool,
}

impl Screens for FakeScreens {
    fn add(&mut self, screen_data: &str) -> bool {
        if self.reject_next {
            self.reject_next = false;
            return false;
        }
        self.loaded.push(screen_data.to_string());
        true
    }

    fn parse_dynamic_screen_data(&self, raw: &str) -> Screen {
        Screen(raw.to_string())
    }

    fn parse_screen_display_update(&self, raw: &str) -> Screen {
        Screen(raw.to_string())
    }
}

#[derive(Default)]
pub struct FakeStates {
    pub table: HashMap<String, State>,
}

impl States for FakeStates {
    fn add(&mut self, _state_data: &str) -> bool {
        true
    }

    fn get(&self, number: &str) -> Option<State> {
        self.table.get(number).cloned()
    }
}

#[derive(Default)]
pub struct FakeFits {
    pub institutions: HashMap<String, String>,
    pub max_pin_lengths: HashMap<String, usize>,
}

impl Fits for FakeFits {
    fn add(&mut self, _data: &str) -> bool {
        true
    }

    fn institution_by_card_number(&self, pan: &str) -> Option<String> {
        self.institutions.get(pan).cloned()
    }

    fn max_pin_length(&self, pan: &str) -> Option<usize> {
        self.max_pin_lengths.get(pan).copied()
    }
}

pub struct FakeCrypto {
    pub reject_comms_key: bool,
}

impl FakeCrypto {
    pub const ENCRYPTED_PIN_BLOCK: &'static str = "DEADBEEFCAFEBABE";
}

impl Default for FakeCrypto {
    fn default() -> Self {
        Self {
            reject_comms_key: false,
        }
    }
}

impl Crypto for FakeCrypto {
    fn encrypted_pin(&self, _clear_pin: &str, _pan: &str) -> Result<String> {
        Ok(Self::ENCRYPTED_PIN_BLOCK.to_string())
    }

    fn set_comms_key(&mut self, _data: &[u8], _length: usize) -> bool {
        !self.reject_comms_key
    }
}

#[derive(Default)]
pub struct FakeDisplay {
    pub current_screen_number: Option<String>,
    pub inserted_text: Vec<String>,
}

impl Display for FakeDisplay {
    fn set_screen(&mut self, screen: &Screen) {
        self.current_screen_number = Some(screen.0.clone());
    }

    fn set_screen_by_number(&mut self, number: &str) {
        self.current_screen_number = Some(number.to_string());
    }

    fn insert_text(&mut self, text: &str, mask_char: Option<char>) {
        match mask_char {
            Some(c) => self.inserted_text.push(c.to_string().repeat(text.len())),
            None => self.inserted_text.push(text.to_string()),
        }
    }
}

pub struct FakeHardware;

impl Hardware for FakeHardware {
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
        "FAKE-HW".to_string()
    }
}

#[derive(Default)]
pub struct FakeSettings {
    pub store: HashMap<String, String>,
}

impl Settings for FakeSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.store.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.store.insert(key.to_string(), value);
    }
}

/// A fully-wired [Collaborators] bundle of fakes, suitable as a starting
/// point for unit and scenario tests.
pub fn fake_collaborators() -> Collaborators {
    Collaborators {
        screens: Box::new(FakeScreens::default()),
        states: Box::new(FakeStates::default()),
        fits: Box::new(FakeFits::default()),
        crypto: Box::new(FakeCrypto::default()),
        display: Box::new(FakeDisplay::default()),
        hardware: Box::new(FakeHardware),
        settings: Box::new(FakeSettings::default()),
    }
}
