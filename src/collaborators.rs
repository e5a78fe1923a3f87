//! Capability traits for the external collaborators the terminal core relies
//! on (§6), plus the `Collaborators` bundle injected into [crate::Terminal]
//! at construction time.
//!
//! None of these traits are implemented by this crate beyond the fakes in
//! [crate::testing]: screen rendering, state-table parsing, FIT lookups,
//! cryptographic PIN-block construction, and hardware status are all
//! explicitly out of scope (§1).

use crate::error::Result;
use crate::state::State;

/// An opaque, renderable screen. The core never inspects its contents; it
/// only ever hands one to the `Display` collaborator or asks `Screens` to
/// parse one from raw wire bytes.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Screen(pub String);

/// Screen storage and parsing (§6: "Screens").
pub trait Screens {
    /// Load a screen definition. Returns `false` on a rejected load (e.g.
    /// malformed screen data), which the dispatcher turns into a Command
    /// Reject.
    fn add(&mut self, screen_data: &str) -> bool;

    /// Parse a dynamically-pushed screen (Interactive Transaction Response)
    /// from its raw wire representation.
    fn parse_dynamic_screen_data(&self, raw: &str) -> Screen;

    /// Parse a screen display update (Transaction Reply Command) from its
    /// raw wire representation.
    fn parse_screen_display_update(&self, raw: &str) -> Screen;
}

/// State-table storage (§6: "States").
pub trait States {
    /// Load a state table. Returns `false` on a rejected load.
    fn add(&mut self, state_data: &str) -> bool;

    /// Look up a state by its 3-digit number.
    fn get(&self, number: &str) -> Option<State>;
}

/// Financial Institution Table lookups (§6: "FITs").
pub trait Fits {
    /// Load a FIT. Returns `false` on a rejected load.
    fn add(&mut self, data: &str) -> bool;

    /// Institution ID for a PAN, if the table has a matching range.
    fn institution_by_card_number(&self, pan: &str) -> Option<String>;

    /// Maximum accepted PIN length for a PAN, if policy is configured.
    fn max_pin_length(&self, pan: &str) -> Option<usize>;
}

/// Cryptographic operations (§6: "Crypto"). Key storage and PIN-block
/// construction are both external; the core only calls through this seam.
pub trait Crypto {
    /// Derive an encrypted PIN block from a clear PIN and PAN.
    fn encrypted_pin(&self, clear_pin: &str, pan: &str) -> Result<String>;

    /// Install a new communications key, enciphered under the current
    /// master key. Returns `false` on rejection.
    fn set_comms_key(&mut self, data: &[u8], length: usize) -> bool;
}

/// Screen rendering (§6: "Display").
pub trait Display {
    fn set_screen(&mut self, screen: &Screen);
    fn set_screen_by_number(&mut self, number: &str);
    fn insert_text(&mut self, text: &str, mask_char: Option<char>);
}

/// Hardware status reporting (§6: "Hardware").
pub trait Hardware {
    fn hardware_fitness(&self) -> String;
    fn supplies_status(&self) -> String;
    fn release_number(&self) -> String;
    fn hardware_id(&self) -> String;
}

/// Persisted key/value storage (§6: "Settings"). At minimum the keys
/// `host.luno`, `message_coordination_number`, and `config_id` are read and
/// written by the core (§5: "Shared resources").
pub trait Settings {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// The full set of collaborators a [crate::Terminal] is constructed with.
///
/// Each is a boxed trait object: the terminal owns them exclusively and
/// accesses them only from the single driver thread (§5).
pub struct Collaborators {
    pub screens: Box<dyn Screens>,
    pub states: Box<dyn States>,
    pub fits: Box<dyn Fits>,
    pub crypto: Box<dyn Crypto>,
    pub display: Box<dyn Display>,
    pub hardware: Box<dyn Hardware>,
    pub settings: Box<dyn Settings>,
}
