//! Terminal Status & Config (C8): status lifecycle, config id, supply
//! counters, and host-supplied configuration.

use serde::{Deserialize, Serialize};

/// Default config id installed by [TerminalState::init_counters] when the
/// `Settings` collaborator has no stored value yet (§4.8).
pub const DEFAULT_CONFIG_ID: &str = "0000";

/// Default displayed screen used by [TerminalState::set_status] when no
/// host-supplied `initial_screen_number` has been loaded (§4.8).
pub const DEFAULT_STATUS_SCREEN: &str = "001";

/// Default starting screen used by `Go in-service` when no host-supplied
/// `initial_screen_number` has been loaded (§4.7). Distinct from
/// [DEFAULT_STATUS_SCREEN]: these two fallbacks are pinned independently
/// for their two call sites, not reconciled into one shared default.
pub const DEFAULT_IN_SERVICE_SCREEN: &str = "000";

/// One of the five terminal statuses (§3). Drives default screen
/// selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum TerminalStatus {
    Offline,
    Connected,
    InService,
    OutOfService,
    ProcessingCard,
}

impl Default for TerminalStatus {
    fn default() -> Self {
        Self::Offline
    }
}

/// Host-supplied configuration, populated by Enhanced Configuration Data
/// Load (§3, §4.7).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostConfig {
    initial_screen_number: Option<String>,
    hardware_configuration: String,
    sensor_status: String,
}

impl HostConfig {
    pub fn initial_screen_number(&self) -> Option<&str> {
        self.initial_screen_number.as_deref()
    }

    pub fn hardware_configuration(&self) -> &str {
        &self.hardware_configuration
    }

    pub fn sensor_status(&self) -> &str {
        &self.sensor_status
    }

    /// Apply one `{id, value}` Enhanced Configuration Data Load parameter.
    /// Unrecognized ids are logged and ignored (§4.7).
    pub fn apply_param(&mut self, id: &str, value: &str) {
        match id {
            "000" => self.initial_screen_number = Some(format!("{value:0>3}")),
            "010" => self.hardware_configuration = value.to_string(),
            "020" => self.sensor_status = value.to_string(),
            other => log::warn!("unrecognized enhanced configuration parameter id: {other}"),
        }
    }
}

/// Width, in decimal digits, of each [SupplyCounters] field (§3).
pub mod width {
    pub const TSN: usize = 4;
    pub const TRANSACTION_COUNT: usize = 7;
    pub const NOTES_IN_CASSETTES: usize = 20;
    pub const NOTES_REJECTED: usize = 20;
    pub const NOTES_DISPENSED: usize = 20;
    pub const LAST_TRXN_NOTES_DISPENSED: usize = 20;
    pub const CARD_CAPTURED: usize = 5;
    pub const ENVELOPES_DEPOSITED: usize = 5;
    pub const CAMERA_FILM_REMAINING: usize = 5;
    pub const LAST_ENVELOPE_SERIAL: usize = 5;
}

/// Zero-pad `n` to `width` decimal digits, wrapping modulo `10^width`
/// (§3: "widths never shrink; arithmetic is modulo-width with zero-pad
/// left").
fn fixed_width(n: u128, width: usize) -> String {
    let modulus = 10u128.pow(width as u32);
    format!("{:0>width$}", n % modulus, width = width)
}

fn increment(current: &str, width: usize, delta: u64) -> String {
    let n: u128 = current.parse().unwrap_or(0);
    fixed_width(n + delta as u128, width)
}

/// Fixed-width decimal supply counters (§3). Wire shape used in
/// `Send Supply Counters` terminal-state replies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyCountersData {
    pub tsn: String,
    pub transaction_count: String,
    pub notes_in_cassettes: String,
    pub notes_rejected: String,
    pub notes_dispensed: String,
    pub last_trxn_notes_dispensed: String,
    pub card_captured: String,
    pub envelopes_deposited: String,
    pub camera_film_remaining: String,
    pub last_envelope_serial: String,
}

impl Default for SupplyCountersData {
    fn default() -> Self {
        Self {
            tsn: fixed_width(0, width::TSN),
            transaction_count: fixed_width(0, width::TRANSACTION_COUNT),
            notes_in_cassettes: fixed_width(0, width::NOTES_IN_CASSETTES),
            notes_rejected: fixed_width(0, width::NOTES_REJECTED),
            notes_dispensed: fixed_width(0, width::NOTES_DISPENSED),
            last_trxn_notes_dispensed: fixed_width(0, width::LAST_TRXN_NOTES_DISPENSED),
            card_captured: fixed_width(0, width::CARD_CAPTURED),
            envelopes_deposited: fixed_width(0, width::ENVELOPES_DEPOSITED),
            camera_film_remaining: fixed_width(0, width::CAMERA_FILM_REMAINING),
            last_envelope_serial: fixed_width(0, width::LAST_ENVELOPE_SERIAL),
        }
    }
}

impl SupplyCountersData {
    /// Increment `notes_dispensed` by `count`, modulo its 20-digit width
    /// (§4.7: "Transaction Reply Command ... increment
    /// `supply_counters.notes_dispensed` (modulo 20-digit width)").
    pub fn add_notes_dispensed(&mut self, count: u64) {
        self.notes_dispensed = increment(&self.notes_dispensed, width::NOTES_DISPENSED, count);
        self.last_trxn_notes_dispensed = fixed_width(count as u128, width::LAST_TRXN_NOTES_DISPENSED);
    }
}

/// Bundles [TerminalStatus], [HostConfig], and [SupplyCountersData] (C8).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TerminalState {
    status: TerminalStatus,
    config_id: String,
    host_config: HostConfig,
}

impl TerminalState {
    pub fn status(&self) -> TerminalStatus {
        self.status
    }

    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    pub fn host_config(&self) -> &HostConfig {
        &self.host_config
    }

    pub fn host_config_mut(&mut self) -> &mut HostConfig {
        &mut self.host_config
    }

    /// Screen to display for `Go in-service` (§4.7): the host-configured
    /// initial screen, or `'000'` if none has been loaded yet.
    pub fn in_service_screen(&self) -> String {
        self.host_config
            .initial_screen_number()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_IN_SERVICE_SCREEN.to_string())
    }

    /// Screen to display when transitioning to [TerminalStatus::Offline] or
    /// [TerminalStatus::OutOfService] (§4.8): the host-configured initial
    /// screen, or `'001'` if none has been loaded yet.
    pub fn status_screen(&self) -> String {
        self.host_config
            .initial_screen_number()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_STATUS_SCREEN.to_string())
    }

    /// Update the status. Returns the screen number the caller should
    /// display, if the new status calls for one (§4.8: only `Offline` and
    /// `OutOfService` reset the displayed screen).
    pub fn set_status(&mut self, status: TerminalStatus) -> Option<String> {
        self.status = status;
        match status {
            TerminalStatus::Offline | TerminalStatus::OutOfService => Some(self.status_screen()),
            _ => None,
        }
    }

    pub fn set_config_id<S: Into<String>>(&mut self, id: S) {
        self.config_id = id.into();
    }
}
