//! The top-level terminal instance: owns every buffer, the interpreter
//! context, and the injected [Collaborators] (§3, §5, §9).
//!
//! `Terminal` is the crate's one stateful type. There are no process-wide
//! singletons (§9's "Global mutable state" design note): every public
//! entry point takes `&mut self`, and the four entry points named in §5
//! (`process_host_message`, `read_card`, `process_pinpad_button_pressed`,
//! `process_fdk_button_pressed`) are assumed to run to completion without
//! overlap.

use crate::buffers::BufferSet;
use crate::card::Card;
use crate::collaborators::Collaborators;
use crate::fdk::{ActiveFdks, Fdk};
use crate::input::{Input, InputQueue};
use crate::interpreter::process_state;
use crate::jsonrpc::{HostMessage, Reply};
use crate::mcn::Mcn;
use crate::opcode::OpcodeBuffer;
use crate::terminal_status::{SupplyCountersData, TerminalState, TerminalStatus, DEFAULT_CONFIG_ID};

/// The terminal instance (§3: "Interpreter context" plus §4.8's status/
/// config bundle).
pub struct Terminal {
    pub(crate) status: TerminalState,
    pub(crate) supply_counters: SupplyCountersData,
    pub(crate) buffers: BufferSet,
    pub(crate) opcode: OpcodeBuffer,
    pub(crate) active_fdks: ActiveFdks,
    pub(crate) mcn: Mcn,
    pub(crate) card: Option<Card>,
    pub(crate) current_state: String,
    pub(crate) buttons_pressed: InputQueue,
    pub(crate) transaction_request: Option<Reply>,
    pub(crate) interactive_transaction: bool,
    pub(crate) collaborators: Collaborators,
}

impl Terminal {
    /// Construct a terminal at boot (§3: "Lifecycles ... Buffers are
    /// created at terminal boot").
    pub fn new(collaborators: Collaborators) -> Self {
        let mut terminal = Self {
            status: TerminalState::default(),
            supply_counters: SupplyCountersData::default(),
            buffers: BufferSet::new(),
            opcode: OpcodeBuffer::new(),
            active_fdks: ActiveFdks::none(),
            mcn: Mcn::unset(),
            card: None,
            current_state: crate::terminal_status::DEFAULT_IN_SERVICE_SCREEN.to_string(),
            buttons_pressed: InputQueue::new(),
            transaction_request: None,
            interactive_transaction: false,
            collaborators,
        };
        terminal.init_counters();
        terminal
    }

    /// §4.8: load `config_id` from settings (default `'0000'`) and install
    /// the static default supply counters.
    pub fn init_counters(&mut self) {
        let config_id = self
            .collaborators
            .settings
            .get("config_id")
            .unwrap_or_else(|| DEFAULT_CONFIG_ID.to_string());
        self.status.set_config_id(config_id);
        self.supply_counters = SupplyCountersData::default();
    }

    pub fn status(&self) -> TerminalStatus {
        self.status.status()
    }

    /// §4.8: updates status, resetting the displayed screen for `Offline`
    /// and `OutOfService`.
    pub fn set_status(&mut self, status: TerminalStatus) {
        if let Some(screen) = self.status.set_status(status) {
            self.collaborators.display.set_screen_by_number(&screen);
        }
    }

    /// §4.8: mirrors the new config id to the `Settings` collaborator.
    pub fn set_config_id<S: Into<String>>(&mut self, id: S) {
        let id = id.into();
        self.collaborators.settings.set("config_id", id.clone());
        self.status.set_config_id(id);
    }

    pub fn config_id(&self) -> &str {
        self.status.config_id()
    }

    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    pub fn card(&self) -> Option<&Card> {
        self.card.as_ref()
    }

    pub fn pin(&self) -> &str {
        self.buffers.pin()
    }

    pub fn active_fdks(&self) -> ActiveFdks {
        self.active_fdks
    }

    pub fn interactive_transaction(&self) -> bool {
        self.interactive_transaction
    }

    /// Consume the pending assembled transaction request, if any (§5:
    /// "the core exposes `transaction_request` as pending work until the
    /// caller clears it").
    pub fn take_transaction_request(&mut self) -> Option<Reply> {
        self.transaction_request.take()
    }

    /// Bump the Message Coordination Counter and mirror the new value to
    /// the `Settings` collaborator (§4.4, §5's "Shared resources").
    pub fn next_mcn(&mut self) -> u8 {
        let value = self.mcn.next();
        self.collaborators
            .settings
            .set("message_coordination_number", (value as char).to_string());
        value
    }

    /// Drive the state interpreter from the current state. Internal helper
    /// shared by every entry point that can move the state machine.
    fn drive(&mut self) {
        let current = self.current_state.clone();
        process_state(self, &current);
    }

    /// Card-read entry point (§3, §7).
    ///
    /// A parse failure transitions the terminal to [TerminalStatus::OutOfService]
    /// rather than reaching state `A`'s "await card" branch (§7: "Card parse
    /// failure ... transitions the terminal to `OutOfService`").
    pub fn read_card(&mut self, track2: &str) {
        match Card::parse(track2) {
            Ok(card) => {
                self.card = Some(card);
                self.drive();
            }
            Err(e) => {
                log::error!("card parse failure: {e}");
                self.set_status(TerminalStatus::OutOfService);
            }
        }
    }

    /// Pinpad entry point: a digit, enter, clear, or cancel key (§5).
    pub fn process_pinpad_button_pressed(&mut self, input: Input) {
        self.buttons_pressed.push_back(input);
        self.drive();
    }

    /// FDK (bezel key) entry point (§5).
    pub fn process_fdk_button_pressed(&mut self, key: Fdk) {
        self.buttons_pressed.push_back(Input::Fdk(key));
        self.drive();
    }

    /// Host message entry point (C7), delegated to [crate::dispatcher].
    pub fn process_host_message(&mut self, message: HostMessage) -> Reply {
        crate::dispatcher::process_host_message(self, message)
    }

    /// Drive the interpreter starting from an explicit state number. Used
    /// by the host dispatcher's `Go in-service` and `Transaction Reply
    /// Command` handlers (§4.7), which name a specific starting state
    /// rather than resuming from wherever the terminal currently is.
    pub(crate) fn process_state_from(&mut self, start: &str) {
        process_state(self, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_collaborators;

    #[test]
    fn test_new_terminal_loads_default_config_id() {
        let terminal = Terminal::new(fake_collaborators());
        assert_eq!(terminal.config_id(), DEFAULT_CONFIG_ID);
    }

    #[test]
    fn test_read_card_failure_sets_out_of_service() {
        let mut terminal = Terminal::new(fake_collaborators());
        terminal.read_card("not a track2 string");
        assert_eq!(terminal.status(), TerminalStatus::OutOfService);
        assert!(terminal.card().is_none());
    }

    #[test]
    fn test_read_card_success_sets_card() {
        let mut terminal = Terminal::new(fake_collaborators());
        terminal.read_card(";4761739001010010=26011010000012345678?");
        assert_eq!(terminal.card().unwrap().number(), "4761739001010010");
    }

    #[test]
    fn test_mcn_persists_through_settings() {
        let mut terminal = Terminal::new(fake_collaborators());
        let first = terminal.next_mcn();
        assert_eq!(first, b'1');
        assert_eq!(
            terminal
                .collaborators
                .settings
                .get("message_coordination_number"),
            Some("1".to_string())
        );
    }
}
