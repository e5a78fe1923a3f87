//! State table types (§4.5 and §3's "State" data model).
//!
//! Each [State] variant is a tagged case owning its own kind-specific
//! fields, per the "State polymorphism" design note (§9): the interpreter
//! in [crate::interpreter] is an exhaustive match over this enum rather than
//! a runtime field lookup on an opaque record.

use std::collections::HashMap;

use crate::fdk::Fdk;

/// A 3-digit state number. Not validated to be numeric; the state-table
/// collaborator is responsible for well-formedness on load (§9).
pub type StateId = String;

/// A 3-digit screen number.
pub type ScreenId = String;

/// Sentinel meaning "this FDK exit is disabled" in a [FdkNextStates] table.
pub const FDK_DISABLED: &str = "255";

/// Per-FDK next-state table for the four bezel keys used by states E, F,
/// and H (`{A, B, C, D}`). A next-state equal to [FDK_DISABLED] means that
/// key is not active.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FdkNextStates {
    pub a: StateId,
    pub b: StateId,
    pub c: StateId,
    pub d: StateId,
}

impl FdkNextStates {
    /// Next state for `key`, or `None` if disabled or not one of A..D.
    pub fn next_state(&self, key: Fdk) -> Option<&str> {
        let raw = match key {
            Fdk::A => &self.a,
            Fdk::B => &self.b,
            Fdk::C => &self.c,
            Fdk::D => &self.d,
            _ => return None,
        };
        if raw == FDK_DISABLED || raw.is_empty() {
            None
        } else {
            Some(raw.as_str())
        }
    }

    /// Whether `key` is active (next state set and not the disabled
    /// sentinel).
    pub fn is_active(&self, key: Fdk) -> bool {
        self.next_state(key).is_some()
    }
}

/// Extension-state entries, indexed positionally.
///
/// Used by state `/` (entry 8, unconditionally) and state `X` (entries
/// indexed by the FDK→extension-entry map in §4.5).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtensionState {
    pub entries: Vec<String>,
}

impl ExtensionState {
    pub fn entry(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }
}

/// FDK → extension-entry index map used by state `X` (§4.5).
pub fn fdk_extension_index(key: Fdk) -> Option<usize> {
    match key {
        Fdk::A => Some(2),
        Fdk::B => Some(3),
        Fdk::C => Some(4),
        Fdk::D => Some(5),
        Fdk::F => Some(6),
        Fdk::G => Some(7),
        Fdk::H => Some(8),
        Fdk::I => Some(9),
        Fdk::E => None,
    }
}

/// Per-state header fields common to every kind (§3: `number`, `type`,
/// `description`). `type` is encoded by which [State] variant is in play,
/// rather than stored redundantly as a field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateHeader {
    pub number: StateId,
    pub description: String,
}

/// Transaction-assembly flags carried by state `I` (consumed by C6, the
/// [crate::transaction] module). Each is a raw 3-digit flag value, per the
/// wire shape described in §4.6.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionFlags {
    pub send_track2: String,
    pub send_operation_code: String,
    pub send_amount_data: String,
    pub send_pin_buffer: String,
    pub send_buffer_b_buffer_c: String,
}

impl TransactionFlags {
    fn is_send(flag: &str) -> bool {
        flag == "001"
    }

    pub fn should_send_track2(&self) -> bool {
        Self::is_send(&self.send_track2)
    }

    pub fn should_send_operation_code(&self) -> bool {
        Self::is_send(&self.send_operation_code)
    }

    pub fn should_send_amount_data(&self) -> bool {
        Self::is_send(&self.send_amount_data)
    }
}

/// A single entry in the state table (§3, §4.5).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// `A` — Card Read.
    CardRead {
        header: StateHeader,
        screen_number: ScreenId,
        good_read_next_state: StateId,
    },
    /// `B` — PIN Entry.
    PinEntry {
        header: StateHeader,
        screen_number: ScreenId,
        remote_pin_check_next_state: StateId,
    },
    /// `D` — Opcode-from-state.
    OpcodeFromState {
        header: StateHeader,
        template: String,
        /// Raw 3-digit extension-state code; `None` once the `'255'`/`'000'`
        /// sentinels are filtered out (§4.5).
        extension_state: Option<String>,
        next_state: StateId,
    },
    /// `E` — Four-FDK Selection.
    FourFdkSelection {
        header: StateHeader,
        screen_number: ScreenId,
        fdk_next_states: FdkNextStates,
        buffer_location: u8,
    },
    /// `F` — Amount Entry.
    AmountEntry {
        header: StateHeader,
        screen_number: ScreenId,
        fdk_next_states: FdkNextStates,
    },
    /// `H` — Information Entry.
    InformationEntry {
        header: StateHeader,
        screen_number: ScreenId,
        fdk_next_states: FdkNextStates,
        /// Third character of `buffer_and_display_params` (§4.5's table).
        buffer_and_display_param: char,
    },
    /// `I` — Transaction Request.
    TransactionRequest {
        header: StateHeader,
        screen_number: ScreenId,
        flags: TransactionFlags,
    },
    /// `J` — Close.
    Close {
        header: StateHeader,
        receipt_delivered_screen: ScreenId,
    },
    /// `K` — FIT Exit Selection.
    FitExit {
        header: StateHeader,
        state_exits: Vec<StateId>,
    },
    /// `W` — Look-up by FDK Buffer.
    FdkBufferLookup {
        header: StateHeader,
        states: HashMap<Fdk, StateId>,
    },
    /// `X` — Store and Activate.
    StoreAndActivate {
        header: StateHeader,
        screen_number: ScreenId,
        fdk_active_mask: String,
        extension_state: Option<ExtensionState>,
        /// 3-char buffer-target descriptor; index 1 selects the target
        /// buffer, index 2 is the zero-padding digit count (§4.5).
        buffer_id: String,
        fdk_next_state: StateId,
    },
    /// `Y` — Store FDK to Opcode.
    StoreFdkToOpcode {
        header: StateHeader,
        screen_number: ScreenId,
        fdk_active_mask: String,
        extension_state: Option<ExtensionState>,
        buffer_positions: String,
        fdk_next_state: StateId,
    },
    /// `+` — Begin ICC Init.
    IccBeginInit {
        header: StateHeader,
        icc_init_not_started_next_state: StateId,
    },
    /// `/` — Complete ICC App Init.
    IccCompleteAppInit {
        header: StateHeader,
        please_wait_screen_number: ScreenId,
        extension_state: ExtensionState,
    },
    /// `;` — ICC Re-init.
    IccReInit {
        header: StateHeader,
        processing_not_performed_next_state: StateId,
    },
    /// `?` — Set ICC Data.
    IccSetData {
        header: StateHeader,
        next_state: StateId,
    },
}

impl State {
    pub fn header(&self) -> &StateHeader {
        match self {
            State::CardRead { header, .. }
            | State::PinEntry { header, .. }
            | State::OpcodeFromState { header, .. }
            | State::FourFdkSelection { header, .. }
            | State::AmountEntry { header, .. }
            | State::InformationEntry { header, .. }
            | State::TransactionRequest { header, .. }
            | State::Close { header, .. }
            | State::FitExit { header, .. }
            | State::FdkBufferLookup { header, .. }
            | State::StoreAndActivate { header, .. }
            | State::StoreFdkToOpcode { header, .. }
            | State::IccBeginInit { header, .. }
            | State::IccCompleteAppInit { header, .. }
            | State::IccReInit { header, .. }
            | State::IccSetData { header, .. } => header,
        }
    }

    pub fn number(&self) -> &str {
        &self.header().number
    }

    /// The single-character type tag used on the wire (§3).
    pub fn type_code(&self) -> char {
        match self {
            State::CardRead { .. } => 'A',
            State::PinEntry { .. } => 'B',
            State::OpcodeFromState { .. } => 'D',
            State::FourFdkSelection { .. } => 'E',
            State::AmountEntry { .. } => 'F',
            State::InformationEntry { .. } => 'H',
            State::TransactionRequest { .. } => 'I',
            State::Close { .. } => 'J',
            State::FitExit { .. } => 'K',
            State::FdkBufferLookup { .. } => 'W',
            State::StoreAndActivate { .. } => 'X',
            State::StoreFdkToOpcode { .. } => 'Y',
            State::IccBeginInit { .. } => '+',
            State::IccCompleteAppInit { .. } => '/',
            State::IccReInit { .. } => ';',
            State::IccSetData { .. } => '?',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fdk_next_states_sentinel() {
        let table = FdkNextStates {
            a: "101".into(),
            b: FDK_DISABLED.into(),
            c: String::new(),
            d: "104".into(),
        };
        assert!(table.is_active(Fdk::A));
        assert!(!table.is_active(Fdk::B));
        assert!(!table.is_active(Fdk::C));
        assert!(table.is_active(Fdk::D));
        assert_eq!(table.next_state(Fdk::A), Some("101"));
    }

    #[test]
    fn test_state_header_accessor() {
        let state = State::CardRead {
            header: StateHeader {
                number: "001".into(),
                description: "card read".into(),
            },
            screen_number: "010".into(),
            good_read_next_state: "002".into(),
        };
        assert_eq!(state.number(), "001");
        assert_eq!(state.type_code(), 'A');
    }

    #[test]
    fn test_extension_state_indexing() {
        let ext = ExtensionState {
            entries: vec!["a".into(), "b".into()],
        };
        assert_eq!(ext.entry(1), Some("b"));
        assert_eq!(ext.entry(5), None);
    }
}
