//! Inbound/outbound message envelopes (§4.7.1): a derived
//! `Serialize`/`Deserialize` pair alongside a hand-written `Display`, so the
//! wire shape is both machine-checkable and directly loggable.
//!
//! §6 describes inbound/outbound messages only as "structured records with
//! the field names used throughout"; this module gives that a concrete
//! shape. Field names here are the normalized, closed-enumeration form the
//! "Message dispatch on string identifiers" design note calls for — a
//! transport layer sitting in front of this crate is responsible for
//! turning raw wire bytes into these types.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const OPEN_BRACE: &str = "{";
pub const CLOSE_BRACE: &str = "}";

/// Top-level classification of an inbound host message (§4.7).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(tag = "message_class", content = "data")]
pub enum HostMessage {
    TerminalCommand { command_code: TerminalCommandCode },
    DataCommand(DataCommand),
    TransactionReplyCommand {
        next_state: String,
        screen_display_update: Option<String>,
        notes_to_dispense: Option<String>,
        printer_data: Option<String>,
    },
    EmvConfiguration,
}

impl fmt::Display for HostMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => write!(f, "{s}"),
            Err(_) => write!(f, "{OPEN_BRACE}\"message_class\":\"malformed\"{CLOSE_BRACE}"),
        }
    }
}

/// Terminal Command codes (§4.7). Unrecognized codes are carried rather
/// than rejected at the parse layer, so the dispatcher can log the exact
/// string it received when it replies Command Reject.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum TerminalCommandCode {
    #[serde(rename = "Go in-service")]
    GoInService,
    #[serde(rename = "Go out-of-service")]
    GoOutOfService,
    #[serde(rename = "Send Configuration Information")]
    SendConfigurationInformation,
    #[serde(rename = "Send Configuration ID")]
    SendConfigurationId,
    #[serde(rename = "Send Supply Counters")]
    SendSupplyCounters,
    Unknown(String),
}

/// "Data Command" sub-dispatch (§4.7): Customization Command, Interactive
/// Transaction Response, and Extended Encryption Key Information all share
/// the `DataCommand` top-level class on the wire.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(tag = "kind")]
pub enum DataCommand {
    Customization(CustomizationCommand),
    InteractiveTransactionResponse {
        active_keys: Option<String>,
        dynamic_screen_data: String,
    },
    ExtendedEncryptionKeyInformation {
        modifier: EncryptionKeyModifier,
        key_data: Vec<u8>,
    },
}

/// Customization Command sub-classification (§4.7), keyed by
/// `message_identifier` on the wire.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(tag = "message_identifier", content = "payload")]
pub enum CustomizationCommand {
    #[serde(rename = "Screen Data load")]
    ScreenDataLoad(String),
    #[serde(rename = "State Tables load")]
    StateTablesLoad(String),
    #[serde(rename = "FIT Data load")]
    FitDataLoad(String),
    #[serde(rename = "Configuration ID number load")]
    ConfigurationIdNumberLoad(String),
    #[serde(rename = "Enhanced Configuration Data Load")]
    EnhancedConfigurationDataLoad(Vec<EnhancedConfigParam>),
    Unknown(String),
}

/// A single `{id, value}` parameter from an Enhanced Configuration Data
/// Load message (§4.7).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct EnhancedConfigParam {
    pub id: String,
    pub value: String,
}

/// Extended Encryption Key Information modifiers (§4.7).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum EncryptionKeyModifier {
    #[serde(rename = "Decipher new comms key with current master key")]
    DecipherNewCommsKeyWithCurrentMasterKey,
    Unknown(String),
}

/// Outbound reply envelope: `{message_id, data}` (§4.7's "Solicited-Status
/// reply shape" and C6's transaction-request envelope).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub message_id: String,
    pub data: ReplyData,
}

impl Reply {
    pub fn ready_state(data: ReplyData) -> Self {
        Self {
            message_id: "ReadyState".to_string(),
            data,
        }
    }

    pub fn transaction_request(data: TransactionRequestData) -> Self {
        Self {
            message_id: "TransactionRequest".to_string(),
            data: ReplyData::TransactionRequest(data),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => write!(f, "{s}"),
            Err(_) => write!(
                f,
                "{OPEN_BRACE}\"message_id\":\"{}\"{CLOSE_BRACE}",
                self.message_id
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyData {
    SolicitedStatus(SolicitedStatusData),
    TerminalState(TerminalStateData),
    TransactionRequest(TransactionRequestData),
}

/// Solicited-Status descriptor codes (§4.7).
pub mod status_descriptor {
    pub const READY: char = '9';
    pub const COMMAND_REJECT: char = 'A';
    pub const SPECIFIC_COMMAND_REJECT: char = 'C';
    pub const TERMINAL_STATE: char = 'F';
    pub const SUPPLY_COUNTERS_SUB: char = '2';
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolicitedStatusData {
    #[serde(rename = "LUNO_ATM")]
    pub luno_atm: String,
    #[serde(rename = "StatusDescriptor")]
    pub status_descriptor: char,
    #[serde(rename = "SubStatusDescriptor", skip_serializing_if = "Option::is_none")]
    pub sub_status_descriptor: Option<char>,
}

impl SolicitedStatusData {
    pub fn ready(luno_atm: impl Into<String>) -> Self {
        Self {
            luno_atm: luno_atm.into(),
            status_descriptor: status_descriptor::READY,
            sub_status_descriptor: None,
        }
    }

    pub fn command_reject(luno_atm: impl Into<String>) -> Self {
        Self {
            luno_atm: luno_atm.into(),
            status_descriptor: status_descriptor::COMMAND_REJECT,
            sub_status_descriptor: None,
        }
    }
}

/// `Terminal State` reply payload (§4.7): carries config id plus whichever
/// of hardware/supply-counter fields apply to the command that asked for
/// it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminalStateData {
    #[serde(rename = "LUNO_ATM")]
    pub luno_atm: String,
    #[serde(rename = "StatusDescriptor")]
    pub status_descriptor: char,
    #[serde(rename = "SubStatusDescriptor", skip_serializing_if = "Option::is_none")]
    pub sub_status_descriptor: Option<char>,
    pub config_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_fitness: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_configuration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplies_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndc_software_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply_counters: Option<crate::terminal_status::SupplyCountersData>,
}

/// Outbound `TransactionRequest` payload (C6).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequestData {
    pub luno: String,
    pub top_of_receipt: String,
    pub message_coordination_number: String,
    pub time_variant_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_b: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_c: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_ready_state_display_round_trips_json() {
        let reply = Reply::ready_state(ReplyData::SolicitedStatus(SolicitedStatusData::ready(
            "009",
        )));
        let rendered = format!("{reply}");
        let parsed: Reply = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, reply);
    }

    #[test]
    fn test_command_reject_descriptor() {
        let data = SolicitedStatusData::command_reject("009");
        assert_eq!(data.status_descriptor, status_descriptor::COMMAND_REJECT);
    }
}
