//! # ATM Terminal Core
//!
//! This crate implements the CORE of an ATM terminal simulator that speaks
//! a legacy host-to-terminal message protocol: a state-driven transaction
//! engine that ingests host messages and operator/keypad/card inputs,
//! walks a configurable table of terminal states, maintains a small set of
//! typed buffers, and emits responses whose structure is bit-compatible
//! with the wire protocol.
//!
//! [Terminal] is the crate's single stateful type. It is constructed with
//! a [Collaborators] bundle of boxed trait objects — screens, states, the
//! financial institution table, crypto, display, hardware, and persisted
//! settings are all external collaborators this crate never implements
//! (see the `collaborators` module).
//!
//! ## Module map
//!
//! - [terminal]: the `Terminal` type and its four public entry points.
//! - [interpreter]: the state-machine dispatch loop (C5).
//! - [state]: the tagged `State` variant and its kind-specific fields.
//! - [dispatcher]: the host message dispatcher (C7).
//! - [transaction]: the outbound transaction request assembler (C6).
//! - [buffers], [opcode], [fdk], [mcn], [card]: the small typed buffers and
//!   values the interpreter mutates (C1-C4).
//! - [collaborators]: capability traits for everything this crate treats
//!   as an external seam.
//! - [terminal_status]: terminal status, config id, and supply counters
//!   (C8).
//! - [jsonrpc]: inbound/outbound wire envelope types.
//! - [error], [logging]: the ambient error and logging stack.

/// Operation-code buffer, PIN/general-purpose/amount buffers (C1, C2).
pub mod buffers;
/// Card model, parsed from Track-2 magnetic-stripe data.
pub mod card;
/// Capability traits for external collaborators (screens, states, FIT,
/// crypto, display, hardware, settings), plus the `Collaborators` bundle.
pub mod collaborators;
/// Host message dispatcher (C7).
pub mod dispatcher;
/// Library error types.
pub mod error;
/// Function Display Key activation and the active-key set (C3).
pub mod fdk;
/// Operator input events and the pending-input queue.
pub mod input;
/// State machine interpreter (C5).
pub mod interpreter;
/// Inbound/outbound message envelope types.
pub mod jsonrpc;
/// Logging convenience helpers.
pub mod logging;
/// Message Coordination Counter (C4).
pub mod mcn;
/// Operation-code buffer (C2).
pub mod opcode;
/// State table types (§4.5).
pub mod state;
/// The top-level terminal instance.
pub mod terminal;
/// Terminal status, config id, and supply counters (C8).
pub mod terminal_status;
#[cfg(test)]
mod testing;
/// Wall-clock timestamp formatting for the transaction request assembler.
pub mod time;
/// Transaction Request Assembler (C6).
pub mod transaction;

pub use buffers::{BufferKind, BufferSet};
pub use card::Card;
pub use collaborators::{Collaborators, Crypto, Display, Fits, Hardware, Screen, Screens, Settings, States};
pub use error::{Error, ErrorCode, Result};
pub use fdk::{ActiveFdks, Fdk};
pub use input::{Input, InputQueue};
pub use jsonrpc::{HostMessage, Reply, ReplyData};
pub use logging::LogLevel;
pub use mcn::Mcn;
pub use opcode::OpcodeBuffer;
pub use state::State;
pub use terminal::Terminal;
pub use terminal_status::{TerminalState, TerminalStatus};
