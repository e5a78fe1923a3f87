//! Operator input events, queued by [crate::Terminal] and consumed by the
//! state interpreter (C5).

use std::collections::VecDeque;

use crate::fdk::Fdk;

/// A single operator action: a pinpad key or a bezel (FDK) key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    /// A digit key, `'0'..='9'`.
    Digit(char),
    Enter,
    Clear,
    Cancel,
    Fdk(Fdk),
}

impl Input {
    /// The active FDK carried by this input, if any.
    pub fn as_fdk(&self) -> Option<Fdk> {
        match self {
            Input::Fdk(key) => Some(*key),
            _ => None,
        }
    }

    /// Printable representation of this input, for the "copy the first
    /// pending input" buffer-echo states (§4.5 I). Digits echo themselves;
    /// the control keys and FDK presses echo a single mnemonic character.
    pub fn as_char(&self) -> char {
        match self {
            Input::Digit(d) => *d,
            Input::Enter => 'E',
            Input::Clear => 'C',
            Input::Cancel => 'X',
            Input::Fdk(key) => char::from(*key),
        }
    }
}

/// The ordered queue of not-yet-consumed operator inputs (§3: "Interpreter
/// context").
pub type InputQueue = VecDeque<Input>;
