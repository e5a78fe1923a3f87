//! PIN, B, C, Amount, and FDK-echo buffer storage (C1).

use crate::fdk::Fdk;

/// Fixed width of the [BufferSet::amount] buffer (§3: `|Amount| == 12`
/// always).
pub const AMOUNT_LEN: usize = 12;

/// Maximum length of the general-purpose `B` and `C` buffers.
pub const GENERAL_BUFFER_MAX: usize = 32;

/// Default maximum PIN length, used when the FIT collaborator has no entry
/// for the inserted card.
pub const DEFAULT_MAX_PIN_LEN: usize = 6;

/// Which buffer a [BufferSet] operation addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    Pin,
    B,
    C,
    Amount,
}

/// The terminal's small set of typed input buffers (C1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferSet {
    pin: String,
    b: String,
    c: String,
    amount: String,
    fdk_buffer: Option<Fdk>,
}

impl BufferSet {
    /// Construct a freshly-initialized buffer set, as at terminal boot.
    pub fn new() -> Self {
        let mut set = Self {
            pin: String::new(),
            b: String::new(),
            c: String::new(),
            amount: String::new(),
            fdk_buffer: None,
        };
        set.init_buffers();
        set
    }

    /// Clears PIN, B, C, FDK buffer; resets Amount to twelve ASCII zeros.
    ///
    /// Does not touch the opcode buffer; that is owned by [crate::opcode::OpcodeBuffer]
    /// and re-initialized separately by callers (state A, `Go in-service`,
    /// `Go out-of-service`) so the two stay decoupled: they are independent
    /// siblings, not one containing the other.
    pub fn init_buffers(&mut self) {
        self.pin.clear();
        self.b.clear();
        self.c.clear();
        self.fdk_buffer = None;
        self.amount = "0".repeat(AMOUNT_LEN);
    }

    pub fn pin(&self) -> &str {
        &self.pin
    }

    pub fn b(&self) -> &str {
        &self.b
    }

    pub fn c(&self) -> &str {
        &self.c
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn fdk_buffer(&self) -> Option<Fdk> {
        self.fdk_buffer
    }

    pub fn set_fdk_buffer(&mut self, key: Fdk) {
        self.fdk_buffer = Some(key);
    }

    pub fn get(&self, kind: BufferKind) -> &str {
        match kind {
            BufferKind::Pin => self.pin(),
            BufferKind::B => self.b(),
            BufferKind::C => self.c(),
            BufferKind::Amount => self.amount(),
        }
    }

    /// Appends a digit to the PIN buffer, subject to `max_len`. A no-op
    /// past the cap (§4.1: "any operation that would exceed a cap is a
    /// no-op").
    pub fn push_pin(&mut self, digit: char, max_len: usize) {
        if self.pin.len() < max_len {
            self.pin.push(digit);
        }
    }

    pub fn clear_pin(&mut self) {
        self.pin.clear();
    }

    /// Appends a character to buffer `B`, capped at [GENERAL_BUFFER_MAX].
    pub fn push_b(&mut self, ch: char) {
        if self.b.len() < GENERAL_BUFFER_MAX {
            self.b.push(ch);
        }
    }

    /// Appends a character to buffer `C`, capped at [GENERAL_BUFFER_MAX].
    pub fn push_c(&mut self, ch: char) {
        if self.c.len() < GENERAL_BUFFER_MAX {
            self.c.push(ch);
        }
    }

    /// Overwrites buffer `B` wholesale (used by state X's buffer targets),
    /// truncating to [GENERAL_BUFFER_MAX].
    pub fn set_b<S: Into<String>>(&mut self, value: S) {
        let mut value = value.into();
        value.truncate(GENERAL_BUFFER_MAX);
        self.b = value;
    }

    /// Overwrites buffer `C` wholesale, truncating to [GENERAL_BUFFER_MAX].
    pub fn set_c<S: Into<String>>(&mut self, value: S) {
        let mut value = value.into();
        value.truncate(GENERAL_BUFFER_MAX);
        self.c = value;
    }

    pub fn clear_b(&mut self) {
        self.b.clear();
    }

    pub fn clear_c(&mut self) {
        self.c.clear();
    }

    /// Right-shift/append semantics (§4.1, and §9's pinned Open Question):
    /// the new digits enter from the right, existing digits shift left, and
    /// the result is always re-normalized to exactly [AMOUNT_LEN]
    /// characters, left-padded with `'0'`.
    pub fn set_amount(&mut self, digits: &str) {
        let mut combined = format!("{}{}", self.amount, digits);
        if combined.len() > AMOUNT_LEN {
            let start = combined.len() - AMOUNT_LEN;
            combined = combined[start..].to_string();
        } else {
            combined = format!("{:0>width$}", combined, width = AMOUNT_LEN);
        }
        self.amount = combined;
    }
}

impl Default for BufferSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_buffers() {
        let mut set = BufferSet::new();
        set.push_pin('1', 6);
        set.set_b("hello");
        set.set_amount("5");
        set.set_fdk_buffer(Fdk::A);

        set.init_buffers();

        assert_eq!(set.pin(), "");
        assert_eq!(set.b(), "");
        assert_eq!(set.c(), "");
        assert_eq!(set.amount(), "000000000000");
        assert_eq!(set.fdk_buffer(), None);
    }

    #[test]
    fn test_amount_shift_in() {
        let mut set = BufferSet::new();
        assert_eq!(set.amount(), "000000000000");

        set.set_amount("1");
        assert_eq!(set.amount(), "000000000001");

        set.set_amount("0");
        assert_eq!(set.amount(), "000000000010");

        set.set_amount("0");
        assert_eq!(set.amount(), "000000000100");
    }

    #[test]
    fn test_amount_always_twelve_digits() {
        let mut set = BufferSet::new();
        set.set_amount("123456789012345");
        assert_eq!(set.amount().len(), AMOUNT_LEN);
        assert_eq!(set.amount(), "456789012345");
    }

    #[test]
    fn test_pin_cap_is_no_op_past_max() {
        let mut set = BufferSet::new();
        for c in "123456789".chars() {
            set.push_pin(c, 4);
        }
        assert_eq!(set.pin(), "1234");
    }

    #[test]
    fn test_general_buffer_cap() {
        let mut set = BufferSet::new();
        for _ in 0..40 {
            set.push_b('x');
        }
        assert_eq!(set.b().len(), GENERAL_BUFFER_MAX);
    }
}
