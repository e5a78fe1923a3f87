//! Eight-position operation-code buffer (C2).

use crate::error::{Error, Result};

/// Number of slots in the opcode buffer.
pub const OPCODE_LEN: usize = 8;

/// The 8-position operation-code buffer assembled via state navigation,
/// encoding the chosen transaction type to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpcodeBuffer([char; OPCODE_LEN]);

impl OpcodeBuffer {
    /// A freshly-cleared buffer (all slots space).
    pub fn new() -> Self {
        Self([' '; OPCODE_LEN])
    }

    /// Clears all slots.
    pub fn init(&mut self) {
        self.0 = [' '; OPCODE_LEN];
    }

    /// Write `ch` at position `i`. Out-of-range `i` is an error event; the
    /// buffer is left unchanged (§4.2).
    pub fn set_at(&mut self, i: usize, ch: char) -> Result<()> {
        if i >= OPCODE_LEN {
            return Err(Error::malformed(format!(
                "opcode index out of range: {i}"
            )));
        }
        self.0[i] = ch;
        Ok(())
    }

    /// Returns the eight-character string.
    pub fn get(&self) -> String {
        self.0.iter().collect()
    }

    /// Installs a state-supplied template (exact shaping is the State Table
    /// collaborator's responsibility; the interpreter only installs the
    /// already-shaped eight characters it is handed).
    pub fn load_from_state(&mut self, template: &str) {
        self.init();
        for (i, ch) in template.chars().take(OPCODE_LEN).enumerate() {
            self.0[i] = ch;
        }
    }
}

impl Default for OpcodeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_eight_spaces() {
        let buf = OpcodeBuffer::new();
        assert_eq!(buf.get(), "        ");
        assert_eq!(buf.get().len(), OPCODE_LEN);
    }

    #[test]
    fn test_set_at_writes_position() {
        let mut buf = OpcodeBuffer::new();
        buf.set_at(7, 'A').unwrap();
        assert_eq!(buf.get(), "       A");
    }

    #[test]
    fn test_set_at_out_of_range_is_error_and_no_op() {
        let mut buf = OpcodeBuffer::new();
        assert!(buf.set_at(8, 'A').is_err());
        assert_eq!(buf.get(), "        ");
    }

    #[test]
    fn test_load_from_state_template() {
        let mut buf = OpcodeBuffer::new();
        buf.load_from_state("WD      ");
        assert_eq!(buf.get(), "WD      ");
    }
}
