//! Transaction Request Assembler (C6).

use crate::error::Error;
use crate::jsonrpc::{Reply, TransactionRequestData};
use crate::state::TransactionFlags;
use crate::terminal::Terminal;
use crate::time::time_variant_number;

/// Default LUNO used when the `Settings` collaborator has no
/// `host.luno` entry (§4.6).
pub const DEFAULT_LUNO: &str = "009";

/// Send-pin-buffer flag values that request an encrypted PIN block
/// (§4.6).
const SEND_PIN_VALUES: [&str; 2] = ["001", "129"];
/// Send-pin-buffer flag values that explicitly omit the PIN block.
const OMIT_PIN_VALUES: [&str; 2] = ["000", "128"];

/// Assemble the outbound `TransactionRequest` payload from state `I`'s
/// flags and the terminal's current buffers (§4.6).
///
/// Never fails outright: missing preconditions (no card, no PIN, a crypto
/// rejection) are logged and the corresponding field is simply omitted,
/// per §7's "missing preconditions" error class.
pub fn assemble(terminal: &mut Terminal, flags: &TransactionFlags) -> Reply {
    let luno = terminal
        .collaborators
        .settings
        .get("host.luno")
        .unwrap_or_else(|| DEFAULT_LUNO.to_string());

    let mcn = terminal.next_mcn() as char;

    let mut data = TransactionRequestData {
        luno,
        top_of_receipt: "1".to_string(),
        message_coordination_number: mcn.to_string(),
        time_variant_number: time_variant_number(),
        ..Default::default()
    };

    if flags.should_send_track2() {
        match terminal.card.as_ref() {
            Some(card) => data.track2 = Some(card.track2().to_string()),
            None => log::warn!("{}", Error::missing("send_track2 requested but no card is present")),
        }
    }

    if flags.should_send_operation_code() {
        data.operation_code = Some(terminal.opcode.get());
    }

    if flags.should_send_amount_data() {
        data.amount_data = Some(terminal.buffers.amount().to_string());
    }

    assemble_pin_block(terminal, &flags.send_pin_buffer, &mut data);
    assemble_buffers(terminal, &flags.send_buffer_b_buffer_c, &mut data);

    Reply::transaction_request(data)
}

fn assemble_pin_block(terminal: &mut Terminal, flag: &str, data: &mut TransactionRequestData) {
    if OMIT_PIN_VALUES.contains(&flag) {
        return;
    }
    if !SEND_PIN_VALUES.contains(&flag) {
        if !flag.is_empty() {
            log::warn!("unrecognized send_pin_buffer value: {flag}");
        }
        return;
    }

    let pin = terminal.buffers.pin();
    if pin.is_empty() {
        log::warn!("{}", Error::missing("send_pin_buffer requested but PIN buffer is empty"));
        return;
    }

    let Some(card) = terminal.card.as_ref() else {
        log::warn!("{}", Error::missing("send_pin_buffer requested but no card is present"));
        return;
    };

    match terminal.collaborators.crypto.encrypted_pin(pin, card.number()) {
        Ok(block) => data.pin_block = Some(block),
        Err(e) => log::warn!("failed to encrypt PIN block: {e}"),
    }
}

fn assemble_buffers(terminal: &Terminal, flag: &str, data: &mut TransactionRequestData) {
    match flag {
        "000" => {}
        "001" => data.buffer_b = Some(terminal.buffers.b().to_string()),
        "002" => data.buffer_c = Some(terminal.buffers.c().to_string()),
        "003" => {
            data.buffer_b = Some(terminal.buffers.b().to_string());
            data.buffer_c = Some(terminal.buffers.c().to_string());
        }
        other => log::warn!(
            "extension-state-driven send_buffer_B_buffer_C value not supported: {other}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonrpc::ReplyData;
    use crate::testing::{fake_collaborators, FakeCrypto};

    fn flags(track2: &str, opcode: &str, amount: &str, pin: &str, bc: &str) -> TransactionFlags {
        TransactionFlags {
            send_track2: track2.to_string(),
            send_operation_code: opcode.to_string(),
            send_amount_data: amount.to_string(),
            send_pin_buffer: pin.to_string(),
            send_buffer_b_buffer_c: bc.to_string(),
        }
    }

    #[test]
    fn test_assemble_always_includes_envelope_fields() {
        let mut terminal = Terminal::new(fake_collaborators());
        let reply = assemble(&mut terminal, &flags("000", "000", "000", "000", "000"));
        match reply.data {
            ReplyData::TransactionRequest(data) => {
                assert_eq!(data.luno, DEFAULT_LUNO);
                assert_eq!(data.top_of_receipt, "1");
                assert_eq!(data.time_variant_number.len(), 8);
                assert!(data.track2.is_none());
            }
            _ => panic!("expected TransactionRequest reply"),
        }
    }

    #[test]
    fn test_assemble_omits_pin_block_without_card() {
        let mut terminal = Terminal::new(fake_collaborators());
        terminal.buffers.push_pin('1', 6);
        let reply = assemble(&mut terminal, &flags("000", "000", "000", "001", "000"));
        match reply.data {
            ReplyData::TransactionRequest(data) => assert!(data.pin_block.is_none()),
            _ => panic!("expected TransactionRequest reply"),
        }
    }

    #[test]
    fn test_assemble_attaches_pin_block_with_card_and_pin() {
        let mut terminal = Terminal::new(fake_collaborators());
        terminal.card = Some(crate::card::Card::parse(";4761739001010010=26011010000012345678?").unwrap());
        terminal.buffers.push_pin('1', 6);
        terminal.buffers.push_pin('2', 6);
        let reply = assemble(&mut terminal, &flags("000", "000", "000", "001", "000"));
        match reply.data {
            ReplyData::TransactionRequest(data) => {
                assert_eq!(data.pin_block.as_deref(), Some(FakeCrypto::ENCRYPTED_PIN_BLOCK))
            }
            _ => panic!("expected TransactionRequest reply"),
        }
    }

    #[test]
    fn test_assemble_both_buffers() {
        let mut terminal = Terminal::new(fake_collaborators());
        terminal.buffers.set_b("abc");
        terminal.buffers.set_c("xyz");
        let reply = assemble(&mut terminal, &flags("000", "000", "000", "000", "003"));
        match reply.data {
            ReplyData::TransactionRequest(data) => {
                assert_eq!(data.buffer_b.as_deref(), Some("abc"));
                assert_eq!(data.buffer_c.as_deref(), Some("xyz"));
            }
            _ => panic!("expected TransactionRequest reply"),
        }
    }
}
