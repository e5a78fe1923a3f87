//! State interpreter (C5): the polymorphic dispatch loop over state kinds.
//!
//! [process_state] is the only entry point. It is invoked by every public
//! [crate::Terminal] method that can move the state machine: card reads,
//! pinpad/FDK button presses, and the "Transaction Reply Command" /
//! "Go in-service" paths of the host message dispatcher (C7).

use crate::error::Error;
use crate::fdk::{ActiveFdks, Fdk};
use crate::input::Input;
use crate::state::{fdk_extension_index, State};
use crate::terminal::Terminal;
use crate::transaction;

/// Safety bound on consecutive transitions within a single [process_state]
/// call. Exceeding it means the state table describes a cycle with no
/// input-awaiting state, not an error in caller-supplied data.
const MAX_TRANSITIONS: usize = 20;

/// Drive the state machine starting from `start`, following the table until
/// a handler awaits input (returns no next state) or the transition bound
/// is hit.
pub fn process_state(terminal: &mut Terminal, start: &str) {
    let mut current = start.to_string();

    for _ in 0..MAX_TRANSITIONS {
        let state = match terminal.collaborators.states.get(&current) {
            Some(state) => state,
            None => {
                log::warn!("no state table entry for state {current}");
                terminal.current_state = current;
                return;
            }
        };

        let next = dispatch(terminal, &state);

        match next {
            Some(next) if next == current => {
                // Stayed in place awaiting more input; preserve the queue.
                terminal.current_state = current;
                return;
            }
            Some(next) => {
                terminal.buttons_pressed.clear();
                current = next;
            }
            None => {
                terminal.current_state = current;
                return;
            }
        }
    }

    log::error!(
        "{}",
        Error::failure(format!(
            "state table cycle detected starting at {start}, aborting after {MAX_TRANSITIONS} transitions"
        ))
    );
    terminal.current_state = current;
}

fn dispatch(terminal: &mut Terminal, state: &State) -> Option<String> {
    match state {
        State::CardRead {
            screen_number,
            good_read_next_state,
            ..
        } => {
            terminal.buffers.init_buffers();
            terminal.opcode.init();
            terminal.collaborators.display.set_screen_by_number(screen_number);
            terminal.card.as_ref().map(|_| good_read_next_state.clone())
        }

        State::PinEntry {
            screen_number,
            remote_pin_check_next_state,
            ..
        } => {
            terminal.collaborators.display.set_screen_by_number(screen_number);
            terminal.active_fdks = ActiveFdks::parse("001").unwrap_or_default();

            let max_len = terminal
                .card
                .as_ref()
                .and_then(|card| terminal.collaborators.fits.max_pin_length(card.number()))
                .unwrap_or(crate::buffers::DEFAULT_MAX_PIN_LEN);

            let mut enter_seen = false;
            while let Some(input) = terminal.buttons_pressed.pop_front() {
                match input {
                    Input::Digit(d) => terminal.buffers.push_pin(d, max_len),
                    Input::Enter => enter_seen = true,
                    _ => {}
                }
            }

            let pin_len = terminal.buffers.pin().len();
            if pin_len >= max_len || (pin_len >= 4 && enter_seen) {
                Some(remote_pin_check_next_state.clone())
            } else {
                None
            }
        }

        State::OpcodeFromState {
            header,
            template,
            extension_state,
            next_state,
        } => {
            terminal.opcode.load_from_state(template);
            if let Some(ext) = extension_state {
                log::debug!("state {} installed opcode with extension state {ext}", header.number);
            }
            Some(next_state.clone())
        }

        State::FourFdkSelection {
            screen_number,
            fdk_next_states,
            buffer_location,
            ..
        } => {
            terminal.collaborators.display.set_screen_by_number(screen_number);
            terminal.active_fdks = ActiveFdks::none();
            for key in [Fdk::A, Fdk::B, Fdk::C, Fdk::D] {
                if fdk_next_states.is_active(key) {
                    terminal.active_fdks.insert(key);
                }
            }

            let key = terminal.buttons_pressed.pop_front()?.as_fdk()?;
            let next = fdk_next_states.next_state(key)?.to_string();

            match 7usize.checked_sub(*buffer_location as usize) {
                Some(pos) => {
                    if let Err(e) = terminal.opcode.set_at(pos, key.into()) {
                        log::error!("failed to write FDK selection into opcode: {e}");
                    }
                }
                None => log::error!("four-FDK selection buffer_location out of range: {buffer_location}"),
            }

            Some(next)
        }

        State::AmountEntry {
            screen_number,
            fdk_next_states,
            ..
        } => {
            terminal.collaborators.display.set_screen_by_number(screen_number);
            terminal.active_fdks = ActiveFdks::parse("015").unwrap_or_default();

            match terminal.buttons_pressed.pop_front() {
                Some(Input::Digit(d)) => {
                    terminal.buffers.set_amount(&d.to_string());
                    None
                }
                Some(input) => input
                    .as_fdk()
                    .and_then(|key| fdk_next_states.next_state(key))
                    .map(str::to_string),
                None => None,
            }
        }

        State::InformationEntry {
            screen_number,
            fdk_next_states,
            buffer_and_display_param,
            ..
        } => {
            terminal.collaborators.display.set_screen_by_number(screen_number);

            let mut mask = String::from("0");
            for key in [Fdk::A, Fdk::B, Fdk::C, Fdk::D] {
                mask.push(if fdk_next_states.is_active(key) { '1' } else { '0' });
            }
            terminal.active_fdks = ActiveFdks::parse(&mask).unwrap_or_default();

            if let Some(input) = terminal.buttons_pressed.pop_front() {
                if let Some(key) = input.as_fdk() {
                    if let Some(next) = fdk_next_states.next_state(key) {
                        return Some(next.to_string());
                    }
                }
            }

            match buffer_and_display_param {
                '0' | '1' => terminal.buffers.clear_c(),
                '2' | '3' => terminal.buffers.clear_b(),
                other => log::warn!("unrecognized information-entry display param: {other}"),
            }
            None
        }

        State::TransactionRequest {
            screen_number,
            flags,
            ..
        } => {
            terminal.collaborators.display.set_screen_by_number(screen_number);

            if !terminal.interactive_transaction {
                terminal.transaction_request = Some(transaction::assemble(terminal, flags));
            } else if let Some(input) = terminal.buttons_pressed.pop_front() {
                terminal.buffers.push_b(input.as_char());
                terminal.transaction_request = Some(transaction::assemble(terminal, flags));
            }

            None
        }

        State::Close {
            receipt_delivered_screen,
            ..
        } => {
            terminal
                .collaborators
                .display
                .set_screen_by_number(receipt_delivered_screen);
            terminal.active_fdks = ActiveFdks::none();
            terminal.card = None;
            None
        }

        State::FitExit { state_exits, .. } => {
            let card = terminal.card.as_ref()?;
            let institution_id = terminal
                .collaborators
                .fits
                .institution_by_card_number(card.number())?;
            match institution_id.parse::<usize>() {
                Ok(index) => state_exits.get(index).cloned(),
                Err(_) => {
                    log::warn!("institution id is not a valid exit index: {institution_id}");
                    None
                }
            }
        }

        State::FdkBufferLookup { states, .. } => terminal
            .buffers
            .fdk_buffer()
            .and_then(|key| states.get(&key).cloned()),

        State::StoreAndActivate {
            screen_number,
            fdk_active_mask,
            extension_state,
            buffer_id,
            fdk_next_state,
            ..
        } => {
            terminal.collaborators.display.set_screen_by_number(screen_number);
            terminal.active_fdks = ActiveFdks::parse(fdk_active_mask).unwrap_or_default();

            let key = terminal.buttons_pressed.pop_front()?.as_fdk()?;
            if !terminal.active_fdks.is_active(key) {
                return None;
            }
            terminal.buffers.set_fdk_buffer(key);

            if let Some(ext) = extension_state {
                if let Some(value) = fdk_extension_index(key).and_then(|i| ext.entry(i)) {
                    let pad = buffer_id
                        .chars()
                        .nth(2)
                        .and_then(|c| c.to_digit(10))
                        .unwrap_or(0) as usize;
                    let padded = format!("{value}{}", "0".repeat(pad));
                    match buffer_id.chars().nth(1) {
                        Some('1') => terminal.buffers.set_b(padded),
                        Some('2') => terminal.buffers.set_c(padded),
                        Some('3') => terminal.buffers.set_amount(&padded),
                        other => log::warn!("unrecognized store-and-activate buffer target: {other:?}"),
                    }
                }
            }

            Some(fdk_next_state.clone())
        }

        State::StoreFdkToOpcode {
            header,
            screen_number,
            fdk_active_mask,
            extension_state,
            buffer_positions,
            fdk_next_state,
        } => {
            terminal.collaborators.display.set_screen_by_number(screen_number);
            terminal.active_fdks = ActiveFdks::parse(fdk_active_mask).unwrap_or_default();

            if extension_state.is_some() {
                log::warn!(
                    "state {} uses extension-state-driven FDK-to-opcode storage, which is not implemented",
                    header.number
                );
                return None;
            }

            let key = terminal.buttons_pressed.pop_front()?.as_fdk()?;
            if !terminal.active_fdks.is_active(key) {
                return None;
            }
            terminal.buffers.set_fdk_buffer(key);

            if let Ok(pos) = buffer_positions.parse::<usize>() {
                if let Err(e) = terminal.opcode.set_at(pos, key.into()) {
                    log::error!("failed to write FDK into opcode position: {e}");
                }
            }

            Some(fdk_next_state.clone())
        }

        State::IccBeginInit {
            icc_init_not_started_next_state,
            ..
        } => Some(icc_init_not_started_next_state.clone()),

        State::IccCompleteAppInit {
            please_wait_screen_number,
            extension_state,
            ..
        } => {
            terminal
                .collaborators
                .display
                .set_screen_by_number(please_wait_screen_number);
            extension_state.entry(8).map(str::to_string)
        }

        State::IccReInit {
            processing_not_performed_next_state,
            ..
        } => Some(processing_not_performed_next_state.clone()),

        State::IccSetData { next_state, .. } => Some(next_state.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::collaborators::Collaborators;
    use crate::state::{FdkNextStates, StateHeader, TransactionFlags};
    use crate::testing::{FakeCrypto, FakeDisplay, FakeFits, FakeHardware, FakeScreens, FakeSettings, FakeStates};
    use crate::Terminal;

    fn header(number: &str) -> StateHeader {
        StateHeader {
            number: number.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_pin_entry_happy_path_needs_no_enter() {
        let mut states = FakeStates::default();
        states.table.insert(
            "100".to_string(),
            State::PinEntry {
                header: header("100"),
                screen_number: "050".to_string(),
                remote_pin_check_next_state: "101".to_string(),
            },
        );

        let mut fits = FakeFits::default();
        fits.max_pin_lengths.insert("4761739001010010".to_string(), 4);

        let collaborators = Collaborators {
            screens: Box::new(FakeScreens::default()),
            states: Box::new(states),
            fits: Box::new(fits),
            crypto: Box::new(FakeCrypto::default()),
            display: Box::new(FakeDisplay::default()),
            hardware: Box::new(FakeHardware),
            settings: Box::new(FakeSettings::default()),
        };

        let mut terminal = Terminal::new(collaborators);
        terminal.card = Some(Card::parse(";4761739001010010=26011010000012345678?").unwrap());
        terminal.current_state = "100".to_string();

        for d in ['1', '2', '3', '4'] {
            terminal.process_pinpad_button_pressed(Input::Digit(d));
        }

        assert_eq!(terminal.pin(), "1234");
        assert_eq!(terminal.current_state(), "101");
    }

    fn terminal_with_states(states: FakeStates) -> Terminal {
        let collaborators = Collaborators {
            screens: Box::new(FakeScreens::default()),
            states: Box::new(states),
            fits: Box::new(FakeFits::default()),
            crypto: Box::new(FakeCrypto::default()),
            display: Box::new(FakeDisplay::default()),
            hardware: Box::new(FakeHardware),
            settings: Box::new(FakeSettings::default()),
        };
        Terminal::new(collaborators)
    }

    #[test]
    fn test_amount_entry_digits_accumulate_into_amount_buffer() {
        let mut states = FakeStates::default();
        states.table.insert(
            "200".to_string(),
            State::AmountEntry {
                header: header("200"),
                screen_number: "060".to_string(),
                fdk_next_states: FdkNextStates::default(),
            },
        );

        let mut terminal = terminal_with_states(states);
        terminal.current_state = "200".to_string();

        terminal.process_pinpad_button_pressed(Input::Digit('1'));
        assert_eq!(terminal.buffers.amount(), "000000000001");
        assert_eq!(terminal.current_state(), "200");

        terminal.process_pinpad_button_pressed(Input::Digit('0'));
        assert_eq!(terminal.buffers.amount(), "000000000010");

        terminal.process_pinpad_button_pressed(Input::Digit('0'));
        assert_eq!(terminal.buffers.amount(), "000000000100");
        assert_eq!(terminal.current_state(), "200");
    }

    #[test]
    fn test_amount_entry_active_fdk_exits() {
        let mut states = FakeStates::default();
        states.table.insert(
            "200".to_string(),
            State::AmountEntry {
                header: header("200"),
                screen_number: "060".to_string(),
                fdk_next_states: FdkNextStates {
                    a: "201".to_string(),
                    ..Default::default()
                },
            },
        );

        let mut terminal = terminal_with_states(states);
        terminal.current_state = "200".to_string();

        terminal.process_fdk_button_pressed(Fdk::A);
        assert_eq!(terminal.current_state(), "201");
    }

    #[test]
    fn test_interactive_transaction_request_copies_non_digit_input_to_buffer_b() {
        let mut states = FakeStates::default();
        states.table.insert(
            "300".to_string(),
            State::TransactionRequest {
                header: header("300"),
                screen_number: "070".to_string(),
                flags: TransactionFlags::default(),
            },
        );

        let mut terminal = terminal_with_states(states);
        terminal.current_state = "300".to_string();
        terminal.interactive_transaction = true;

        terminal.process_pinpad_button_pressed(Input::Enter);

        assert_eq!(terminal.buffers.b(), "E");
        assert!(terminal.take_transaction_request().is_some());
    }
}
