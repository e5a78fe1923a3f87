//! Host Message Dispatcher (C7): classifies inbound host messages, routes
//! them to handlers that mutate terminal configuration or drive the state
//! machine, and synthesizes solicited-status replies.

use crate::error::Error;
use crate::jsonrpc::{
    status_descriptor, CustomizationCommand, DataCommand, EncryptionKeyModifier, HostMessage,
    Reply, ReplyData, SolicitedStatusData, TerminalCommandCode, TerminalStateData,
};
use crate::terminal::Terminal;
use crate::terminal_status::TerminalStatus;

fn luno(terminal: &Terminal) -> String {
    terminal
        .collaborators
        .settings
        .get("host.luno")
        .unwrap_or_else(|| crate::transaction::DEFAULT_LUNO.to_string())
}

fn ready(terminal: &Terminal) -> Reply {
    Reply::ready_state(ReplyData::SolicitedStatus(SolicitedStatusData::ready(
        luno(terminal),
    )))
}

fn command_reject(terminal: &Terminal) -> Reply {
    Reply::ready_state(ReplyData::SolicitedStatus(
        SolicitedStatusData::command_reject(luno(terminal)),
    ))
}

/// Logs a collaborator-rejection error when `accepted` is false, then
/// passes it through unchanged (§7: "Collaborator rejection").
fn reject_if_false(accepted: bool, what: &str) -> bool {
    if !accepted {
        log::warn!("{}", Error::collaborator(format!("{what} rejected by collaborator")));
    }
    accepted
}

/// Top-level entry point for C7 (§4.7).
pub fn process_host_message(terminal: &mut Terminal, message: HostMessage) -> Reply {
    match message {
        HostMessage::TerminalCommand { command_code } => terminal_command(terminal, command_code),
        HostMessage::DataCommand(cmd) => data_command(terminal, cmd),
        HostMessage::TransactionReplyCommand {
            next_state,
            screen_display_update,
            notes_to_dispense,
            printer_data,
        } => transaction_reply(
            terminal,
            &next_state,
            screen_display_update.as_deref(),
            notes_to_dispense.as_deref(),
            printer_data.as_deref(),
        ),
        HostMessage::EmvConfiguration => ready(terminal),
    }
}

fn terminal_command(terminal: &mut Terminal, code: TerminalCommandCode) -> Reply {
    match code {
        TerminalCommandCode::GoInService => {
            terminal.set_status(TerminalStatus::InService);
            let screen = terminal.status.in_service_screen();
            terminal.process_state_from(&screen);
            terminal.buffers.init_buffers();
            terminal.opcode.init();
            terminal.active_fdks = crate::fdk::ActiveFdks::none();
            ready(terminal)
        }
        TerminalCommandCode::GoOutOfService => {
            terminal.set_status(TerminalStatus::OutOfService);
            terminal.buffers.init_buffers();
            terminal.opcode.init();
            terminal.active_fdks = crate::fdk::ActiveFdks::none();
            terminal.card = None;
            ready(terminal)
        }
        TerminalCommandCode::SendConfigurationInformation => {
            let hw = &terminal.collaborators.hardware;
            let data = TerminalStateData {
                luno_atm: luno(terminal),
                status_descriptor: status_descriptor::TERMINAL_STATE,
                config_id: terminal.config_id().to_string(),
                hardware_fitness: Some(hw.hardware_fitness()),
                hardware_configuration: Some(
                    terminal.status.host_config().hardware_configuration().to_string(),
                ),
                supplies_status: Some(hw.supplies_status()),
                sensor_status: Some(terminal.status.host_config().sensor_status().to_string()),
                release_number: Some(hw.release_number()),
                ndc_software_id: Some(hw.hardware_id()),
                ..Default::default()
            };
            Reply::ready_state(ReplyData::TerminalState(data))
        }
        TerminalCommandCode::SendConfigurationId => {
            let data = TerminalStateData {
                luno_atm: luno(terminal),
                status_descriptor: status_descriptor::TERMINAL_STATE,
                config_id: terminal.config_id().to_string(),
                ..Default::default()
            };
            Reply::ready_state(ReplyData::TerminalState(data))
        }
        TerminalCommandCode::SendSupplyCounters => {
            let data = TerminalStateData {
                luno_atm: luno(terminal),
                status_descriptor: status_descriptor::TERMINAL_STATE,
                sub_status_descriptor: Some(status_descriptor::SUPPLY_COUNTERS_SUB),
                config_id: terminal.config_id().to_string(),
                supply_counters: Some(terminal.supply_counters.clone()),
                ..Default::default()
            };
            Reply::ready_state(ReplyData::TerminalState(data))
        }
        TerminalCommandCode::Unknown(code) => {
            log::warn!("unknown terminal command code: {code}");
            command_reject(terminal)
        }
    }
}

fn data_command(terminal: &mut Terminal, cmd: DataCommand) -> Reply {
    match cmd {
        DataCommand::Customization(customization) => customization_command(terminal, customization),
        DataCommand::InteractiveTransactionResponse {
            active_keys,
            dynamic_screen_data,
        } => {
            terminal.interactive_transaction = true;
            if let Some(mask) = active_keys {
                match crate::fdk::ActiveFdks::parse(&mask) {
                    Ok(set) => terminal.active_fdks = set,
                    Err(e) => log::warn!("invalid active_keys mask on interactive response: {e}"),
                }
            }
            let screen = terminal
                .collaborators
                .screens
                .parse_dynamic_screen_data(&dynamic_screen_data);
            terminal.collaborators.display.set_screen(&screen);
            ready(terminal)
        }
        DataCommand::ExtendedEncryptionKeyInformation { modifier, key_data } => {
            match modifier {
                EncryptionKeyModifier::DecipherNewCommsKeyWithCurrentMasterKey => {
                    let len = key_data.len();
                    if terminal.collaborators.crypto.set_comms_key(&key_data, len) {
                        ready(terminal)
                    } else {
                        log::warn!("{}", Error::collaborator("comms key install rejected by crypto collaborator"));
                        command_reject(terminal)
                    }
                }
                EncryptionKeyModifier::Unknown(modifier) => {
                    log::warn!("unknown extended encryption key modifier: {modifier}");
                    command_reject(terminal)
                }
            }
        }
    }
}

fn customization_command(terminal: &mut Terminal, cmd: CustomizationCommand) -> Reply {
    let accepted = match &cmd {
        CustomizationCommand::ScreenDataLoad(payload) => {
            reject_if_false(terminal.collaborators.screens.add(payload), "screen data load")
        }
        CustomizationCommand::StateTablesLoad(payload) => {
            reject_if_false(terminal.collaborators.states.add(payload), "state table load")
        }
        CustomizationCommand::FitDataLoad(payload) => {
            reject_if_false(terminal.collaborators.fits.add(payload), "FIT data load")
        }
        CustomizationCommand::ConfigurationIdNumberLoad(payload) => {
            terminal.set_config_id(payload.clone());
            true
        }
        CustomizationCommand::EnhancedConfigurationDataLoad(params) => {
            for param in params {
                terminal.status.host_config_mut().apply_param(&param.id, &param.value);
            }
            true
        }
        CustomizationCommand::Unknown(identifier) => {
            log::warn!("{}", Error::malformed(format!("unknown customization message identifier: {identifier}")));
            false
        }
    };

    if accepted {
        ready(terminal)
    } else {
        command_reject(terminal)
    }
}

fn transaction_reply(
    terminal: &mut Terminal,
    next_state: &str,
    screen_display_update: Option<&str>,
    notes_to_dispense: Option<&str>,
    printer_data: Option<&str>,
) -> Reply {
    terminal.process_state_from(next_state);

    if let Some(raw) = screen_display_update {
        let screen = terminal.collaborators.screens.parse_screen_display_update(raw);
        terminal.collaborators.display.set_screen(&screen);
    }

    if let Some(notes) = notes_to_dispense {
        if !notes.is_empty() {
            log::info!("dispensing notes: {notes}");
            let count = notes.split(',').filter(|s| !s.is_empty()).count() as u64;
            terminal.supply_counters.add_notes_dispensed(count.max(1));
        }
    }

    if let Some(printer) = printer_data {
        log::info!("printer data: {printer}");
    }

    ready(terminal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonrpc::EnhancedConfigParam;
    use crate::testing::fake_collaborators;

    fn terminal_command(code: TerminalCommandCode) -> HostMessage {
        HostMessage::TerminalCommand { command_code: code }
    }

    #[test]
    fn test_unknown_terminal_command_is_rejected() {
        let mut terminal = Terminal::new(fake_collaborators());
        let reply = process_host_message(
            &mut terminal,
            terminal_command(TerminalCommandCode::Unknown("Nonsense".to_string())),
        );

        match reply.data {
            ReplyData::SolicitedStatus(data) => {
                assert_eq!(data.luno_atm, "009");
                assert_eq!(data.status_descriptor, status_descriptor::COMMAND_REJECT);
            }
            _ => panic!("expected SolicitedStatus reply"),
        }
    }

    #[test]
    fn test_go_in_service_then_out_of_service_clears_buffers_and_card() {
        let mut terminal = Terminal::new(fake_collaborators());
        terminal.buffers.push_b('x');
        terminal.card = Some(crate::card::Card::parse(";4761739001010010=26011010000012345678?").unwrap());

        process_host_message(&mut terminal, terminal_command(TerminalCommandCode::GoInService));
        assert_eq!(terminal.status(), TerminalStatus::InService);

        process_host_message(&mut terminal, terminal_command(TerminalCommandCode::GoOutOfService));
        assert_eq!(terminal.status(), TerminalStatus::OutOfService);
        assert_eq!(terminal.buffers.b(), "");
        assert!(terminal.card().is_none());
    }

    #[test]
    fn test_two_consecutive_configuration_id_requests_match() {
        let mut terminal = Terminal::new(fake_collaborators());
        let first = process_host_message(
            &mut terminal,
            terminal_command(TerminalCommandCode::SendConfigurationId),
        );
        let second = process_host_message(
            &mut terminal,
            terminal_command(TerminalCommandCode::SendConfigurationId),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_enhanced_configuration_data_load_sets_initial_screen() {
        let mut terminal = Terminal::new(fake_collaborators());
        let msg = HostMessage::DataCommand(DataCommand::Customization(
            CustomizationCommand::EnhancedConfigurationDataLoad(vec![EnhancedConfigParam {
                id: "000".to_string(),
                value: "7".to_string(),
            }]),
        ));
        let reply = process_host_message(&mut terminal, msg);
        assert!(matches!(reply.data, ReplyData::SolicitedStatus(_)));
        assert_eq!(
            terminal.status.host_config().initial_screen_number(),
            Some("007")
        );
    }

    #[test]
    fn test_rejected_screen_data_load_yields_command_reject() {
        use crate::collaborators::Collaborators;
        use crate::testing::{FakeCrypto, FakeDisplay, FakeFits, FakeHardware, FakeScreens, FakeSettings, FakeStates};

        let mut screens = FakeScreens::default();
        screens.reject_next = true;

        let collaborators = Collaborators {
            screens: Box::new(screens),
            states: Box::new(FakeStates::default()),
            fits: Box::new(FakeFits::default()),
            crypto: Box::new(FakeCrypto::default()),
            display: Box::new(FakeDisplay::default()),
            hardware: Box::new(FakeHardware),
            settings: Box::new(FakeSettings::default()),
        };

        let mut terminal = Terminal::new(collaborators);
        let msg = HostMessage::DataCommand(DataCommand::Customization(
            CustomizationCommand::ScreenDataLoad("bad screen data".to_string()),
        ));
        let reply = process_host_message(&mut terminal, msg);

        match reply.data {
            ReplyData::SolicitedStatus(data) => {
                assert_eq!(data.status_descriptor, status_descriptor::COMMAND_REJECT);
            }
            _ => panic!("expected SolicitedStatus reply"),
        }
    }
}
