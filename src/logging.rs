pub const TERMINAL_LOG_PREFIX: &str = "ATM TERMINAL";

/// Numeric verbosity level, convertible to [log::LevelFilter].
///
/// Embedding applications that store a single verbosity knob (e.g. loaded
/// from a configuration file) can convert it directly into a filter for the
/// `log` crate, which is how the terminal core itself emits all of its
/// diagnostics (`log::info!`/`warn!`/`error!`).
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off = 0,
    Critical,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<u32> for LogLevel {
    fn from(level: u32) -> Self {
        match level {
            0 => Self::Off,
            1 => Self::Critical,
            2 => Self::Error,
            3 => Self::Warn,
            4 => Self::Info,
            5 => Self::Debug,
            6 => Self::Trace,
            _ => Self::Off,
        }
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Critical | LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_u32() {
        assert_eq!(LogLevel::from(0), LogLevel::Off);
        assert_eq!(LogLevel::from(4), LogLevel::Info);
        assert_eq!(LogLevel::from(99), LogLevel::Off);
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(log::LevelFilter::from(LogLevel::Trace), log::LevelFilter::Trace);
        assert_eq!(log::LevelFilter::from(LogLevel::Critical), log::LevelFilter::Error);
    }
}
