use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Error codes for failures raised inside the terminal core.
///
/// The core never unwinds across its public boundary (§7); these are used
/// internally, and collaborator-facing failures are folded into a Command
/// Reject reply rather than propagated.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// Generic failure code
    Failure = -1,
    /// A collaborator (screens/states/FIT/crypto) rejected a load or call
    Collaborator = -2,
    /// Input did not match the expected shape (card track data, FDK mask, ...)
    MalformedInput = -3,
    /// A precondition (card present, PIN buffer non-empty, ...) was missing
    MissingPrecondition = -4,
}

impl From<ErrorCode> for &'static str {
    fn from(e: ErrorCode) -> Self {
        match e {
            ErrorCode::Failure => "failure",
            ErrorCode::Collaborator => "collaborator rejection",
            ErrorCode::MalformedInput => "malformed input",
            ErrorCode::MissingPrecondition => "missing precondition",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(*self))
    }
}

/// Basic error type for the terminal core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    /// Create a generic failure [Error].
    pub fn failure<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            code: ErrorCode::Failure,
            message: message.into(),
        }
    }

    /// Create a collaborator-rejection [Error].
    pub fn collaborator<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            code: ErrorCode::Collaborator,
            message: message.into(),
        }
    }

    /// Create a malformed-input [Error].
    pub fn malformed<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            code: ErrorCode::MalformedInput,
            message: message.into(),
        }
    }

    /// Create a missing-precondition [Error].
    pub fn missing<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            code: ErrorCode::MissingPrecondition,
            message: message.into(),
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code: {}, message: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed("unknown command code: Nonsense");
        assert_eq!(err.code(), ErrorCode::MalformedInput);
        assert_eq!(
            format!("{err}"),
            "code: malformed input, message: unknown command code: Nonsense"
        );
    }
}
