use std::fmt;

/// Stable `E####` identifiers attached to failures in JSON output.
///
/// The leading digit groups them: 1 setup, 2 lookups and input, 3 and 5
/// storage, 4 admin access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    RecordNotFound,
    ProgramNotFound,
    ValidationFailed,
    StorageRead,
    StorageWrite,
    QuotaExceeded,
    Unauthorized,
    SessionExpired,
    SessionTampered,
}

impl ErrorCode {
    pub const ALL: [Self; 11] = [
        Self::NotInitialized,
        Self::ConfigParseError,
        Self::RecordNotFound,
        Self::ProgramNotFound,
        Self::ValidationFailed,
        Self::StorageRead,
        Self::StorageWrite,
        Self::QuotaExceeded,
        Self::Unauthorized,
        Self::SessionExpired,
        Self::SessionTampered,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::RecordNotFound => "E2001",
            Self::ProgramNotFound => "E2002",
            Self::ValidationFailed => "E2003",
            Self::StorageRead => "E3001",
            Self::Unauthorized => "E4001",
            Self::SessionExpired => "E4002",
            Self::SessionTampered => "E4003",
            Self::StorageWrite => "E5001",
            Self::QuotaExceeded => "E5002",
        }
    }

    /// What the user can do next.
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::NotInitialized => "Run `enrol init` to initialize this directory.",
            Self::ConfigParseError => "Fix syntax in .enrol/config.toml and retry.",
            Self::RecordNotFound => "Use `enrol university list` to find the exact name or id.",
            Self::ProgramNotFound => "Use `enrol programs` to copy a valid program id.",
            Self::ValidationFailed => "Fix the reported fields and resubmit.",
            Self::StorageRead => "Defaults are shown. Run `enrol check` to retry the load.",
            Self::StorageWrite => "Check disk space and write permissions.",
            Self::QuotaExceeded => "Raise storage.max_value_bytes or remove old records.",
            Self::Unauthorized => "Run `enrol login` first.",
            Self::SessionExpired => "Run `enrol login` again.",
            Self::SessionTampered => "Run `enrol logout` and then `enrol login`.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
