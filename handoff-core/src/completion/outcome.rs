//! Terminal result of one transfer

/// Engine-specific error code reported with a failed completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    /// Code used when the engine can't classify the failure
    pub const UNKNOWN: Self = Self(0xFFFF);

    /// Raw numeric value
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl From<u16> for ErrorCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// Completion outcome, produced exactly once per transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Transfer finished and all bytes were clocked
    Success,
    /// Transfer finished with a peripheral-reported fault
    Error(ErrorCode),
}

impl Outcome {
    /// Shorthand for `Outcome::Error(ErrorCode(code))`
    pub const fn error(code: u16) -> Self {
        Outcome::Error(ErrorCode(code))
    }

    /// Check if the transfer succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Convert into a `Result`, keeping the error code
    pub fn into_result(self) -> Result<(), ErrorCode> {
        match self {
            Outcome::Success => Ok(()),
            Outcome::Error(code) => Err(code),
        }
    }
}
