use std::{error, fmt};

// -------------------------------------------------------------------------------------------------

/// Provides an enumeration of all possible errors reported by phasewheel.
///
/// Errors are only reported at the engine's boundaries: when validating configurations, when
/// looking up parameters or when sending messages from control threads. The real-time block
/// processing never fails: it clamps or substitutes invalid values instead.
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    InvalidSampleRate(u32),
    ParameterError(String),
    SendError(String),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSampleRate(rate) => write!(f, "Invalid sample rate: {rate}"),
            Self::ParameterError(str) => write!(f, "Invalid parameter: {str}"),
            Self::SendError(str) => write!(f, "Failed to send engine message: {str}"),
        }
    }
}
