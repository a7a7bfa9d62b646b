use crate::graph::format::PixelFormat;

/// Convenience result type used across steadycam.
pub type SteadycamResult<T> = Result<T, SteadycamError>;

/// Top-level error taxonomy for graph construction and execution.
#[derive(thiserror::Error, Debug)]
pub enum SteadycamError {
    /// Invalid option combination or value (unknown vendor, unsupported projection, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No conversion rule moves frames between the two memory domains.
    #[error("cannot convert between {from} and {to}")]
    UnsupportedConversion {
        /// Format frames are currently in.
        from: PixelFormat,
        /// Format the next stage requires.
        to: PixelFormat,
    },

    /// Source metadata could not be read.
    #[error("probe error: {0}")]
    Probe(String),

    /// The external engine failed or exited unsuccessfully.
    #[error("process execution error: {0}")]
    ProcessExecution(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SteadycamError {
    /// Build a [`SteadycamError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`SteadycamError::UnsupportedConversion`] value.
    pub fn unsupported_conversion(from: PixelFormat, to: PixelFormat) -> Self {
        Self::UnsupportedConversion { from, to }
    }

    /// Build a [`SteadycamError::Probe`] value.
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Build a [`SteadycamError::ProcessExecution`] value.
    pub fn process(msg: impl Into<String>) -> Self {
        Self::ProcessExecution(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
