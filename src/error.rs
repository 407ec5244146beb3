use alloc::string::{String, ToString};

/// Errors raised while building, querying or persisting a [`Context`](crate::Context),
/// or while operating on encrypted binary numbers.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Invalid or inconsistent construction inputs.
    #[error("invalid parameter: {0}")]
    Parameter(String),
    /// No prime or modulus satisfying the constraints within the bounded search.
    #[error("parameter search failed: {0}")]
    ParameterSearch(String),
    /// An operation was invoked on an object in a state that does not allow it.
    #[error("logic error: {0}")]
    Logic(String),
    /// Malformed, truncated or inconsistent persisted data.
    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub(crate) fn parameter(msg: impl Into<String>) -> Self {
        Self::Parameter(msg.into())
    }

    pub(crate) fn search(msg: impl Into<String>) -> Self {
        Self::ParameterSearch(msg.into())
    }

    pub(crate) fn logic(msg: impl Into<String>) -> Self {
        Self::Logic(msg.into())
    }

    pub(crate) fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

impl From<bincode::error::EncodeError> for Error {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<bincode::error::DecodeError> for Error {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
