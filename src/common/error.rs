// src/common/error.rs

use super::command::CommandError;
use super::record::RecordError;

/// Errors surfaced by the Protocol A controller and instrument session.
///
/// `E` is the error type of the underlying channel.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError<E = ()>
where
    E: core::fmt::Debug, // Needed by the Io/Configuration format strings
{
    /// Underlying I/O error from the channel implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// The channel could not be opened or configured. Fatal for the session.
    #[error("channel configuration failed: {0:?}")]
    Configuration(E),

    /// The expected control token was not observed before the deadline.
    #[error("protocol timeout waiting for the instrument")]
    Timeout,

    /// A command argument failed validation; nothing was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CommandError),

    /// A transfer record could not be parsed. The transfer was aborted without
    /// acknowledging the record, so the instrument is left waiting for an ACK.
    #[error("malformed transfer data: {0}")]
    MalformedData(RecordError),

    /// The session was closed before this operation.
    #[error("channel closed")]
    ChannelClosed,
}

impl<E: core::fmt::Debug> From<RecordError> for ProtocolError<E> {
    fn from(e: RecordError) -> Self {
        ProtocolError::MalformedData(e)
    }
}

impl<E: core::fmt::Debug> ProtocolError<E> {
    /// True when the instrument may be mid-exchange and a fresh handshake is needed.
    pub fn desynchronizes(&self) -> bool {
        matches!(self, ProtocolError::Timeout | ProtocolError::MalformedData(_) | ProtocolError::Io(_))
    }
}
