//! Error taxonomy for the protocol engine.

use std::io;

use thiserror::Error;

use super::ack::{AckCode, AckError};

#[derive(Debug, Error)]
pub enum MpdError {
    /// Dial, read or write failure on the transport.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended before the greeting line arrived.
    #[error("connection closed before greeting")]
    UnexpectedEof,

    /// The stream ended in the middle of a command exchange.
    #[error("connection closed by server")]
    ConnectionClosed,

    #[error("unexpected MPD response: '{0}'")]
    UnexpectedGreeting(String),

    #[error("MPD reported empty version number")]
    EmptyVersion,

    /// An `ACK` line that does not follow the documented format. Line
    /// framing can no longer be trusted after this.
    #[error("couldn't parse ACK error: '{0}'")]
    MalformedAck(String),

    /// Structured error reply from the daemon.
    #[error("MPD error {0}")]
    Ack(#[from] AckError),

    #[error("command must not contain line terminators: {0:?}")]
    InvalidCommand(String),

    #[error("volume level {0} is outside valid range of 0-100")]
    VolumeOutOfRange(i32),

    #[error("unknown replay gain mode '{0}'")]
    UnknownReplayGainMode(String),
}

impl MpdError {
    pub fn is_ack(&self) -> bool {
        matches!(self, Self::Ack(_))
    }

    pub fn ack(&self) -> Option<&AckError> {
        match self {
            Self::Ack(ack) => Some(ack),
            _ => None,
        }
    }

    /// Shortcut for checking an ACK's code, e.g. to tolerate
    /// [`AckCode::NO_EXIST`] on a best-effort delete.
    pub fn is_ack_code(&self, code: AckCode) -> bool {
        self.ack().is_some_and(|ack| ack.code() == code)
    }

    /// True when the session's framing state is unknown and it should be
    /// dropped rather than reused.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::UnexpectedEof
                | Self::ConnectionClosed
                | Self::UnexpectedGreeting(_)
                | Self::EmptyVersion
                | Self::MalformedAck(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MpdError>;
