//! MPD protocol engine.
//!
//! - [`wire`]: `\n`-framed reader and writer over an async byte stream
//! - [`session`]: greeting handshake and the locked command exchange
//! - [`ack`]: decoding of `ACK [code@index] {command} message` replies
//! - [`commands`]: playback-option commands and argument encoding

pub mod ack;
pub mod commands;
pub mod error;
pub mod response;
pub mod session;
pub mod wire;

pub use ack::{AckCode, AckError};
pub use commands::{Argument, CommandLine, ReplayGainMode};
pub use error::{MpdError, Result};
pub use response::Response;
pub use session::Session;

/// Default MPD TCP port.
pub const DEFAULT_PORT: u16 = 6600;
