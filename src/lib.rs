//! MPD Control
//!
//! Client for the Music Player Daemon text protocol.
//!
//! This library provides:
//! - A session engine that performs the greeting handshake and serializes
//!   command exchanges over one shared connection
//! - Command lists (atomic batches) with per-command or combined replies
//! - Typed decoding of `ACK` error replies
//! - Playback-option commands (volume, crossfade, repeat, replay gain, ...)
//! - Layered configuration for the `mpdctl` binary
//!
//! ```rust,no_run
//! use mpd_control::mpd::{ReplayGainMode, Session};
//!
//! # async fn run() -> mpd_control::mpd::Result<()> {
//! let session = Session::connect("localhost:6600").await?;
//! println!("protocol {}", session.version());
//!
//! session.set_volume(40).await?;
//! session.set_replay_gain_mode(ReplayGainMode::Album).await?;
//!
//! for line in session.send("status").await? {
//!     println!("{}", line);
//! }
//! session.close().await
//! # }
//! ```

pub mod config;
pub mod mpd;
