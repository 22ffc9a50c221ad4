//! Mock servers for integration testing
//!
//! These mock servers simulate the MPD daemon, allowing full protocol
//! testing without a real music player.

pub mod mpd;

pub use mpd::MockMpdServer;
