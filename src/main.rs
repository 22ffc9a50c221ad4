//! mpdctl - command-line control for a Music Player Daemon.

use mpd_control::config;
use mpd_control::mpd::{MpdError, ReplayGainMode, Response, Session};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::time::timeout;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const VERSION: &str = concat!(env!("MPDCTL_VERSION"), " (", env!("MPDCTL_GIT_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "mpdctl")]
#[command(version = VERSION)]
#[command(about = "Control a Music Player Daemon over its text protocol", long_about = None)]
struct Cli {
    /// MPD host (overrides config and MPD_HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// MPD port (overrides config and MPD_PORT)
    #[arg(long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the protocol version announced by the daemon
    Version,
    /// Check that the daemon answers
    Ping,
    /// Remove songs from the queue once played
    Consume { state: Toggle },
    /// Pick songs in random order
    Random { state: Toggle },
    /// Repeat the queue or current song
    Repeat { state: Toggle },
    /// Stop after the current song (or repeat it, with repeat on)
    Single { state: Toggle },
    /// Crossfade between songs
    Crossfade { seconds: u32 },
    /// Set the mixer volume (0-100)
    Volume {
        #[arg(allow_negative_numbers = true)]
        level: i32,
    },
    /// Set the replay gain mode (off, track, album, auto)
    ReplayGain { mode: ReplayGainMode },
    /// Send a raw command and print the reply lines
    Send {
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },
    /// Run commands as one command list and print the combined reply
    List {
        #[arg(required = true, num_args = 1..)]
        commands: Vec<String>,
    },
    /// Run commands as one command list and print each command's reply
    ListOk {
        #[arg(required = true, num_args = 1..)]
        commands: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        matches!(toggle, Toggle::On)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, so stdout only carries reply lines)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mpd_control=info,mpdctl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = config::load_config().context("Failed to load configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let address = config.address();
    let session = timeout(config.connect_timeout(), Session::connect(address.as_str()))
        .await
        .map_err(|_| {
            anyhow!(
                "Connection to {} timed out after {:?}",
                address,
                config.connect_timeout()
            )
        })?
        .with_context(|| format!("Failed to connect to MPD at {}", address))?;

    let result = run(&session, cli.command).await;

    if let Err(e) = session.close().await {
        tracing::debug!("Close after command failed: {}", e);
    }

    result.map_err(describe)
}

async fn run(session: &Session, command: Command) -> Result<(), MpdError> {
    match command {
        Command::Version => println!("{}", session.version()),
        Command::Ping => session.ping().await?,
        Command::Consume { state } => session.set_consume(state.into()).await?,
        Command::Random { state } => session.set_random(state.into()).await?,
        Command::Repeat { state } => session.set_repeat(state.into()).await?,
        Command::Single { state } => session.set_single(state.into()).await?,
        Command::Crossfade { seconds } => session.set_crossfade(seconds).await?,
        Command::Volume { level } => session.set_volume(level).await?,
        Command::ReplayGain { mode } => session.set_replay_gain_mode(mode).await?,
        Command::Send { command } => print_response(&session.send(&command.join(" ")).await?),
        Command::List { commands } => print_response(&session.send_list(&commands).await?),
        Command::ListOk { commands } => {
            let responses = session.send_list_ok(&commands).await?;
            for (command, response) in commands.iter().zip(&responses) {
                println!("# {}", command);
                print_response(response);
            }
        }
    }
    Ok(())
}

fn print_response(response: &Response) {
    for line in response {
        println!("{}", line);
    }
}

/// Turn an engine error into a user-facing message.
fn describe(err: MpdError) -> anyhow::Error {
    match err.ack() {
        Some(ack) => {
            let kind = ack.code().name().unwrap_or("error");
            anyhow!(
                "MPD {} (code {}) in command #{} '{}': {}",
                kind,
                ack.code(),
                ack.command_index(),
                ack.current_command(),
                ack.message()
            )
        }
        None => anyhow::Error::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpd_control::mpd::{AckCode, AckError};

    #[test]
    fn toggle_maps_to_bool() {
        assert!(bool::from(Toggle::On));
        assert!(!bool::from(Toggle::Off));
    }

    #[test]
    fn describe_names_known_ack_codes() {
        let err = MpdError::from(AckError::new(
            AckCode::NO_EXIST,
            1,
            "load",
            "No such playlist",
        ));
        assert_eq!(
            describe(err).to_string(),
            "MPD no such object (code 50) in command #1 'load': No such playlist"
        );
    }

    #[test]
    fn describe_falls_back_for_unknown_codes() {
        let err = MpdError::from(AckError::new(AckCode(99), 0, "frob", "nope"));
        assert_eq!(
            describe(err).to_string(),
            "MPD error (code 99) in command #0 'frob': nope"
        );
    }

    #[test]
    fn describe_passes_other_errors_through() {
        let err = describe(MpdError::VolumeOutOfRange(150));
        assert_eq!(
            err.to_string(),
            "volume level 150 is outside valid range of 0-100"
        );
    }

    #[test]
    fn volume_accepts_negative_level_for_range_check() {
        let cli = Cli::try_parse_from(["mpdctl", "volume", "-5"]).unwrap();
        assert!(matches!(cli.command, Command::Volume { level: -5 }));
    }
}
