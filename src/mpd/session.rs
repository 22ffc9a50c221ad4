//! MPD session: connection bootstrap and the command exchange.
//!
//! A [`Session`] owns one transport. Every exchange (write a command, read
//! lines until `OK` or `ACK`) runs while holding the session's mutex, so a
//! session can be shared as `Arc<Session>` between tasks without replies
//! getting interleaved.
//!
//! ```text
//! client                              daemon
//!   |  <-- OK MPD 0.23.5 --------------- |   greeting, once
//!   |  --- status ---------------------> |
//!   |  <-- volume: 50 ------------------ |
//!   |  <-- OK -------------------------- |   or: ACK [code@idx] {cmd} msg
//! ```
//!
//! There are no retries and no timeouts here. An exchange that does not end
//! in `OK` or `ACK` (transport error, framing error, or a dropped future)
//! leaves the stream mid-reply, so the session refuses all later exchanges
//! with [`MpdError::ConnectionClosed`]; callers should reconnect.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tracing::{debug, info, trace};

use super::ack::{AckError, ACK_PREFIX};
use super::error::{MpdError, Result};
use super::response::Response;
use super::wire::{LineReader, LineWriter};

const GREETING_PREFIX: &str = "OK MPD ";
const SUCCESS: &str = "OK";
const LIST_OK: &str = "list_OK";
const LIST_BEGIN: &str = "command_list_begin";
const LIST_OK_BEGIN: &str = "command_list_ok_begin";
const LIST_END: &str = "command_list_end";

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Everything that must only be touched while holding the exchange lock.
struct SessionIo {
    reader: LineReader<BoxedReader>,
    writer: LineWriter<BoxedWriter>,
    /// Set while an exchange is in flight and left set if it never finishes,
    /// and permanently after `close`.
    unusable: bool,
}

impl SessionIo {
    /// Read lines until the success terminator or an error reply.
    async fn read_reply(&mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let line = self
                .reader
                .read_line()
                .await?
                .ok_or(MpdError::ConnectionClosed)?;

            if line == SUCCESS {
                return Ok(lines);
            }
            if line.starts_with(ACK_PREFIX) {
                return Err(AckError::parse(&line)?.into());
            }
            trace!("MPD reply line: {}", line);
            lines.push(line);
        }
    }
}

/// A connected, handshaken MPD session.
pub struct Session {
    version: String,
    io: Mutex<SessionIo>,
}

impl Session {
    /// Dial `addr` over TCP and perform the greeting handshake.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let peer = stream.peer_addr().ok();
        let (read_half, write_half) = stream.into_split();

        let session = Self::from_halves(Box::new(read_half), Box::new(write_half)).await?;
        match peer {
            Some(peer) => info!("Connected to MPD {} at {}", session.version, peer),
            None => info!("Connected to MPD {}", session.version),
        }
        Ok(session)
    }

    /// Perform the greeting handshake over an already-open stream.
    pub async fn handshake<S>(stream: S) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        Self::from_halves(Box::new(read_half), Box::new(write_half)).await
    }

    async fn from_halves(reader: BoxedReader, writer: BoxedWriter) -> Result<Self> {
        let mut reader = LineReader::new(reader);
        let greeting = reader.read_line().await?.ok_or(MpdError::UnexpectedEof)?;

        let version = greeting
            .strip_prefix(GREETING_PREFIX)
            .ok_or_else(|| MpdError::UnexpectedGreeting(greeting.clone()))?
            .trim();
        if version.is_empty() {
            return Err(MpdError::EmptyVersion);
        }
        debug!("MPD greeting: {}", greeting);

        Ok(Self {
            version: version.to_string(),
            io: Mutex::new(SessionIo {
                reader,
                writer: LineWriter::new(writer),
                unusable: false,
            }),
        })
    }

    /// Protocol version the daemon announced in its greeting.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Send one raw command (without trailing newline) and collect its reply.
    ///
    /// Returns either every line before `OK`, or the daemon's `ACK` as
    /// [`MpdError::Ack`]; never a mix.
    pub async fn send(&self, command: &str) -> Result<Response> {
        validate_command(command)?;
        let lines = self.exchange(command).await?;
        Ok(Response::new(lines))
    }

    /// Send several commands as one command list.
    ///
    /// The daemon runs them atomically in order and stops at the first
    /// failure, whose `ACK` carries that command's position in the list.
    /// On success the replies of all commands are concatenated.
    pub async fn send_list<S: AsRef<str>>(&self, commands: &[S]) -> Result<Response> {
        let block = command_list(LIST_BEGIN, commands)?;
        let lines = self.exchange(&block).await?;
        Ok(Response::new(lines))
    }

    /// Like [`send_list`](Self::send_list), but keeps each command's reply
    /// separate using `command_list_ok_begin`.
    pub async fn send_list_ok<S: AsRef<str>>(&self, commands: &[S]) -> Result<Vec<Response>> {
        let block = command_list(LIST_OK_BEGIN, commands)?;
        let lines = self.exchange(&block).await?;

        let mut responses = Vec::with_capacity(commands.len());
        let mut current = Vec::new();
        for line in lines {
            if line == LIST_OK {
                responses.push(Response::new(std::mem::take(&mut current)));
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            // Daemon sent trailing lines without a list_OK; keep them.
            responses.push(Response::new(current));
        }
        Ok(responses)
    }

    /// Ask the daemon to close the connection.
    ///
    /// The daemon hangs up without replying, so end-of-stream counts as
    /// success here. Every later exchange fails with
    /// [`MpdError::ConnectionClosed`] without touching the transport. On a
    /// session that is already closed or unusable this is a no-op.
    pub async fn close(&self) -> Result<()> {
        let mut io = self.io.lock().await;
        if io.unusable {
            return Ok(());
        }

        debug!("Sending MPD command: close");
        io.unusable = true;
        io.writer.write_line("close").await?;
        match io.read_reply().await {
            Ok(_) | Err(MpdError::ConnectionClosed) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// One write-then-read cycle under the exchange lock.
    ///
    /// Only a complete reply (`OK` or a well-formed `ACK`) leaves the
    /// session usable.
    async fn exchange(&self, block: &str) -> Result<Vec<String>> {
        let mut io = self.io.lock().await;
        if io.unusable {
            return Err(MpdError::ConnectionClosed);
        }

        debug!("Sending MPD command: {}", block.replace('\n', "; "));
        io.unusable = true;
        io.writer.write_line(block).await?;
        let reply = io.read_reply().await;
        if matches!(reply, Ok(_) | Err(MpdError::Ack(_))) {
            io.unusable = false;
        }

        let lines = reply?;
        debug!("MPD replied with {} line(s)", lines.len());
        Ok(lines)
    }
}

/// Commands are single lines; the terminator is added when writing.
fn validate_command(command: &str) -> Result<()> {
    if command.contains(['\n', '\r']) {
        return Err(MpdError::InvalidCommand(command.to_string()));
    }
    Ok(())
}

/// Build `<begin>\n<cmd>\n...\ncommand_list_end` (no trailing newline).
fn command_list<S: AsRef<str>>(begin: &str, commands: &[S]) -> Result<String> {
    let mut block = String::from(begin);
    for command in commands {
        let command = command.as_ref();
        validate_command(command)?;
        block.push('\n');
        block.push_str(command);
    }
    block.push('\n');
    block.push_str(LIST_END);
    Ok(block)
}
