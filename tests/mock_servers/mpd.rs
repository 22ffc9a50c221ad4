#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Mock MPD daemon for testing
//!
//! Speaks the line protocol on a random local port: greeting, canned replies,
//! ACK injection, command lists (plain and list_OK) and `close`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// What the mock answers for a given command.
#[derive(Debug, Clone)]
pub enum Reply {
    Lines(Vec<String>),
    Ack { code: u32, message: String },
}

/// Mock MPD state
#[derive(Debug, Clone)]
pub struct MockMpdState {
    /// First line sent on connect; `None` hangs up without greeting.
    pub greeting: Option<String>,
    /// Replies keyed by full command line; anything else gets a bare `OK`.
    pub replies: HashMap<String, Reply>,
    /// Every command line received, in order (list brackets included).
    pub received: Vec<String>,
    /// Delay before answering each command or command list.
    pub reply_delay: Duration,
    /// Set when bytes of a new request arrived before the previous reply
    /// was written.
    pub interleaved: bool,
}

impl Default for MockMpdState {
    fn default() -> Self {
        Self {
            greeting: Some("OK MPD 0.23.5".to_string()),
            replies: HashMap::new(),
            received: Vec::new(),
            reply_delay: Duration::ZERO,
            interleaved: false,
        }
    }
}

/// Mock MPD server
pub struct MockMpdServer {
    addr: SocketAddr,
    state: Arc<RwLock<MockMpdState>>,
    handle: JoinHandle<()>,
}

impl MockMpdServer {
    /// Start a mock MPD server on a random port
    pub async fn start() -> Self {
        Self::start_with(MockMpdState::default()).await
    }

    pub async fn start_with(initial: MockMpdState) -> Self {
        let state = Arc::new(RwLock::new(initial));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state_clone = state.clone();
        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        let state = state_clone.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, state).await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Start a server whose greeting is `greeting` (`None` closes at once).
    pub async fn with_greeting(greeting: Option<&str>) -> Self {
        Self::start_with(MockMpdState {
            greeting: greeting.map(str::to_string),
            ..MockMpdState::default()
        })
        .await
    }

    /// Get the server address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn reply_lines(&self, command: &str, lines: &[&str]) {
        self.state.write().await.replies.insert(
            command.to_string(),
            Reply::Lines(lines.iter().map(|l| l.to_string()).collect()),
        );
    }

    pub async fn reply_ack(&self, command: &str, code: u32, message: &str) {
        self.state.write().await.replies.insert(
            command.to_string(),
            Reply::Ack {
                code,
                message: message.to_string(),
            },
        );
    }

    pub async fn set_reply_delay(&self, delay: Duration) {
        self.state.write().await.reply_delay = delay;
    }

    /// Command lines received so far
    pub async fn received(&self) -> Vec<String> {
        self.state.read().await.received.clone()
    }

    pub async fn saw_interleaving(&self) -> bool {
        self.state.read().await.interleaved
    }

    /// Stop the mock server
    pub async fn stop(self) {
        self.handle.abort();
    }
}

/// Handle a single TCP connection
async fn handle_connection(stream: TcpStream, state: Arc<RwLock<MockMpdState>>) {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let greeting = state.read().await.greeting.clone();
    match greeting {
        Some(greeting) => {
            let greeting = format!("{}\n", greeting);
            if writer.write_all(greeting.as_bytes()).await.is_err() {
                return;
            }
        }
        None => return,
    }

    let mut line = String::new();
    loop {
        let Some(command) = read_command(&mut reader, &mut line, &state).await else {
            break;
        };

        let request = if command == "command_list_begin" || command == "command_list_ok_begin" {
            let mut commands = Vec::new();
            loop {
                match read_command(&mut reader, &mut line, &state).await {
                    Some(c) if c == "command_list_end" => break,
                    Some(c) => commands.push(c),
                    None => return,
                }
            }
            Request::List {
                commands,
                list_ok: command == "command_list_ok_begin",
            }
        } else if command == "close" {
            return;
        } else {
            Request::Single(command)
        };

        let delay = state.read().await.reply_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
            // Anything buffered now was sent before our reply went out
            let early = tokio::time::timeout(Duration::from_millis(20), reader.fill_buf()).await;
            if matches!(early, Ok(Ok(buf)) if !buf.is_empty()) {
                state.write().await.interleaved = true;
            }
        }

        let response = process_request(&request, &state).await;
        if writer.write_all(response.as_bytes()).await.is_err() {
            break;
        }
    }
}

enum Request {
    Single(String),
    List { commands: Vec<String>, list_ok: bool },
}

async fn read_command(
    reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
    line: &mut String,
    state: &Arc<RwLock<MockMpdState>>,
) -> Option<String> {
    line.clear();
    match reader.read_line(line).await {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let command = line.trim_end_matches(['\n', '\r']).to_string();
            state.write().await.received.push(command.clone());
            Some(command)
        }
    }
}

/// Build the full reply text for a request
async fn process_request(request: &Request, state: &Arc<RwLock<MockMpdState>>) -> String {
    let state = state.read().await;
    let mut out = String::new();

    match request {
        Request::Single(command) => match state.replies.get(command) {
            Some(Reply::Ack { code, message }) => {
                out.push_str(&ack_line(*code, 0, command_name(command), message));
            }
            Some(Reply::Lines(lines)) => {
                push_lines(&mut out, lines);
                out.push_str("OK\n");
            }
            None => out.push_str("OK\n"),
        },
        Request::List { commands, list_ok } => {
            for (index, command) in commands.iter().enumerate() {
                match state.replies.get(command) {
                    Some(Reply::Ack { code, message }) => {
                        // Output of earlier commands has already gone out
                        out.push_str(&ack_line(*code, index as u32, command_name(command), message));
                        return out;
                    }
                    Some(Reply::Lines(lines)) => push_lines(&mut out, lines),
                    None => {}
                }
                if *list_ok {
                    out.push_str("list_OK\n");
                }
            }
            out.push_str("OK\n");
        }
    }

    out
}

fn push_lines(out: &mut String, lines: &[String]) {
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
}

fn command_name(command: &str) -> &str {
    command.split_whitespace().next().unwrap_or("")
}

fn ack_line(code: u32, index: u32, command: &str, message: &str) -> String {
    format!("ACK [{}@{}] {{{}}} {}\n", code, index, command, message)
}
