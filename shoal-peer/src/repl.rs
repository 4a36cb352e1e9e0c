//! Interactive command loop.
//!
//! The REPL is thin glue over [`PeerSession`]: it parses commands, prints
//! user-facing guidance, and never speaks the wire protocol itself.
//! Commands are `JOIN`, `PUBLISH`, `SEARCH`, `FETCH`, and `EXIT`
//! (case-insensitive); `SEARCH` and `FETCH` prompt for a filename on the
//! next line.

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::config::PeerConfig;
use crate::error::SessionError;
use crate::fetch;
use crate::session::PeerSession;
use crate::transport::Transport;

/// A parsed REPL command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Join,
    Publish,
    Search,
    Fetch,
    Exit,
}

impl Command {
    /// Parse a command line, case-insensitively.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_uppercase().as_str() {
            "JOIN" => Some(Command::Join),
            "PUBLISH" => Some(Command::Publish),
            "SEARCH" => Some(Command::Search),
            "FETCH" => Some(Command::Fetch),
            "EXIT" => Some(Command::Exit),
            _ => None,
        }
    }
}

/// The interactive loop driving a registry session.
pub struct Repl<T: Transport> {
    session: PeerSession<T>,
    config: PeerConfig,
}

impl<T: Transport> Repl<T> {
    /// Create a REPL over a connected session.
    pub fn new(session: PeerSession<T>, config: PeerConfig) -> Self {
        Self { session, config }
    }

    /// Run until `EXIT` or end of input.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            prompt("Enter a command (JOIN, PUBLISH, SEARCH, FETCH, EXIT): ")?;
            let Some(line) = lines.next_line().await? else {
                break;
            };

            let command = match Command::parse(&line) {
                Some(command) => command,
                None => {
                    if !line.trim().is_empty() {
                        println!("Unrecognized command {:?}.", line.trim());
                    }
                    continue;
                }
            };

            match command {
                Command::Exit => break,
                Command::Join => self.handle_join().await,
                Command::Publish => self.handle_publish().await,
                Command::Search => {
                    let Some(filename) = read_filename(&mut lines).await? else {
                        break;
                    };
                    self.handle_search(&filename).await;
                }
                Command::Fetch => {
                    let Some(filename) = read_filename(&mut lines).await? else {
                        break;
                    };
                    self.handle_fetch(&filename).await;
                }
            }
        }

        Ok(())
    }

    async fn handle_join(&mut self) {
        match self.session.join().await {
            Ok(()) => println!("Joined registry as peer {}.", self.session.peer_id()),
            Err(err) => report(&err),
        }
    }

    async fn handle_publish(&mut self) {
        match self.session.publish(&self.config.shared_dir).await {
            Ok(count) => println!("Published {count} file(s)."),
            Err(err) => report(&err),
        }
    }

    async fn handle_search(&mut self, filename: &str) {
        match self.session.search(filename).await {
            Ok(response) if response.is_not_found() => {
                println!("{filename} not indexed by registry.");
            }
            Ok(response) => println!("{filename} available from {response}."),
            Err(err) => report(&err),
        }
    }

    async fn handle_fetch(&mut self, filename: &str) {
        let response = match self.session.search(filename).await {
            Ok(response) => response,
            Err(err) => {
                report(&err);
                return;
            }
        };
        if response.is_not_found() {
            println!("{filename} not indexed by registry.");
            return;
        }

        let result = fetch::download(
            response.socket_addr(),
            filename,
            &self.config.shared_dir,
            self.config.connect_timeout,
            self.config.request_timeout,
        )
        .await;

        match result {
            Ok((path, bytes)) => {
                println!("Fetched {filename} ({bytes} bytes) into {}.", path.display());
            }
            Err(err) => report(&err),
        }
    }
}

/// Print a prompt without a trailing newline.
fn prompt(text: &str) -> anyhow::Result<()> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(())
}

/// Prompt for and read a filename line. `None` means end of input.
async fn read_filename(
    lines: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<Option<String>> {
    prompt("Enter a file name: ")?;
    let Some(line) = lines.next_line().await? else {
        return Ok(None);
    };
    Ok(Some(line.trim().to_string()))
}

/// Print a user-facing description of a failed action.
fn report(err: &SessionError) {
    match err {
        SessionError::NotJoined { action } => {
            println!("{action} requires joining first. Enter JOIN to register with the registry.");
        }
        other if other.is_recoverable() => println!("Error: {other}."),
        other => {
            println!("Error: {other}. The registry connection may no longer be usable.");
        }
    }
}
