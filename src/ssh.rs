use std::io::{self, Read, Write};
use std::net::TcpStream;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use ssh2::Session;
use tracing::{debug, warn};

use crate::error::ReslinkError;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub trait RemoteShell {
    /// Submits one shell line. The command's exit status is not inspected;
    /// only failure to open the channel or submit the line is an error.
    fn run(&mut self, command: &str) -> Result<(), ReslinkError>;

    fn logout(&mut self) -> Result<(), ReslinkError>;
}

pub trait RemoteConnector {
    type Shell: RemoteShell;

    fn connect(&self) -> Result<Self::Shell, ReslinkError>;
}

#[derive(Debug, Clone)]
pub struct SshConnector {
    hostname: String,
}

impl SshConnector {
    pub fn new(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
        }
    }
}

impl RemoteConnector for SshConnector {
    type Shell = SshShell;

    fn connect(&self) -> Result<SshShell, ReslinkError> {
        let credentials = prompt_credentials(&self.hostname)?;

        let tcp = TcpStream::connect((self.hostname.as_str(), 22)).map_err(|err| {
            ReslinkError::SshConnect {
                host: self.hostname.clone(),
                message: err.to_string(),
            }
        })?;

        let mut session = Session::new().map_err(|err| ReslinkError::SshConnect {
            host: self.hostname.clone(),
            message: err.to_string(),
        })?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|err| ReslinkError::SshConnect {
                host: self.hostname.clone(),
                message: err.to_string(),
            })?;

        session
            .userauth_password(&credentials.username, &credentials.password)
            .map_err(|_| ReslinkError::SshAuth {
                user: credentials.username.clone(),
                host: self.hostname.clone(),
            })?;
        if !session.authenticated() {
            return Err(ReslinkError::SshAuth {
                user: credentials.username,
                host: self.hostname.clone(),
            });
        }

        debug!(host = %self.hostname, user = %credentials.username, "ssh session opened");
        Ok(SshShell { session })
    }
}

pub struct SshShell {
    session: Session,
}

impl RemoteShell for SshShell {
    fn run(&mut self, command: &str) -> Result<(), ReslinkError> {
        let mut channel = self
            .session
            .channel_session()
            .map_err(|err| ReslinkError::SshCommand(err.to_string()))?;
        channel
            .exec(command)
            .map_err(|err| ReslinkError::SshCommand(err.to_string()))?;

        // Fire-and-forget: drain output, exit status intentionally unchecked.
        let mut output = String::new();
        let _ = channel.read_to_string(&mut output);
        let _ = channel.wait_close();
        debug!(command, "remote shell line sent");
        Ok(())
    }

    fn logout(&mut self) -> Result<(), ReslinkError> {
        self.session
            .disconnect(None, "logout", None)
            .map_err(|err| ReslinkError::SshCommand(err.to_string()))
    }
}

/// One lazily-opened session, reused across all remote links of a single
/// call and closed exactly once.
pub struct RemoteSession<'a, R: RemoteConnector> {
    connector: &'a R,
    shell: Option<R::Shell>,
}

impl<'a, R: RemoteConnector> RemoteSession<'a, R> {
    pub fn new(connector: &'a R) -> Self {
        Self {
            connector,
            shell: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.shell.is_some()
    }

    pub fn shell(&mut self) -> Result<&mut R::Shell, ReslinkError> {
        match &mut self.shell {
            Some(shell) => Ok(shell),
            slot => {
                let shell = self.connector.connect()?;
                Ok(slot.insert(shell))
            }
        }
    }

    pub fn close(mut self) -> Result<(), ReslinkError> {
        match self.shell.take() {
            Some(mut shell) => shell.logout(),
            None => Ok(()),
        }
    }
}

impl<R: RemoteConnector> Drop for RemoteSession<'_, R> {
    fn drop(&mut self) {
        if let Some(mut shell) = self.shell.take() {
            if let Err(err) = shell.logout() {
                warn!("ssh logout during cleanup failed: {err}");
            }
        }
    }
}

pub fn prompt_credentials(hostname: &str) -> Result<Credentials, ReslinkError> {
    println!("Credentials for connection to {hostname}:");

    print!("username: ");
    io::stdout()
        .flush()
        .map_err(|err| ReslinkError::CredentialPrompt(err.to_string()))?;
    let mut username = String::new();
    io::stdin()
        .read_line(&mut username)
        .map_err(|err| ReslinkError::CredentialPrompt(err.to_string()))?;
    let username = username.trim().to_string();

    print!("password: ");
    io::stdout()
        .flush()
        .map_err(|err| ReslinkError::CredentialPrompt(err.to_string()))?;
    let password = read_masked()?;
    println!();

    Ok(Credentials { username, password })
}

fn read_masked() -> Result<String, ReslinkError> {
    terminal::enable_raw_mode()
        .map_err(|err| ReslinkError::CredentialPrompt(err.to_string()))?;

    let mut value = String::new();
    let result = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Enter => break Ok(value),
                KeyCode::Backspace => {
                    value.pop();
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    break Err(ReslinkError::CredentialPrompt("interrupted".to_string()));
                }
                KeyCode::Char(ch) => value.push(ch),
                _ => {}
            },
            Ok(_) => {}
            Err(err) => break Err(ReslinkError::CredentialPrompt(err.to_string())),
        }
    };

    terminal::disable_raw_mode()
        .map_err(|err| ReslinkError::CredentialPrompt(err.to_string()))?;
    result
}
