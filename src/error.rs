use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ReslinkError {
    #[error("invalid resource specifier: {0}")]
    InvalidResource(String),

    #[error("invalid data type: {0}")]
    InvalidDataType(String),

    #[error("invalid genome name: {0}")]
    InvalidGenomeName(String),

    #[error("missing config file reslink.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {}", .0.display())]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to read rules file at {}", .0.display())]
    RulesRead(PathBuf),

    #[error("failed to parse rules file: {0}")]
    RulesParse(String),

    #[error("API request failed: {0}")]
    ApiHttp(String),

    #[error("API returned status {status}: {message}")]
    ApiStatus { status: u16, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to connect to {host}: {message}")]
    SshConnect { host: String, message: String },

    #[error("authentication failed for {user}@{host}")]
    SshAuth { user: String, host: String },

    #[error("remote command failed: {0}")]
    SshCommand(String),

    #[error("credential prompt failed: {0}")]
    CredentialPrompt(String),
}
