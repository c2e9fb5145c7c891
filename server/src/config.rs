//! Process configuration, read once at startup from flags or environment.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use clap::{Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(name = "todo-server", version, about = "REST API for the todo list")]
pub struct Config {
    /// Database connection string: `mongodb://`, `mongodb+srv://` or `memory://`.
    #[arg(long, env = "MONGO_URI", value_parser = parse_db_uri)]
    pub mongo_uri: String,

    /// TCP port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    #[arg(long, env = "NODE_ENV", value_enum, default_value_t = RunMode::Development)]
    pub node_env: RunMode,

    #[arg(long, env = "LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Config {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    Development,
    Production,
    Test,
}

impl RunMode {
    /// Per-request logging is silenced under test.
    pub fn logs_requests(self) -> bool {
        !matches!(self, RunMode::Test)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// Directive for `tracing_subscriber::EnvFilter`. `fatal` has no tracing
    /// equivalent and maps to `error`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error | LogLevel::Fatal => "error",
        }
    }
}

/// Copy variables from a dotenv file into the process environment before
/// `Config` is parsed. Variables that are already set keep their value, and a
/// missing file is not an error.
pub fn load_env_file(path: &Path) -> Result<(), dotenvy::Error> {
    match dotenvy::from_path(path) {
        Err(err) if err.not_found() => Ok(()),
        other => other,
    }
}

/// Accept anything shaped like `scheme://rest`; the store decides whether it
/// supports the scheme.
fn parse_db_uri(raw: &str) -> Result<String, String> {
    let (scheme, rest) = raw
        .split_once("://")
        .ok_or_else(|| format!("`{raw}` is not a valid URI"))?;
    let scheme_ok = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !scheme_ok || rest.is_empty() {
        return Err(format!("`{raw}` is not a valid URI"));
    }
    Ok(raw.to_string())
}
