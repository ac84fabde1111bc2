//! Process configuration.
//!
//! Every flag can also come from the environment, so the binary runs the
//! same under a process manager that only sets env vars.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap::builder::BoolishValueParser;

use crate::types::McpError;

/// Directory name used under `$HOME` when no root is configured.
pub const DEFAULT_ROOT_DIR: &str = "mcp_search";

/// Serve a directory tree as JSON-RPC resources over HTTP.
#[derive(Debug, Clone, Parser)]
#[command(name = "mcpfiles", version, about)]
pub struct Config {
    /// Directory to expose. Created at startup if missing.
    #[arg(long, env = "ROOT_PATH", default_value_os_t = default_root())]
    pub root: PathBuf,

    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "PORT", default_value_t = 5001)]
    pub port: u16,

    /// Log filter used when RUST_LOG is unset (e.g. `info`, `debug`).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines. The env var takes `1`/`0`, `true`/`false`,
    /// `yes`/`no` or `on`/`off`.
    #[arg(long, env = "LOG_JSON", value_parser = BoolishValueParser::new())]
    pub log_json: bool,
}

impl Config {
    /// `host:port`, resolved by the listener so host names work too.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `$HOME/mcp_search`, or `./mcp_search` when `HOME` is unset.
pub fn default_root() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_ROOT_DIR)
}

/// Startup hook: make sure the root directory exists.
///
/// Returns `true` when the directory had to be created.
pub fn ensure_root(root: &Path) -> Result<bool, McpError> {
    tracing::info!(root = %root.display(), "exposing directory");

    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(false),
        Ok(_) => Err(McpError::Config(format!(
            "root path is not a directory: {}",
            root.display()
        ))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(root = %root.display(), "root directory does not exist");
            fs::create_dir_all(root)?;
            tracing::info!(root = %root.display(), "created root directory");
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}
