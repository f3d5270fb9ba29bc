use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:4221";

/// Command line surface of the server binary.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "hearth", about = "A small hand-framed HTTP/1.1 server")]
pub struct Cli {
    /// Directory served and written by the `/files/` endpoints
    #[arg(long)]
    pub directory: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:4221
    #[arg(long)]
    pub listen: Option<String>,

    /// Upper bound on concurrently handled connections (unbounded when omitted)
    #[arg(long)]
    pub max_connections: Option<usize>,

    /// Optional YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub directory: PathBuf,
    pub max_connections: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            directory: PathBuf::from("."),
            max_connections: None,
        }
    }
}

impl Config {
    /// Builds the effective configuration: defaults, then the YAML file named
    /// by `--config`, then the remaining command line flags.
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut cfg = match &cli.config {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        cfg.apply_cli(cli);
        anyhow::ensure!(
            cfg.max_connections != Some(0),
            "max_connections must be at least 1"
        );
        Ok(cfg)
    }

    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.directory {
            self.directory = dir.clone();
        }
        if let Some(addr) = &cli.listen {
            self.listen_addr = addr.clone();
        }
        if cli.max_connections.is_some() {
            self.max_connections = cli.max_connections;
        }
    }
}
