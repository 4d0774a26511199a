//! Command-Line Interface (CLI) argument parsing.
//!
//! The arguments are parsed at startup with `clap` and merged over the
//! `alertbot.toml` file and the environment through the figment `Provider`
//! implementation below.

use clap::Parser;
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Collects operational alerts and fans them out to Slack.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address the ingress server binds to.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port the ingress server listens on.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Log notifications instead of sending them to Slack.
    #[arg(long)]
    pub stub: bool,

    /// Logging level (e.g. "info", "debug").
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        let mut server = Dict::new();
        if let Some(host) = &self.host {
            server.insert("host".into(), Value::from(host.clone()));
        }
        if let Some(port) = self.port {
            server.insert("port".into(), Value::from(port));
        }
        if !server.is_empty() {
            dict.insert("server".into(), Value::Dict(Tag::Default, server));
        }

        // Only an explicit `--stub` overrides the file; its absence does not
        // switch stub mode off.
        if self.stub {
            dict.insert("stub_mode".into(), Value::from(true));
        }

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
