use clap::Parser;
use duckflix::config::{Config, IndexFormat};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "duckflix")]
#[command(author, version, about = "Serve a directory of tagged Matroska movies over HTTP")]
pub struct Cli {
    /// Directory to scan for movie files
    #[arg(required_unless_present = "check_tools")]
    pub media_root: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Address to listen on [default: 0.0.0.0]
    #[arg(long)]
    pub listen_address: Option<String>,

    /// Port to listen on [default: 8080]
    #[arg(long)]
    pub listen_port: Option<u16>,

    /// Only accept requests from this client address (repeatable)
    #[arg(long = "allow-ip", value_name = "IP")]
    pub allow_ip: Vec<IpAddr>,

    /// Skip movies without a cover.jpg attachment
    #[arg(long)]
    pub require_cover: bool,

    /// Shape of the /movies.json response
    #[arg(long, value_enum)]
    pub index_format: Option<IndexFormat>,

    /// Scan the library, print the indexed identifiers as JSON and exit
    #[arg(long)]
    pub scan_only: bool,

    /// Check that mkvmerge and mkvextract are available and exit
    #[arg(long)]
    pub check_tools: bool,
}

impl Cli {
    /// Apply command line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.listen_address {
            config.server.host = host.clone();
        }
        if let Some(port) = self.listen_port {
            config.server.port = port;
        }
        if !self.allow_ip.is_empty() {
            config.server.access.allowed_ips = self.allow_ip.clone();
        }
        if self.require_cover {
            config.library.require_cover = true;
        }
        if let Some(format) = self.index_format {
            config.library.index_format = format;
        }
    }
}
