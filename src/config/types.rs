use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use duckflix_av::ToolPaths;
use duckflix_common::paths::DEFAULT_CONTAINER_EXTENSIONS;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub access: AccessConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            access: AccessConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccessConfig {
    /// Client addresses allowed to use the server (empty = allow all)
    #[serde(default)]
    pub allowed_ips: Vec<IpAddr>,
}

impl AccessConfig {
    pub fn policy(&self) -> AccessPolicy {
        if self.allowed_ips.is_empty() {
            AccessPolicy::Open
        } else {
            AccessPolicy::AllowList(self.allowed_ips.clone())
        }
    }
}

/// Which clients may talk to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Any client, any origin.
    Open,
    /// Only peers whose address is listed.
    AllowList(Vec<IpAddr>),
}

impl AccessPolicy {
    pub fn allows(&self, client: IpAddr) -> bool {
        match self {
            AccessPolicy::Open => true,
            AccessPolicy::AllowList(allowed) => {
                let client = client.to_canonical();
                allowed.iter().any(|ip| ip.to_canonical() == client)
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Container extensions to index
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Skip files without a cover.jpg attachment
    #[serde(default)]
    pub require_cover: bool,

    /// Shape of the /movies.json response
    #[serde(default)]
    pub index_format: IndexFormat,

    /// Number of files indexed concurrently during a scan
    #[serde(default = "default_scan_concurrency")]
    pub scan_concurrency: usize,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_CONTAINER_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .collect()
}

fn default_scan_concurrency() -> usize {
    4
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            require_cover: false,
            index_format: IndexFormat::default(),
            scan_concurrency: default_scan_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IndexFormat {
    /// Full descriptive metadata documents
    #[default]
    Details,
    /// Catalog identifiers only
    Identifiers,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub mkvmerge_path: Option<PathBuf>,

    #[serde(default)]
    pub mkvextract_path: Option<PathBuf>,

    /// Maximum runtime of a single tool invocation
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

fn default_tool_timeout() -> u64 {
    300
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            mkvmerge_path: None,
            mkvextract_path: None,
            timeout_secs: default_tool_timeout(),
        }
    }
}

impl ToolsConfig {
    pub fn tool_paths(&self) -> ToolPaths {
        ToolPaths {
            mkvmerge: self.mkvmerge_path.clone(),
            mkvextract: self.mkvextract_path.clone(),
            timeout: Some(Duration::from_secs(self.timeout_secs)),
        }
    }
}
