//! Locating the mkvtoolnix binaries.

use duckflix_common::{Error, Result};
use std::path::{Path, PathBuf};

use crate::extractor::ToolPaths;

/// Tools duckflix shells out to.
pub const REQUIRED_TOOLS: &[&str] = &["mkvmerge", "mkvextract"];

/// Where a required tool was found, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: &'static str,
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    pub fn available(&self) -> bool {
        self.path.is_some()
    }
}

/// Resolve every tool in [`REQUIRED_TOOLS`] the same way [`MkvToolnix::discover`] does.
///
/// [`MkvToolnix::discover`]: crate::MkvToolnix::discover
pub fn check_tools(paths: &ToolPaths) -> Vec<ToolStatus> {
    REQUIRED_TOOLS
        .iter()
        .map(|&name| {
            let configured = match name {
                "mkvmerge" => paths.mkvmerge.as_deref(),
                _ => paths.mkvextract.as_deref(),
            };
            ToolStatus {
                name,
                path: get_tool_path(name, configured).ok(),
            }
        })
        .collect()
}

/// Require that a tool is available on `PATH`, returning its path.
///
/// # Errors
///
/// Returns [`Error::Tool`] if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool(name, "not found on PATH"))
}

/// Get the path to a tool, preferring a configured path over `PATH` lookup.
pub fn get_tool_path(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            tool = name,
            path = %path.display(),
            "Configured tool path does not exist, falling back to PATH"
        );
    }

    require_tool(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_tool_not_found() {
        let err = require_tool("nonexistent_tool_12345").unwrap_err();
        assert!(matches!(err, Error::Tool { .. }));
    }

    #[test]
    fn check_tools_reports_each_required_tool() {
        let names: Vec<&str> = check_tools(&ToolPaths::default())
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["mkvmerge", "mkvextract"]);
    }

    #[test]
    fn check_tools_honours_configured_paths() {
        let exe = std::env::current_exe().unwrap();
        let paths = ToolPaths {
            mkvmerge: Some(exe.clone()),
            mkvextract: Some(exe.clone()),
            timeout: None,
        };
        let statuses = check_tools(&paths);
        assert!(statuses.iter().all(|s| s.available()));
        assert!(statuses.iter().all(|s| s.path.as_deref() == Some(exe.as_path())));
    }

    #[test]
    fn get_tool_path_prefers_existing_configured_path() {
        let exe = std::env::current_exe().unwrap();
        let resolved = get_tool_path("nonexistent_tool_12345", Some(&exe)).unwrap();
        assert_eq!(resolved, exe);
    }

    #[test]
    fn get_tool_path_missing_configured_path_falls_back() {
        let result = get_tool_path(
            "nonexistent_tool_12345",
            Some(Path::new("/definitely/not/here")),
        );
        assert!(matches!(result, Err(Error::Tool { .. })));
    }
}
