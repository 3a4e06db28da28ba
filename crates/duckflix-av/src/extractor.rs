//! The extraction capability and its mkvtoolnix implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use duckflix_common::Result;

use crate::attachments::{parse_identify_output, Attachment};
use crate::command::{ToolCommand, DEFAULT_TIMEOUT};
use crate::tools::get_tool_path;

/// Reads tags and attachments out of a container file.
///
/// Every call may spawn a process, so callers should not invoke it more
/// often than necessary. Implementations are shared across tasks.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Read the tag XML document. An empty result means the file has no tags.
    async fn read_tags(&self, path: &Path) -> Result<Vec<u8>>;

    /// List the attachments embedded in the file.
    async fn list_attachments(&self, path: &Path) -> Result<Vec<Attachment>>;

    /// Read the raw bytes of one attachment.
    async fn read_attachment(&self, path: &Path, attachment_id: u32) -> Result<Vec<u8>>;
}

/// Where to find the mkvtoolnix binaries.
#[derive(Debug, Clone, Default)]
pub struct ToolPaths {
    /// Explicit `mkvmerge` path; `PATH` lookup when `None`.
    pub mkvmerge: Option<PathBuf>,
    /// Explicit `mkvextract` path; `PATH` lookup when `None`.
    pub mkvextract: Option<PathBuf>,
    /// Per-invocation timeout; [`DEFAULT_TIMEOUT`] when `None`.
    pub timeout: Option<Duration>,
}

/// [`Extractor`] backed by the `mkvmerge` and `mkvextract` command line tools.
#[derive(Debug, Clone)]
pub struct MkvToolnix {
    mkvmerge: PathBuf,
    mkvextract: PathBuf,
    timeout: Duration,
}

impl MkvToolnix {
    /// Resolve both tools, preferring configured paths over `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`duckflix_common::Error::Tool`] if either tool cannot be found.
    pub fn discover(paths: &ToolPaths) -> Result<Self> {
        Ok(Self {
            mkvmerge: get_tool_path("mkvmerge", paths.mkvmerge.as_deref())?,
            mkvextract: get_tool_path("mkvextract", paths.mkvextract.as_deref())?,
            timeout: paths.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }

    #[cfg(all(test, unix))]
    fn with_binaries(mkvmerge: PathBuf, mkvextract: PathBuf) -> Self {
        Self {
            mkvmerge,
            mkvextract,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn path_arg(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }
}

#[async_trait]
impl Extractor for MkvToolnix {
    async fn read_tags(&self, path: &Path) -> Result<Vec<u8>> {
        let output = ToolCommand::new(self.mkvextract.clone())
            .arg(Self::path_arg(path))
            .arg("tags")
            .arg("/dev/stdout")
            .timeout(self.timeout)
            .execute()
            .await?;
        Ok(output.stdout)
    }

    async fn list_attachments(&self, path: &Path) -> Result<Vec<Attachment>> {
        let output = ToolCommand::new(self.mkvmerge.clone())
            .arg("--identify")
            .arg(Self::path_arg(path))
            .timeout(self.timeout)
            .execute()
            .await?;
        Ok(parse_identify_output(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn read_attachment(&self, path: &Path, attachment_id: u32) -> Result<Vec<u8>> {
        let output = ToolCommand::new(self.mkvextract.clone())
            .arg("--quiet")
            .arg(Self::path_arg(path))
            .arg("attachments")
            .arg(format!("{attachment_id}:/dev/stdout"))
            .timeout(self.timeout)
            .execute()
            .await?;
        Ok(output.stdout)
    }
}
