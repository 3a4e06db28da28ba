//! # duckflix-av
//!
//! Reads the metadata duckflix needs out of Matroska containers.
//!
//! The [`Extractor`] trait is the capability the library indexer depends on:
//! read the tag XML, list attachments, and read one attachment's bytes. The
//! production implementation, [`MkvToolnix`], shells out to `mkvextract` and
//! `mkvmerge` once per call.
//!
//! ## Example
//!
//! ```no_run
//! use duckflix_av::{Extractor, MkvToolnix};
//! use std::path::Path;
//!
//! # async fn example() -> duckflix_common::Result<()> {
//! let tools = MkvToolnix::discover(&Default::default())?;
//! let path = Path::new("/movies/Heat.mkv");
//! let xml = tools.read_tags(path).await?;
//! if let Some(id) = duckflix_av::tags::find_tmdb_id(&xml)? {
//!     println!("{} = {}", path.display(), id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod attachments;
pub mod command;
pub mod extractor;
pub mod tags;
pub mod tools;

pub use attachments::{parse_identify_output, Attachment};
pub use command::{ToolCommand, ToolOutput};
pub use extractor::{Extractor, MkvToolnix, ToolPaths};
pub use tools::{check_tools, get_tool_path, require_tool, ToolStatus};
