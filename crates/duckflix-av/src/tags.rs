//! Matroska tag XML parsing.
//!
//! `mkvextract <file> tags` prints a document shaped like:
//!
//! ```xml
//! <Tags>
//!   <Tag>
//!     <Targets><TargetTypeValue>50</TargetTypeValue></Targets>
//!     <Simple><Name>TMDB</Name><String>movie/603</String></Simple>
//!   </Tag>
//! </Tags>
//! ```
//!
//! The identifier lives in a file-level (`TargetTypeValue` 50) tag's `TMDB`
//! simple tag.

use duckflix_common::{Error, MovieId, Result};
use roxmltree::{Document, Node, ParsingOptions};

/// Target type value of tags that describe the whole file.
const FILE_TARGET_TYPE: &str = "50";

/// Name of the simple tag holding the catalog identifier.
const TMDB_TAG_NAME: &str = "TMDB";

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).and_then(|c| c.text()).map(str::trim)
}

fn is_file_level(tag: Node<'_, '_>) -> bool {
    child(tag, "Targets")
        .map(|targets| {
            targets.children().any(|c| {
                c.is_element()
                    && c.tag_name().name() == "TargetTypeValue"
                    && c.text().map(str::trim) == Some(FILE_TARGET_TYPE)
            })
        })
        .unwrap_or(false)
}

/// Return the raw `TMDB` tag value from a tag XML document, if present.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the document is not valid UTF-8 XML.
pub fn find_tmdb_value(xml: &[u8]) -> Result<Option<String>> {
    let text = std::str::from_utf8(xml).map_err(|e| Error::parse("tag xml", e))?;
    let text = text.trim_start_matches('\u{feff}');

    // mkvextract emits a DOCTYPE referencing matroskatags.dtd.
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options).map_err(|e| Error::parse("tag xml", e))?;

    let value = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Tag")
        .filter(|tag| is_file_level(*tag))
        .flat_map(|tag| {
            tag.children()
                .filter(|c| c.is_element() && c.tag_name().name() == "Simple")
        })
        .filter(|simple| child_text(*simple, "Name") == Some(TMDB_TAG_NAME))
        .find_map(|simple| child_text(simple, "String"))
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    Ok(value)
}

/// Find the catalog identifier in a tag XML document.
///
/// Returns `Ok(None)` when there is no file-level `TMDB` tag, or when its
/// value is not a `movie/<number>` identifier.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the document is not valid UTF-8 XML.
pub fn find_tmdb_id(xml: &[u8]) -> Result<Option<MovieId>> {
    match find_tmdb_value(xml)? {
        Some(raw) => match raw.parse::<MovieId>() {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring TMDB tag that is not a movie");
                Ok(None)
            }
        },
        None => Ok(None),
    }
}
