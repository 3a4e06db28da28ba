//! Parser for the attachment lines of `mkvmerge --identify`.
//!
//! Each attachment is reported on its own line:
//!
//! ```text
//! Attachment ID 1: type 'application/json', size 2817 bytes, file name 'tmdb.json'
//! ```
//!
//! The grammar is: a numeric id, a single-quoted MIME type, any further
//! comma-separated fields, then a single-quoted file name. Lines that do not
//! match (tracks, chapters, the container line) are ignored.

use std::sync::LazyLock;

use regex::Regex;

static ATTACHMENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^Attachment ID (?P<id>[0-9]+): type '(?P<mime>[^']+)',(.*,?) file name '(?P<name>[^']+)'",
    )
    .expect("attachment line pattern is valid")
});

/// An attachment embedded in a container file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Id to pass to `mkvextract attachments`.
    pub id: u32,
    /// MIME type as reported by mkvmerge.
    pub mime_type: String,
    /// Attachment file name, e.g. `tmdb.json`.
    pub file_name: String,
}

impl Attachment {
    /// Parse a single identify line, returning `None` for non-attachment lines.
    pub fn parse_line(line: &str) -> Option<Self> {
        let caps = ATTACHMENT_LINE.captures(line)?;
        let id = caps["id"].parse().ok()?;
        Some(Self {
            id,
            mime_type: caps["mime"].to_string(),
            file_name: caps["name"].to_string(),
        })
    }
}

/// Parse every attachment line from `mkvmerge --identify` output.
pub fn parse_identify_output(output: &str) -> Vec<Attachment> {
    output.lines().filter_map(Attachment::parse_line).collect()
}

/// Find an attachment by exact file name.
pub fn find_by_name<'a>(attachments: &'a [Attachment], name: &str) -> Option<&'a Attachment> {
    attachments.iter().find(|a| a.file_name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTIFY_OUTPUT: &str = "\
File '/movies/The Matrix (1999).mkv': container: Matroska
Track ID 0: video (HEVC/H.265/MPEG-H)
Track ID 1: audio (E-AC-3)
Track ID 2: subtitles (SubRip/SRT)
Attachment ID 1: type 'application/json', size 2817 bytes, file name 'tmdb.json'
Attachment ID 2: type 'image/jpeg', size 184220 bytes, description 'Poster, front', file name 'cover.jpg'
Chapters: 32 entries
";

    #[test]
    fn parses_attachment_lines_only() {
        let attachments = parse_identify_output(IDENTIFY_OUTPUT);
        assert_eq!(
            attachments,
            vec![
                Attachment {
                    id: 1,
                    mime_type: "application/json".into(),
                    file_name: "tmdb.json".into(),
                },
                Attachment {
                    id: 2,
                    mime_type: "image/jpeg".into(),
                    file_name: "cover.jpg".into(),
                },
            ]
        );
    }

    #[test]
    fn extra_fields_between_type_and_name() {
        let line = "Attachment ID 7: type 'font/ttf', size 10 bytes, description 'a, b', file name 'Font.ttf'";
        let a = Attachment::parse_line(line).unwrap();
        assert_eq!(a.id, 7);
        assert_eq!(a.mime_type, "font/ttf");
        assert_eq!(a.file_name, "Font.ttf");
    }

    #[test]
    fn file_names_with_spaces() {
        let line = "Attachment ID 3: type 'image/png', size 5 bytes, file name 'back cover.png'";
        assert_eq!(
            Attachment::parse_line(line).map(|a| a.file_name),
            Some("back cover.png".to_string())
        );
    }

    #[test]
    fn rejects_non_matching_lines() {
        assert_eq!(Attachment::parse_line("Track ID 0: video (AVC)"), None);
        assert_eq!(Attachment::parse_line("  Attachment ID 1: type 'a/b', file name 'x'"), None);
        assert_eq!(Attachment::parse_line("Attachment ID x: type 'a/b', size 1, file name 'x'"), None);
        assert_eq!(Attachment::parse_line(""), None);
    }

    #[test]
    fn find_by_exact_name() {
        let attachments = parse_identify_output(IDENTIFY_OUTPUT);
        assert_eq!(find_by_name(&attachments, "cover.jpg").map(|a| a.id), Some(2));
        assert!(find_by_name(&attachments, "Cover.jpg").is_none());
        assert!(find_by_name(&attachments, "tmdb").is_none());
    }
}
