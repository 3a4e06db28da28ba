//! Catalog identifiers.
//!
//! A [`MovieId`] is the external identifier stored in a file's `TMDB` tag,
//! always of the form `movie/<number>`. It is only ever parsed from tag
//! metadata or built from a route's numeric id, never invented.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MOVIE_PREFIX: &str = "movie/";

/// Identifier of a movie in the catalog (`movie/<number>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MovieId(String);

impl MovieId {
    /// Build the identifier for a numeric TMDB movie id.
    #[must_use]
    pub fn from_number(number: u64) -> Self {
        Self(format!("{MOVIE_PREFIX}{number}"))
    }

    /// The full `movie/<number>` form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric part of the identifier.
    pub fn number(&self) -> &str {
        &self.0[MOVIE_PREFIX.len()..]
    }
}

/// Error returned when a string is not a `movie/<number>` identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a movie identifier: {0:?}")]
pub struct InvalidMovieId(pub String);

impl FromStr for MovieId {
    type Err = InvalidMovieId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.strip_prefix(MOVIE_PREFIX) {
            Some(number) if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) => {
                Ok(Self(trimmed.to_string()))
            }
            _ => Err(InvalidMovieId(s.to_string())),
        }
    }
}

impl TryFrom<String> for MovieId {
    type Error = InvalidMovieId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MovieId> for String {
    fn from(id: MovieId) -> Self {
        id.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_number_formats() {
        let id = MovieId::from_number(550);
        assert_eq!(id.as_str(), "movie/550");
        assert_eq!(id.number(), "550");
        assert_eq!(id.to_string(), "movie/550");
    }

    #[test]
    fn parse_accepts_movie_ids() {
        let id: MovieId = "movie/603".parse().unwrap();
        assert_eq!(id, MovieId::from_number(603));
    }

    #[test]
    fn parse_trims_whitespace() {
        let id: MovieId = "  movie/603\n".parse().unwrap();
        assert_eq!(id.as_str(), "movie/603");
    }

    #[test]
    fn parse_rejects_other_forms() {
        assert!("tv/1399".parse::<MovieId>().is_err());
        assert!("movie/".parse::<MovieId>().is_err());
        assert!("movie/12a".parse::<MovieId>().is_err());
        assert!("603".parse::<MovieId>().is_err());
        assert!("".parse::<MovieId>().is_err());
    }

    #[test]
    fn serde_transparent_string() {
        let id = MovieId::from_number(13);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"movie/13\"");
        let back: MovieId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<MovieId>("\"show/13\"").is_err());
    }
}
