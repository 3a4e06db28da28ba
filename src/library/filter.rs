//! Query filters for the `/movies.json` index.

use duckflix_common::{Error, Result};
use serde_json::Value;

/// Filters parsed from repeatable `genre_id` and `original_language` query
/// parameters.
///
/// A filter that was not supplied matches everything. A supplied filter
/// matches entries whose descriptive metadata carries at least one of the
/// listed values; both filters together must both match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFilter {
    genre_ids: Option<Vec<i64>>,
    languages: Option<Vec<String>>,
}

impl MovieFilter {
    /// Build a filter from raw query pairs, keeping repeated keys.
    ///
    /// Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a `genre_id` is not an integer.
    pub fn from_query<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            match key {
                "genre_id" => {
                    let id = value.trim().parse::<i64>().map_err(|_| {
                        Error::Validation(format!("genre_id must be an integer, got {value:?}"))
                    })?;
                    filter.genre_ids.get_or_insert_with(Vec::new).push(id);
                }
                "original_language" => {
                    filter
                        .languages
                        .get_or_insert_with(Vec::new)
                        .push(value.to_string());
                }
                _ => {}
            }
        }
        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.genre_ids.is_none() && self.languages.is_none()
    }

    /// Whether a descriptive metadata document passes every active filter.
    pub fn matches(&self, details: &Value) -> bool {
        if let Some(wanted) = &self.genre_ids {
            let genre_ids = details.get("genre_ids").and_then(Value::as_array);
            let hit = genre_ids
                .map(|ids| {
                    ids.iter()
                        .filter_map(Value::as_i64)
                        .any(|id| wanted.contains(&id))
                })
                .unwrap_or(false);
            if !hit {
                return false;
            }
        }

        if let Some(wanted) = &self.languages {
            let language = details.get("original_language").and_then(Value::as_str);
            match language {
                Some(lang) if wanted.iter().any(|w| w == lang) => {}
                _ => return false,
            }
        }

        true
    }
}
