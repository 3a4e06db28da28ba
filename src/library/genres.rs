//! The static movie genre taxonomy served at `/movie/genres.json`.

use serde::Serialize;

/// A genre record as published by TMDB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub id: u32,
    pub name: &'static str,
}

const fn genre(id: u32, name: &'static str) -> Genre {
    Genre { id, name }
}

/// TMDB movie genre list (`/3/genre/movie/list`, en-US).
pub const GENRES: &[Genre] = &[
    genre(28, "Action"),
    genre(12, "Adventure"),
    genre(16, "Animation"),
    genre(35, "Comedy"),
    genre(80, "Crime"),
    genre(99, "Documentary"),
    genre(18, "Drama"),
    genre(10751, "Family"),
    genre(14, "Fantasy"),
    genre(36, "History"),
    genre(27, "Horror"),
    genre(10402, "Music"),
    genre(9648, "Mystery"),
    genre(10749, "Romance"),
    genre(878, "Science Fiction"),
    genre(10770, "TV Movie"),
    genre(53, "Thriller"),
    genre(10752, "War"),
    genre(37, "Western"),
];
