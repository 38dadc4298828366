//! Movie model and slug derivation

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

/// Movie entity
///
/// `rating` and `user_rating` are read-side values: the store fills them in
/// from the ratings table and never writes them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub year_of_release: i32,
    pub genres: Vec<String>,
    /// Average of every user's rating, if anybody rated the movie
    pub rating: Option<f32>,
    /// The requesting user's own rating
    pub user_rating: Option<i32>,
}

impl Movie {
    /// Create a new movie with a freshly generated id
    pub fn new(title: impl Into<String>, year_of_release: i32, genres: Vec<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title, year_of_release, genres)
    }

    /// Create a movie for an existing id, e.g. the target of an update
    pub fn with_id(
        id: Uuid,
        title: impl Into<String>,
        year_of_release: i32,
        genres: Vec<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            year_of_release,
            genres,
            rating: None,
            user_rating: None,
        }
    }

    /// URL-safe identifier derived from title and year; always recomputed
    pub fn slug(&self) -> String {
        generate_slug(&self.title, self.year_of_release)
    }
}

/// Derive the slug for a title and release year.
///
/// Characters other than ASCII letters, digits, whitespace and `-` are
/// dropped, the rest is lower-cased, spaces become hyphens, trailing hyphens
/// are trimmed and `-<year>` is appended.
pub fn generate_slug(title: &str, year_of_release: i32) -> String {
    static SLUG_STRIP_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = SLUG_STRIP_REGEX
        .get_or_init(|| Regex::new(r"[^A-Za-z0-9\s-]").expect("Failed to compile slug regex"));

    let stripped = regex.replace_all(title, "").to_lowercase().replace(' ', "-");
    format!("{}-{}", stripped.trim_end_matches('-'), year_of_release)
}
