//! Input validation for movies, ratings and listing options
//!
//! Every rule runs independently and all failures are reported together, so
//! a caller can render per-field feedback in one pass.

use chrono::{Datelike, Utc};
use serde::Serialize;
use std::fmt;

use crate::models::{
    GetAllMoviesOptions, Movie, MovieFilter, MovieListQuery, Sort, SortField, SortOrder,
};

/// Largest page a listing may request
pub const MAX_PAGE_SIZE: i32 = 25;

/// Smallest and largest accepted rating value
pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub property_name: String,
    pub message: String,
}

/// All failures found while validating one input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    failures: Vec<ValidationFailure>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a collection holding exactly one failure
    pub fn single(property_name: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(property_name, message);
        errors
    }

    pub fn add(&mut self, property_name: &str, message: &str) {
        self.failures.push(ValidationFailure {
            property_name: property_name.to_string(),
            message: message.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// Whether any failure concerns `property_name`
    pub fn has_failure_for(&self, property_name: &str) -> bool {
        self.failures.iter().any(|f| f.property_name == property_name)
    }

    /// `Ok(())` when nothing failed, otherwise the collected failures
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for failure in &self.failures {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", failure.property_name, failure.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// The current calendar year in UTC
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Field rules for a movie about to be written.
///
/// Slug uniqueness needs the store and is checked by the movie service on top
/// of these.
pub fn validate_movie_fields(movie: &Movie, current_year: i32) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if movie.title.trim().is_empty() {
        errors.add("title", "Title is required");
    }

    if movie.genres.is_empty() {
        errors.add("genres", "Genre is required");
    } else if movie.genres.iter().any(|genre| genre.trim().is_empty()) {
        errors.add("genres", "Genre name cannot be empty");
    }

    if movie.year_of_release > current_year {
        errors.add(
            "year_of_release",
            "Year must be equal or less than current date",
        );
    }

    errors
}

/// Validate the title/year predicate shared by listing and counting
pub fn validate_filter(
    title: Option<&str>,
    year_of_release: Option<i32>,
    current_year: i32,
) -> Result<MovieFilter, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_year_filter(year_of_release, current_year, &mut errors);
    errors.into_result()?;

    Ok(MovieFilter {
        title: title.map(str::to_string),
        year_of_release,
    })
}

/// Validate listing options and resolve them into a store query
pub fn validate_options(
    options: &GetAllMoviesOptions,
    current_year: i32,
) -> Result<MovieListQuery, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_year_filter(options.year_of_release, current_year, &mut errors);

    let field = match options.sort_field.as_deref() {
        None => None,
        Some(name) => {
            let field = SortField::parse(name);
            if field.is_none() {
                errors.add("sort_field", "Must provide a valid sort field");
            }
            field
        }
    };

    if options.page < 1 {
        errors.add("page", "Page cannot be less than 1");
    }

    if !(1..=MAX_PAGE_SIZE).contains(&options.page_size) {
        errors.add("page_size", "Page size must be between 1 and 25");
    }

    errors.into_result()?;

    let sort = field.map(|field| Sort {
        field,
        descending: options.sort_order == SortOrder::Descending,
    });

    Ok(MovieListQuery {
        filter: MovieFilter {
            title: options.title.clone(),
            year_of_release: options.year_of_release,
        },
        sort,
        page: options.page.unsigned_abs(),
        page_size: options.page_size.unsigned_abs(),
        user_id: options.user_id,
    })
}

/// A rating value must be within 1..=5
pub fn validate_rating(rating: i32) -> Result<(), ValidationErrors> {
    if RATING_RANGE.contains(&rating) {
        Ok(())
    } else {
        Err(ValidationErrors::single(
            "rating",
            "Rating must be between 1 and 5",
        ))
    }
}

fn check_year_filter(
    year_of_release: Option<i32>,
    current_year: i32,
    errors: &mut ValidationErrors,
) {
    if year_of_release.is_some_and(|year| year > current_year) {
        errors.add(
            "year_of_release",
            "Year cannot be later than the current year",
        );
    }
}
