//! Book catalog record and request types

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

/// Column width of `books.isbn`
pub const ISBN_MAX_LEN: usize = 30;

/// Lending status of a book.
/// No transition rules apply; any status may replace any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookStatus {
    #[default]
    Available,
    Borrowed,
}

impl BookStatus {
    /// Stored (and wire) representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "AVAILABLE",
            BookStatus::Borrowed => "BORROWED",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown book status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for BookStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(BookStatus::Available),
            "BORROWED" => Ok(BookStatus::Borrowed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Persisted book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Unique across the catalog when present
    pub isbn: Option<String>,
    /// Publication date (YYYY-MM-DD)
    pub published_date: Option<NaiveDate>,
    pub status: BookStatus,
}

/// A validated book that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub status: BookStatus,
}

impl NewBook {
    /// Attach the identifier assigned by the store
    pub fn with_id(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            published_date: self.published_date,
            status: self.status,
        }
    }
}

/// Create book request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    /// Required, non-blank
    #[validate(
        required(message = "Title is required"),
        custom(function = "not_blank", message = "Title is required")
    )]
    pub title: Option<String>,
    /// Required, non-blank
    #[validate(
        required(message = "Author is required"),
        custom(function = "not_blank", message = "Author is required")
    )]
    pub author: Option<String>,
    #[validate(length(max = 30, message = "ISBN must be at most 30 characters"))]
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    /// Defaults to AVAILABLE
    pub status: Option<BookStatus>,
}

/// Update book request. Only non-null fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(custom(function = "not_blank", message = "Title must not be blank"))]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank", message = "Author must not be blank"))]
    pub author: Option<String>,
    #[validate(length(max = 30, message = "ISBN must be at most 30 characters"))]
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub status: Option<BookStatus>,
}

/// Query filters for listing books
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Exact author match, case-insensitive. An empty value matches no book.
    #[serde(default)]
    pub author: Option<String>,
    /// Exact status match
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub status: Option<BookStatus>,
}

impl BookQuery {
    pub fn matches(&self, book: &Book) -> bool {
        let author_ok = self
            .author
            .as_deref()
            .map_or(true, |author| book.author.to_lowercase() == author.to_lowercase());
        let status_ok = self.status.map_or(true, |status| book.status == status);
        author_ok && status_ok
    }
}

/// Query for books published after a date
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PublishedAfterQuery {
    /// Exclusive lower bound (YYYY-MM-DD)
    pub date: NaiveDate,
}

/// Rejects values that are empty or whitespace only
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl CreateBook {
    /// Validate and convert into a storable book, defaulting the status
    pub fn into_new_book(self) -> Result<NewBook, ValidationErrors> {
        self.validate()?;
        Ok(NewBook {
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            isbn: self.isbn,
            published_date: self.published_date,
            status: self.status.unwrap_or_default(),
        })
    }
}

impl UpdateBook {
    /// Overwrite the fields of `book` that this request supplies
    pub fn apply_to(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(isbn) = self.isbn {
            book.isbn = Some(isbn);
        }
        if let Some(published_date) = self.published_date {
            book.published_date = Some(published_date);
        }
        if let Some(status) = self.status {
            book.status = status;
        }
    }
}
