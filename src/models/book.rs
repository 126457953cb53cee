//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{author::Author, book_instance::BookInstance, genre::Genre};

/// Book record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub summary: String,
    pub isbn: Option<String>,
}

/// Book as shown in listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    /// "Last, First"
    pub author_name: String,
}

/// Book with its author, genres and physical copies
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub author: Author,
    pub genres: Vec<Genre>,
    pub instances: Vec<BookInstance>,
}

/// Book create/update form (all fields editable)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub author_id: i32,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Summary cannot exceed 1000 characters"))]
    pub summary: String,
    #[validate(length(equal = 13, message = "ISBN must have 13 characters"))]
    pub isbn: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

/// Book listing query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookListQuery {
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// Case-insensitive title substring
    pub title: Option<String>,
}
