//! Home page summary

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Record counts shown on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HomeSummary {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
    /// Visits by this session before the current one
    pub num_visits: u64,
}
