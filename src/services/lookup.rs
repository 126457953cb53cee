//! Single-record lookups for the detail views

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{AuthorDetail, BookDetail},
    repository::RecordStore,
};

#[derive(Clone)]
pub struct LookupService {
    store: Arc<dyn RecordStore>,
}

impl LookupService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Book with its author, genres and copies; one store lookup
    pub async fn book(&self, id: i32) -> AppResult<BookDetail> {
        self.store.get_book(id).await
    }

    /// Author with their books; one store lookup
    pub async fn author(&self, id: i32) -> AppResult<AuthorDetail> {
        self.store.get_author(id).await
    }
}
