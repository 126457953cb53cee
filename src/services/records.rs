//! Author and book record management

use std::sync::Arc;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    config::RecordsConfig,
    error::{AppError, AppResult},
    models::{
        author::AuthorFormDefaults, Author, AuthorForm, Book, BookForm,
    },
    repository::RecordStore,
};

#[derive(Clone)]
pub struct RecordsService {
    store: Arc<dyn RecordStore>,
    config: RecordsConfig,
}

impl RecordsService {
    pub fn new(store: Arc<dyn RecordStore>, config: RecordsConfig) -> Self {
        Self { store, config }
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    /// Initial values of the author creation form
    pub fn author_form_defaults(&self) -> AuthorFormDefaults {
        AuthorFormDefaults {
            date_of_death: self.config.author_death_placeholder,
        }
    }

    pub async fn create_author(&self, form: &AuthorForm) -> AppResult<Author> {
        form.check()?;

        let author = self.store.create_author(form).await?;
        tracing::info!("Created author id={} ({})", author.id, author.display_name());
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, form: &AuthorForm) -> AppResult<Author> {
        self.require_author(id).await?;
        form.check()?;

        let author = self.store.update_author(id, form).await?;
        tracing::info!("Updated author id={}", id);
        Ok(author)
    }

    /// Delete an author nobody references
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.require_author(id).await?;

        let books = self.store.count_books_by_author(id).await?;
        if books > 0 {
            return Err(AppError::Conflict(format!(
                "Author {} is still referenced by {} book(s)",
                id, books
            )));
        }

        self.store.delete_author(id).await?;
        tracing::info!("Deleted author id={}", id);
        Ok(())
    }

    async fn require_author(&self, id: i32) -> AppResult<()> {
        if self.store.author_exists(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Author with id {} not found", id)))
        }
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn create_book(&self, form: &BookForm) -> AppResult<Book> {
        self.check_book_form(form).await?;

        let book = self.store.create_book(form).await?;
        tracing::info!("Created book id={} ({})", book.id, book.title);
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, form: &BookForm) -> AppResult<Book> {
        self.require_book(id).await?;
        self.check_book_form(form).await?;

        let book = self.store.update_book(id, form).await?;
        tracing::info!("Updated book id={}", id);
        Ok(book)
    }

    /// Delete a book with no remaining copies
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.require_book(id).await?;

        let copies = self.store.count_instances_of_book(id).await?;
        if copies > 0 {
            return Err(AppError::Conflict(format!(
                "Book {} still has {} copy(ies)",
                id, copies
            )));
        }

        self.store.delete_book(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    async fn require_book(&self, id: i32) -> AppResult<()> {
        if self.store.book_exists(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Book with id {} not found", id)))
        }
    }

    /// Field rules plus existence of the referenced author and genres
    async fn check_book_form(&self, form: &BookForm) -> AppResult<()> {
        let mut errors = match form.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if !self.store.author_exists(form.author_id).await? {
            let mut error = ValidationError::new("unknown_author");
            error.message = Some(format!("No author with id {}", form.author_id).into());
            errors.add("author_id", error);
        }

        let missing = self.store.missing_genres(&form.genre_ids).await?;
        if !missing.is_empty() {
            let mut error = ValidationError::new("unknown_genre");
            error.message = Some(format!("No genre with id(s) {:?}", missing).into());
            errors.add("genre_ids", error);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidForm(errors))
        }
    }
}
