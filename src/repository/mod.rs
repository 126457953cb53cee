//! Repository layer for database operations

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Author, AuthorDetail, AuthorForm, Book, BookDetail, BookForm, BookInstance, BookSummary,
        Genre, LoanStatus,
    },
};

/// Storage operations the catalog services rely on.
///
/// Single-record reads and writes report a missing record as `AppError::NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    // Counts
    async fn count_authors(&self) -> AppResult<i64>;
    async fn count_genres(&self) -> AppResult<i64>;
    async fn count_books(&self) -> AppResult<i64>;
    async fn count_instances(&self, status: Option<LoanStatus>) -> AppResult<i64>;

    // Books
    async fn count_books_matching(&self, title: &str) -> AppResult<i64>;
    /// Books whose title contains `title` (case-insensitive), ordered by title
    async fn list_books(&self, title: &str, limit: i64, offset: i64) -> AppResult<Vec<BookSummary>>;
    async fn get_book(&self, id: i32) -> AppResult<BookDetail>;
    async fn book_exists(&self, id: i32) -> AppResult<bool>;
    async fn create_book(&self, form: &BookForm) -> AppResult<Book>;
    async fn update_book(&self, id: i32, form: &BookForm) -> AppResult<Book>;
    async fn delete_book(&self, id: i32) -> AppResult<()>;
    async fn count_instances_of_book(&self, book_id: i32) -> AppResult<i64>;

    // Authors
    /// Authors ordered by last name, then first name
    async fn list_authors(&self, limit: i64, offset: i64) -> AppResult<Vec<Author>>;
    async fn get_author(&self, id: i32) -> AppResult<AuthorDetail>;
    async fn author_exists(&self, id: i32) -> AppResult<bool>;
    async fn create_author(&self, form: &AuthorForm) -> AppResult<Author>;
    async fn update_author(&self, id: i32, form: &AuthorForm) -> AppResult<Author>;
    async fn delete_author(&self, id: i32) -> AppResult<()>;
    async fn count_books_by_author(&self, author_id: i32) -> AppResult<i64>;

    // Genres
    async fn list_genres(&self) -> AppResult<Vec<Genre>>;
    /// Ids from `ids` with no matching genre
    async fn missing_genres(&self, ids: &[i32]) -> AppResult<Vec<i32>>;

    // Book instances
    /// On-loan copies, optionally restricted to one borrower
    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64>;
    /// On-loan copies ordered by due-back date, earliest first
    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookInstance>>;
    async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance>;
    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance>;
}

/// PostgreSQL record store holding the connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub genres: genres::GenresRepository,
    pub instances: book_instances::BookInstancesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            genres: genres::GenresRepository::new(pool.clone()),
            instances: book_instances::BookInstancesRepository::new(pool.clone()),
            pool,
        }
    }
}

/// `%needle%` for ILIKE, with LIKE wildcards in `needle` escaped
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl RecordStore for Repository {
    async fn count_authors(&self) -> AppResult<i64> {
        self.authors.count().await
    }

    async fn count_genres(&self) -> AppResult<i64> {
        self.genres.count().await
    }

    async fn count_books(&self) -> AppResult<i64> {
        self.books.count().await
    }

    async fn count_instances(&self, status: Option<LoanStatus>) -> AppResult<i64> {
        self.instances.count(status).await
    }

    async fn count_books_matching(&self, title: &str) -> AppResult<i64> {
        self.books.count_matching(title).await
    }

    async fn list_books(&self, title: &str, limit: i64, offset: i64) -> AppResult<Vec<BookSummary>> {
        self.books.list(title, limit, offset).await
    }

    async fn get_book(&self, id: i32) -> AppResult<BookDetail> {
        let book = self.books.get_by_id(id).await?;
        let author = self.authors.get_by_id(book.author_id).await?;
        let genres = self.genres.for_book(id).await?;
        let instances = self.instances.for_book(id).await?;
        Ok(BookDetail {
            book,
            author,
            genres,
            instances,
        })
    }

    async fn book_exists(&self, id: i32) -> AppResult<bool> {
        self.books.exists(id).await
    }

    async fn create_book(&self, form: &BookForm) -> AppResult<Book> {
        self.books.create(form).await
    }

    async fn update_book(&self, id: i32, form: &BookForm) -> AppResult<Book> {
        self.books.update(id, form).await
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.books.delete(id).await
    }

    async fn count_instances_of_book(&self, book_id: i32) -> AppResult<i64> {
        self.instances.count_for_book(book_id).await
    }

    async fn list_authors(&self, limit: i64, offset: i64) -> AppResult<Vec<Author>> {
        self.authors.list(limit, offset).await
    }

    async fn get_author(&self, id: i32) -> AppResult<AuthorDetail> {
        let author = self.authors.get_by_id(id).await?;
        let books = self.books.by_author(id).await?;
        Ok(AuthorDetail { author, books })
    }

    async fn author_exists(&self, id: i32) -> AppResult<bool> {
        self.authors.exists(id).await
    }

    async fn create_author(&self, form: &AuthorForm) -> AppResult<Author> {
        self.authors.create(form).await
    }

    async fn update_author(&self, id: i32, form: &AuthorForm) -> AppResult<Author> {
        self.authors.update(id, form).await
    }

    async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.authors.delete(id).await
    }

    async fn count_books_by_author(&self, author_id: i32) -> AppResult<i64> {
        self.books.count_by_author(author_id).await
    }

    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.genres.list().await
    }

    async fn missing_genres(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        self.genres.missing(ids).await
    }

    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64> {
        self.instances.count_on_loan(borrower_id).await
    }

    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookInstance>> {
        self.instances.list_on_loan(borrower_id, limit, offset).await
    }

    async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        self.instances.get_by_id(id).await
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        self.instances.set_due_back(id, due_back).await
    }
}
