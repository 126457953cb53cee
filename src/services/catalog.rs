//! Catalog queries: home summary and paginated listings

use std::sync::Arc;

use crate::{
    config::{CatalogConfig, LoansConfig},
    error::AppResult,
    models::{
        book::BookListQuery, Author, BookInstance, BookSummary, Genre, HomeSummary, LoanStatus, Page,
        PageWindow, Session,
    },
    repository::RecordStore,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
    config: CatalogConfig,
    loans_per_page: i64,
}

impl CatalogService {
    pub fn new(store: Arc<dyn RecordStore>, config: CatalogConfig, loans: &LoansConfig) -> Self {
        Self {
            store,
            config,
            loans_per_page: loans.per_page,
        }
    }

    /// Record counts for the home page. Counts one more visit on `session`.
    pub async fn summary(&self, session: &mut Session) -> AppResult<HomeSummary> {
        let num_books = self.store.count_books().await?;
        let num_instances = self.store.count_instances(None).await?;
        let num_instances_available = self
            .store
            .count_instances(Some(LoanStatus::Available))
            .await?;
        let num_authors = self.store.count_authors().await?;
        let num_genres = self.store.count_genres().await?;

        let num_visits = session.record_visit();

        Ok(HomeSummary {
            num_books,
            num_instances,
            num_instances_available,
            num_authors,
            num_genres,
            num_visits,
        })
    }

    /// Books matching the title filter, capped at `book_list_cap` overall
    pub async fn list_books(&self, query: &BookListQuery) -> AppResult<Page<BookSummary>> {
        let title = query.title.as_deref().unwrap_or("");

        let matching = self.store.count_books_matching(title).await?;
        let total = matching.min(self.config.book_list_cap);
        let window = PageWindow::new(query.page, self.config.books_per_page, total)?;

        let books = self
            .store
            .list_books(title, window.limit, window.offset)
            .await?;

        Ok(window.into_page(books))
    }

    pub async fn list_authors(&self, page: Option<i64>) -> AppResult<Page<Author>> {
        let total = self.store.count_authors().await?;
        let window = PageWindow::new(page, self.config.authors_per_page, total)?;

        let authors = self.store.list_authors(window.limit, window.offset).await?;
        Ok(window.into_page(authors))
    }

    /// Cheap round trip to the store, used by the readiness check
    pub async fn ping(&self) -> AppResult<()> {
        self.store.count_genres().await.map(|_| ())
    }

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.store.list_genres().await
    }

    /// Copies currently on loan to `user_id`, earliest due first
    pub async fn my_loans(&self, user_id: i32, page: Option<i64>) -> AppResult<Page<BookInstance>> {
        self.on_loan(Some(user_id), page).await
    }

    /// Every copy currently on loan, earliest due first
    pub async fn all_loans(&self, page: Option<i64>) -> AppResult<Page<BookInstance>> {
        self.on_loan(None, page).await
    }

    async fn on_loan(&self, borrower_id: Option<i32>, page: Option<i64>) -> AppResult<Page<BookInstance>> {
        let total = self.store.count_on_loan(borrower_id).await?;
        let window = PageWindow::new(page, self.loans_per_page, total)?;

        let instances = self
            .store
            .list_on_loan(borrower_id, window.limit, window.offset)
            .await?;
        Ok(window.into_page(instances))
    }
}
