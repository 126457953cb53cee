//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod pagination;
pub mod session;
pub mod summary;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorDetail, AuthorForm};
pub use book::{Book, BookDetail, BookForm, BookSummary};
pub use book_instance::{BookInstance, LoanStatus};
pub use genre::Genre;
pub use pagination::{Page, PageWindow};
pub use session::Session;
pub use summary::HomeSummary;
pub use user::UserClaims;
