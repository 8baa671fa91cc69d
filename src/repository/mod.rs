//! Repository layer for book storage

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::book::{Book, BookStatus, NewBook},
};

pub use memory::InMemoryBookRepository;
pub use postgres::PgBookRepository;

/// Durable collection of books.
///
/// Implementations enforce ISBN uniqueness on write and report a collision
/// as [`AppError::Conflict`](crate::error::AppError::Conflict).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn get(&self, id: i64) -> AppResult<Option<Book>>;

    async fn exists_by_isbn(&self, isbn: &str) -> AppResult<bool>;

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>>;

    async fn find_by_author_ignore_case(&self, author: &str) -> AppResult<Vec<Book>>;

    async fn find_by_status(&self, status: BookStatus) -> AppResult<Vec<Book>>;

    /// All books in insertion (id) order
    async fn find_all(&self) -> AppResult<Vec<Book>>;

    /// Store a new book; the repository assigns the id
    async fn insert(&self, book: NewBook) -> AppResult<Book>;

    /// Overwrite every field of the stored book with the same id
    async fn update(&self, book: &Book) -> AppResult<Book>;

    async fn delete_by_id(&self, id: i64) -> AppResult<()>;

    async fn count(&self) -> AppResult<i64>;
}
