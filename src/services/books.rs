//! Book lifecycle service

use std::sync::Arc;

use chrono::NaiveDate;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    repository::BookRepository,
};

#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    /// Create a book. The ISBN, when given, must not already be catalogued.
    pub async fn create(&self, data: CreateBook) -> AppResult<Book> {
        let book = data.into_new_book()?;

        if let Some(ref isbn) = book.isbn {
            if self.repository.exists_by_isbn(isbn).await? {
                return Err(AppError::duplicate_isbn());
            }
        }

        let created = self.repository.insert(book).await?;
        tracing::info!(book_id = created.id, isbn = ?created.isbn, "Book created");
        Ok(created)
    }

    /// List books matching every supplied filter, in storage order
    pub async fn find_all(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let books = self.repository.find_all().await?;
        Ok(books.into_iter().filter(|b| query.matches(b)).collect())
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Book> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::book_not_found(id))
    }

    /// Apply a partial update: absent fields keep their stored value
    pub async fn update(&self, id: i64, data: UpdateBook) -> AppResult<Book> {
        data.validate()?;

        let mut book = self.find_by_id(id).await?;

        if let Some(ref isbn) = data.isbn {
            if book.isbn.as_deref() != Some(isbn.as_str())
                && self.repository.exists_by_isbn(isbn).await?
            {
                return Err(AppError::duplicate_isbn());
            }
        }

        tracing::debug!(book_id = id, title = %book.title, author = %book.author, "Updating book");
        data.apply_to(&mut book);
        let updated = self.repository.update(&book).await?;
        tracing::info!(book_id = id, "Book updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if self.repository.get(id).await?.is_none() {
            return Err(AppError::book_not_found(id));
        }
        self.repository.delete_by_id(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }

    /// Books with a publication date strictly after `date`
    pub async fn find_published_after(&self, date: NaiveDate) -> AppResult<Vec<Book>> {
        let books = self.repository.find_all().await?;
        Ok(books
            .into_iter()
            .filter(|b| b.published_date.is_some_and(|d| d > date))
            .collect())
    }

    /// Number of stored books (readiness probe)
    pub async fn count(&self) -> AppResult<i64> {
        self.repository.count().await
    }
}
