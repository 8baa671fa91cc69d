//! In-memory book repository, used by tests and database-less runs

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::BookRepository;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookStatus, NewBook},
};

#[derive(Default)]
struct Store {
    last_id: i64,
    books: BTreeMap<i64, Book>,
}

impl Store {
    fn isbn_taken(&self, isbn: Option<&str>, except_id: Option<i64>) -> bool {
        let Some(isbn) = isbn else {
            return false;
        };
        self.books
            .values()
            .any(|b| Some(b.id) != except_id && b.isbn.as_deref() == Some(isbn))
    }
}

/// Books held in a `BTreeMap` keyed by id. Ids are never reused.
#[derive(Default)]
pub struct InMemoryBookRepository {
    store: RwLock<Store>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn get(&self, id: i64) -> AppResult<Option<Book>> {
        Ok(self.store.read().await.books.get(&id).cloned())
    }

    async fn exists_by_isbn(&self, isbn: &str) -> AppResult<bool> {
        Ok(self.store.read().await.isbn_taken(Some(isbn), None))
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let store = self.store.read().await;
        Ok(store
            .books
            .values()
            .find(|b| b.isbn.as_deref() == Some(isbn))
            .cloned())
    }

    async fn find_by_author_ignore_case(&self, author: &str) -> AppResult<Vec<Book>> {
        let author = author.to_lowercase();
        let store = self.store.read().await;
        Ok(store
            .books
            .values()
            .filter(|b| b.author.to_lowercase() == author)
            .cloned()
            .collect())
    }

    async fn find_by_status(&self, status: BookStatus) -> AppResult<Vec<Book>> {
        let store = self.store.read().await;
        Ok(store
            .books
            .values()
            .filter(|b| b.status == status)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> AppResult<Vec<Book>> {
        Ok(self.store.read().await.books.values().cloned().collect())
    }

    async fn insert(&self, book: NewBook) -> AppResult<Book> {
        let mut store = self.store.write().await;
        if store.isbn_taken(book.isbn.as_deref(), None) {
            return Err(AppError::duplicate_isbn());
        }
        store.last_id += 1;
        let book = book.with_id(store.last_id);
        store.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let mut store = self.store.write().await;
        if !store.books.contains_key(&book.id) {
            return Err(AppError::book_not_found(book.id));
        }
        if store.isbn_taken(book.isbn.as_deref(), Some(book.id)) {
            return Err(AppError::duplicate_isbn());
        }
        store.books.insert(book.id, book.clone());
        Ok(book.clone())
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        match self.store.write().await.books.remove(&id) {
            Some(_) => Ok(()),
            None => Err(AppError::book_not_found(id)),
        }
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.store.read().await.books.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_book(title: &str, author: &str, isbn: Option<&str>, status: BookStatus) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.map(str::to_string),
            published_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            status,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let repo = InMemoryBookRepository::new();
        let a = repo.insert(new_book("A", "X", None, BookStatus::Available)).await.unwrap();
        let b = repo.insert(new_book("B", "X", None, BookStatus::Available)).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let repo = InMemoryBookRepository::new();
        let a = repo.insert(new_book("A", "X", None, BookStatus::Available)).await.unwrap();
        repo.delete_by_id(a.id).await.unwrap();
        let b = repo.insert(new_book("B", "X", None, BookStatus::Available)).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_isbn() {
        let repo = InMemoryBookRepository::new();
        repo.insert(new_book("A", "X", Some("ISBN-1"), BookStatus::Available))
            .await
            .unwrap();
        let err = repo
            .insert(new_book("B", "Y", Some("ISBN-1"), BookStatus::Available))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_own_isbn() {
        let repo = InMemoryBookRepository::new();
        let mut book = repo
            .insert(new_book("A", "X", Some("ISBN-1"), BookStatus::Available))
            .await
            .unwrap();
        book.title = "A2".into();
        let updated = repo.update(&book).await.unwrap();
        assert_eq!(updated.title, "A2");
        assert_eq!(repo.get(book.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_finders() {
        let repo = InMemoryBookRepository::new();
        repo.insert(new_book("A", "Kent Beck", Some("I1"), BookStatus::Available))
            .await
            .unwrap();
        repo.insert(new_book("B", "kent beck", None, BookStatus::Borrowed))
            .await
            .unwrap();
        repo.insert(new_book("C", "Eric Evans", None, BookStatus::Borrowed))
            .await
            .unwrap();

        assert_eq!(repo.find_by_author_ignore_case("KENT BECK").await.unwrap().len(), 2);
        assert_eq!(repo.find_by_status(BookStatus::Borrowed).await.unwrap().len(), 2);
        assert_eq!(
            repo.find_by_isbn("I1").await.unwrap().map(|b| b.title),
            Some("A".to_string())
        );
        assert!(repo.exists_by_isbn("I1").await.unwrap());
        assert!(!repo.exists_by_isbn("I2").await.unwrap());

        let titles: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let repo = InMemoryBookRepository::new();
        assert!(matches!(
            repo.delete_by_id(42).await,
            Err(AppError::NotFound(_))
        ));
    }
}
