//! Startup sample data

use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::book::{BookStatus, NewBook},
    repository::BookRepository,
};

const SAMPLE_BOOKS: [(&str, &str, &str, (i32, u32, u32), BookStatus); 5] = [
    ("Effective Java", "Joshua Bloch", "9780134685991", (2018, 1, 6), BookStatus::Available),
    ("Clean Code", "Robert C. Martin", "9780132350884", (2008, 8, 1), BookStatus::Available),
    ("Domain-Driven Design", "Eric Evans", "9780321125217", (2003, 8, 30), BookStatus::Borrowed),
    ("Refactoring", "Martin Fowler", "9780201485677", (1999, 7, 8), BookStatus::Available),
    ("Test-Driven Development", "Kent Beck", "9780321146533", (2002, 11, 8), BookStatus::Borrowed),
];

fn sample_books() -> Vec<NewBook> {
    SAMPLE_BOOKS
        .iter()
        .map(|&(title, author, isbn, (y, m, d), status)| NewBook {
            title: title.to_string(),
            author: author.to_string(),
            isbn: Some(isbn.to_string()),
            published_date: NaiveDate::from_ymd_opt(y, m, d),
            status,
        })
        .collect()
}

/// Insert the sample catalog when the store is empty.
/// Returns the number of books inserted.
pub async fn seed_if_empty(repository: &dyn BookRepository) -> AppResult<usize> {
    let existing = repository.count().await?;
    if existing > 0 {
        tracing::debug!(existing, "Store not empty, skipping seed");
        return Ok(0);
    }

    let books = sample_books();
    let total = books.len();
    for book in books {
        repository.insert(book).await?;
    }
    tracing::info!(count = total, "Seeded sample books");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryBookRepository;

    #[tokio::test]
    async fn test_seed_empty_store() {
        let repo = InMemoryBookRepository::new();
        assert_eq!(seed_if_empty(&repo).await.unwrap(), 5);
        assert_eq!(repo.count().await.unwrap(), 5);

        let borrowed = repo.find_by_status(BookStatus::Borrowed).await.unwrap();
        let titles: Vec<&str> = borrowed.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Domain-Driven Design", "Test-Driven Development"]);
    }

    #[tokio::test]
    async fn test_seed_runs_once() {
        let repo = InMemoryBookRepository::new();
        seed_if_empty(&repo).await.unwrap();
        assert_eq!(seed_if_empty(&repo).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_seed_skips_non_empty_store() {
        let repo = InMemoryBookRepository::new();
        repo.insert(NewBook {
            title: "Mine".into(),
            author: "Me".into(),
            isbn: None,
            published_date: None,
            status: BookStatus::Available,
        })
        .await
        .unwrap();

        assert_eq!(seed_if_empty(&repo).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
