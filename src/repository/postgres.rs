//! PostgreSQL book repository

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, Pool, Postgres};

use super::BookRepository;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookStatus, NewBook},
};

const SELECT_BOOKS: &str =
    "SELECT id, title, author, isbn, published_date, status FROM books";

#[derive(Debug, FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    isbn: Option<String>,
    published_date: Option<NaiveDate>,
    status: String,
}

impl TryFrom<BookRow> for Book {
    type Error = AppError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BookStatus>()
            .map_err(|e| AppError::Internal(format!("book {}: {}", row.id, e)))?;
        Ok(Book {
            id: row.id,
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            published_date: row.published_date,
            status,
        })
    }
}

fn into_books(rows: Vec<BookRow>) -> AppResult<Vec<Book>> {
    rows.into_iter().map(Book::try_from).collect()
}

/// Map a unique violation on `uk_books_isbn` to a conflict
fn map_write_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::duplicate_isbn(),
        _ => AppError::Database(e),
    }
}

#[derive(Clone)]
pub struct PgBookRepository {
    pool: Pool<Postgres>,
}

impl PgBookRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn get(&self, id: i64) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(&format!("{} WHERE id = $1", SELECT_BOOKS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Book::try_from).transpose()
    }

    async fn exists_by_isbn(&self, isbn: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(&format!("{} WHERE isbn = $1", SELECT_BOOKS))
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Book::try_from).transpose()
    }

    async fn find_by_author_ignore_case(&self, author: &str) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "{} WHERE LOWER(author) = LOWER($1) ORDER BY id",
            SELECT_BOOKS
        ))
        .bind(author)
        .fetch_all(&self.pool)
        .await?;
        into_books(rows)
    }

    async fn find_by_status(&self, status: BookStatus) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            "{} WHERE status = $1 ORDER BY id",
            SELECT_BOOKS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        into_books(rows)
    }

    async fn find_all(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!("{} ORDER BY id", SELECT_BOOKS))
            .fetch_all(&self.pool)
            .await?;
        into_books(rows)
    }

    async fn insert(&self, book: NewBook) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (title, author, isbn, published_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, author, isbn, published_date, status
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.published_date)
        .bind(book.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        Book::try_from(row)
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books
            SET title = $1, author = $2, isbn = $3, published_date = $4, status = $5
            WHERE id = $6
            RETURNING id, title, author, isbn, published_date, status
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.published_date)
        .bind(book.status.as_str())
        .bind(book.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| AppError::book_not_found(book.id))?;
        Book::try_from(row)
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::book_not_found(id));
        }
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
