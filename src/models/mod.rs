//! Data models for the catalog

pub mod book;

pub use book::{Book, BookQuery, BookStatus, CreateBook, NewBook, PublishedAfterQuery, UpdateBook};
