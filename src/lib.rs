//! Library catalog and circulation tracking with whole-state snapshot persistence.
//!
//! # Examples
//!
//! In-memory usage with [`core::store::LibraryStore`]:
//! ```
//! use circdesk::{
//!     catalog::{BookDraft, MemberDraft},
//!     core::store::LibraryStore,
//! };
//!
//! let mut store = LibraryStore::new();
//! assert!(store.add_book(BookDraft::new("Dune", "Herbert", "Sci-Fi", "111")));
//! assert!(store.add_member(MemberDraft::new("Alice", "M1", "a@x.com")));
//! assert!(store.borrow_book("111", "M1"));
//! assert!(!store.borrow_book("111", "M1"));
//! assert!(store.return_book("111", "M1"));
//! ```
//!
//! Persisted usage with a SQLite file:
//! ```no_run
//! use circdesk::{
//!     catalog::BookDraft,
//!     persist::sqlite::SqliteSnapshotSink,
//!     runtime::library::{Library, LibraryOptions},
//! };
//!
//! let sink = SqliteSnapshotSink::open("library.db").expect("open sqlite");
//! let mut library = Library::open(Box::new(sink), LibraryOptions::default());
//! let added = library
//!     .add_book(BookDraft::new("Dune", "Herbert", "Sci-Fi", "111"))
//!     .expect("commit");
//! assert!(added);
//! ```
#![warn(missing_docs)]

/// Book, member and borrow record types.
pub mod catalog;
/// Configuration file model.
pub mod config;
/// Interactive librarian and member menus.
pub mod console;
/// Core in-memory store and index helpers.
pub mod core;
/// Logging setup.
pub mod logging;
/// Snapshot sinks (SQLite, JSON).
pub mod persist;
/// Query result rows.
pub mod report;
/// Library handle pairing the store with its sink.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
