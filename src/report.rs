//! Owned result rows returned by store queries.

use serde::Serialize;

use crate::types::{Isbn, MemberId, TsMs};

/// An open borrow record older than the overdue threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverdueEntry {
    /// Title of the borrowed book.
    pub book_title: String,
    /// ISBN of the borrowed book.
    pub book_isbn: Isbn,
    /// Name of the borrowing member.
    pub member_name: String,
    /// Id of the borrowing member.
    pub member_id: MemberId,
    /// Whole days past the threshold.
    pub days_overdue: u64,
}

/// One line of a member's borrow history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Title of the book, `None` once the book has been removed from the catalog.
    pub book_title: Option<String>,
    /// ISBN of the book.
    pub book_isbn: Isbn,
    /// When the book was borrowed.
    pub borrowed_at: TsMs,
    /// When the book was returned.
    pub returned_at: Option<TsMs>,
    /// Convenience flag, equal to `returned_at.is_some()`.
    pub is_returned: bool,
}

/// Member listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSummary {
    /// Member id.
    pub member_id: MemberId,
    /// Display name.
    pub name: String,
    /// Contact details.
    pub contact: String,
    /// Whether the member may borrow.
    pub is_active: bool,
    /// Number of books currently held.
    pub borrowed_books_count: usize,
}

/// Member ranked by lifetime borrow count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopBorrower {
    /// Member id.
    pub member_id: MemberId,
    /// Display name.
    pub name: String,
    /// Open plus closed records for this member.
    pub total_borrows: usize,
}

/// Catalog-wide counters, derived by full scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Statistics {
    /// Books in the catalog.
    pub total_books: usize,
    /// Books on the shelf.
    pub available_books: usize,
    /// Books checked out.
    pub books_borrowed: usize,
    /// Registered members.
    pub total_members: usize,
    /// Members allowed to borrow.
    pub active_members: usize,
}
