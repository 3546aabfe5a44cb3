//! Catalog records (books, members, borrow records), drafts, and patches.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{Isbn, MemberId, TsMs};

/// A catalogued book. Identity is the ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Book title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Free-text category.
    pub category: String,
    /// Unique identifier.
    pub isbn: Isbn,
    /// False while the book is checked out.
    pub is_available: bool,
}

/// A library member. Identity is the member id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Display name.
    pub name: String,
    /// Unique identifier.
    pub member_id: MemberId,
    /// Contact details (email, phone, ...).
    pub contact: String,
    /// ISBNs the member currently holds.
    pub borrowed_books: BTreeSet<Isbn>,
    /// Inactive members cannot borrow.
    pub is_active: bool,
}

/// One borrow event. Closed by setting `returned_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRecord {
    /// Borrowed book.
    pub book_isbn: Isbn,
    /// Borrowing member.
    pub member_id: MemberId,
    /// When the book left the library.
    pub borrowed_at: TsMs,
    /// When the book came back, `None` while open.
    pub returned_at: Option<TsMs>,
}

impl BorrowRecord {
    /// Returns true while the book has not been returned.
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }

    /// Whole days elapsed between borrowing and `now`.
    pub fn age_days(&self, now: TsMs) -> u64 {
        now.saturating_sub(self.borrowed_at) / crate::types::MS_PER_DAY
    }
}

/// Insert payload used to create a new [`Book`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    /// Book title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Free-text category.
    pub category: String,
    /// Unique identifier.
    pub isbn: Isbn,
}

impl BookDraft {
    /// Convenience constructor mirroring the add-book prompt order.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
        isbn: impl Into<Isbn>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            category: category.into(),
            isbn: isbn.into(),
        }
    }

    pub(crate) fn into_book(self) -> Book {
        Book {
            title: self.title,
            author: self.author,
            category: self.category,
            isbn: self.isbn,
            is_available: true,
        }
    }
}

/// Insert payload used to create a new [`Member`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDraft {
    /// Display name.
    pub name: String,
    /// Unique identifier.
    pub member_id: MemberId,
    /// Contact details.
    pub contact: String,
}

impl MemberDraft {
    /// Convenience constructor mirroring the add-member prompt order.
    pub fn new(
        name: impl Into<String>,
        member_id: impl Into<MemberId>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            member_id: member_id.into(),
            contact: contact.into(),
        }
    }

    pub(crate) fn into_member(self) -> Member {
        Member {
            name: self.name,
            member_id: self.member_id,
            contact: self.contact,
            borrowed_books: BTreeSet::new(),
            is_active: true,
        }
    }
}

/// Sparse patch where each non-empty `Some` field overwrites the book value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookPatch {
    /// Optional replacement title.
    pub title: Option<String>,
    /// Optional replacement author.
    pub author: Option<String>,
    /// Optional replacement category.
    pub category: Option<String>,
}

impl BookPatch {
    /// Applies this patch in place to `book`.
    pub fn apply_to(&self, book: &mut Book) {
        overwrite(&mut book.title, self.title.as_deref());
        overwrite(&mut book.author, self.author.as_deref());
        overwrite(&mut book.category, self.category.as_deref());
    }
}

/// Sparse patch where each non-empty `Some` field overwrites the member value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberPatch {
    /// Optional replacement name.
    pub name: Option<String>,
    /// Optional replacement contact.
    pub contact: Option<String>,
}

impl MemberPatch {
    /// Applies this patch in place to `member`.
    pub fn apply_to(&self, member: &mut Member) {
        overwrite(&mut member.name, self.name.as_deref());
        overwrite(&mut member.contact, self.contact.as_deref());
    }
}

fn overwrite(field: &mut String, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        *field = v.to_string();
    }
}
