use std::time::{SystemTime, UNIX_EPOCH};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Book, BookDraft, BookPatch, BorrowRecord, Member, MemberDraft, MemberPatch},
    core::indices::VecIndex,
    report::{HistoryEntry, MemberSummary, OverdueEntry, Statistics, TopBorrower},
    types::{Clock, Isbn, MemberId, TsMs},
};

/// Reason an operation was refused or a snapshot rejected.
///
/// Mutations only surface this through `debug` logs; callers see `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No book has this ISBN.
    #[error("book not found: {0}")]
    MissingBook(Isbn),
    /// No member has this id.
    #[error("member not found: {0}")]
    MissingMember(MemberId),
    /// ISBN already in the catalog.
    #[error("isbn already registered: {0}")]
    DuplicateIsbn(Isbn),
    /// Member id already registered.
    #[error("member id already registered: {0}")]
    DuplicateMember(MemberId),
    /// Book is currently lent out.
    #[error("book is checked out: {0}")]
    BookUnavailable(Isbn),
    /// Member is deactivated.
    #[error("member is inactive: {0}")]
    MemberInactive(MemberId),
    /// Member cannot be removed while holding books.
    #[error("member {member_id} still holds {count} book(s)")]
    MemberHasLoans {
        /// Member that was to be deleted.
        member_id: MemberId,
        /// Books still on loan.
        count: usize,
    },
    /// Member holds no open loan of this book.
    #[error("book {isbn} is not borrowed by {member_id}")]
    NotBorrowedBy {
        /// Book being returned.
        isbn: Isbn,
        /// Member returning it.
        member_id: MemberId,
    },
    /// No book matched a title lookup.
    #[error("no book matches {0:?}")]
    NoMatch(String),
}

/// Serializable copy of the whole library, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreSnapshotV1 {
    /// Catalog.
    pub books: Vec<Book>,
    /// Registered members.
    pub members: Vec<Member>,
    /// Every loan ever made, oldest first.
    pub records: Vec<BorrowRecord>,
}

/// Authoritative in-memory library: catalog, members and loan records.
#[derive(Debug)]
pub struct LibraryStore {
    books: HashMap<Isbn, Book>,
    book_order: Vec<Isbn>,
    members: HashMap<MemberId, Member>,
    member_order: Vec<MemberId>,
    records: Vec<BorrowRecord>,
    by_member: VecIndex<MemberId>,
    pending_mutations: u64,
    clock: Clock,
}

impl Default for LibraryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryStore {
    /// Creates an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(now_ms)
    }

    /// Creates an empty store stamping events with `clock`.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            books: HashMap::new(),
            book_order: Vec::new(),
            members: HashMap::new(),
            member_order: Vec::new(),
            records: Vec::new(),
            by_member: VecIndex::new(),
            pending_mutations: 0,
            clock,
        }
    }

    /// Rebuilds a store from `snapshot` on the system clock.
    pub fn from_snapshot(snapshot: StoreSnapshotV1) -> Result<Self, StoreError> {
        Self::from_snapshot_with_clock(snapshot, now_ms)
    }

    /// Rebuilds a store from `snapshot`, rejecting duplicate ISBNs or member ids.
    pub fn from_snapshot_with_clock(
        snapshot: StoreSnapshotV1,
        clock: Clock,
    ) -> Result<Self, StoreError> {
        let mut store = Self::with_clock(clock);

        for book in snapshot.books {
            if store.books.contains_key(&book.isbn) {
                return Err(StoreError::DuplicateIsbn(book.isbn));
            }
            store.book_order.push(book.isbn.clone());
            store.books.insert(book.isbn.clone(), book);
        }

        for member in snapshot.members {
            if store.members.contains_key(&member.member_id) {
                return Err(StoreError::DuplicateMember(member.member_id));
            }
            store.member_order.push(member.member_id.clone());
            store.members.insert(member.member_id.clone(), member);
        }

        for record in snapshot.records {
            store.push_record(record);
        }

        Ok(store)
    }

    /// Copies the full state out for persistence.
    pub fn export_snapshot(&self) -> StoreSnapshotV1 {
        StoreSnapshotV1 {
            books: self.books_in_order().cloned().collect(),
            members: self.members_in_order().cloned().collect(),
            records: self.records.clone(),
        }
    }

    /// Mutations applied since the last [`Self::mark_committed`].
    pub fn pending_mutations(&self) -> u64 {
        self.pending_mutations
    }

    /// Resets the pending count after a successful save.
    pub fn mark_committed(&mut self) {
        self.pending_mutations = 0;
    }

    /// Current time from the store's clock.
    pub fn now(&self) -> TsMs {
        (self.clock)()
    }

    /// Adds an available book. Refused if the ISBN is taken.
    pub fn add_book(&mut self, draft: BookDraft) -> bool {
        let res = self.try_add_book(draft);
        self.settle("add_book", res)
    }

    /// Registers an active member with no loans. Refused if the id is taken.
    pub fn add_member(&mut self, draft: MemberDraft) -> bool {
        let res = self.try_add_member(draft);
        self.settle("add_member", res)
    }

    /// Overwrites the non-empty fields of `patch`.
    pub fn edit_book(&mut self, isbn: &str, patch: &BookPatch) -> bool {
        let res = match self.books.get_mut(isbn) {
            Some(book) => {
                patch.apply_to(book);
                Ok(())
            }
            None => Err(StoreError::MissingBook(isbn.to_string())),
        };
        self.settle("edit_book", res)
    }

    /// Overwrites the non-empty fields of `patch`.
    pub fn edit_member(&mut self, member_id: &str, patch: &MemberPatch) -> bool {
        let res = match self.members.get_mut(member_id) {
            Some(member) => {
                patch.apply_to(member);
                Ok(())
            }
            None => Err(StoreError::MissingMember(member_id.to_string())),
        };
        self.settle("edit_member", res)
    }

    /// Activates or deactivates a member. Existing loans are untouched.
    pub fn set_member_active(&mut self, member_id: &str, active: bool) -> bool {
        let res = match self.members.get_mut(member_id) {
            Some(member) => {
                member.is_active = active;
                Ok(())
            }
            None => Err(StoreError::MissingMember(member_id.to_string())),
        };
        self.settle("set_member_active", res)
    }

    /// Removes a member holding no books. Their records stay.
    pub fn delete_member(&mut self, member_id: &str) -> bool {
        let res = self.try_delete_member(member_id);
        self.settle("delete_member", res)
    }

    /// Removes a book that is not lent out. Its records stay.
    pub fn delete_book(&mut self, isbn: &str) -> bool {
        let res = self.try_delete_book(isbn);
        self.settle("delete_book", res)
    }

    /// Deletes the first book whose title matches case-insensitively.
    pub fn delete_book_by_title(&mut self, title: &str) -> bool {
        let res = match self.find_book_by_title(title).map(|b| b.isbn.clone()) {
            Some(isbn) => self.try_delete_book(&isbn),
            None => Err(StoreError::NoMatch(title.to_string())),
        };
        self.settle("delete_book_by_title", res)
    }

    /// Deletes the first book matching both author and title case-insensitively.
    pub fn delete_book_by_author_and_title(&mut self, author: &str, title: &str) -> bool {
        let found = self
            .find_book_by_author_and_title(author, title)
            .map(|b| b.isbn.clone());
        let res = match found {
            Some(isbn) => self.try_delete_book(&isbn),
            None => Err(StoreError::NoMatch(format!("{author} / {title}"))),
        };
        self.settle("delete_book_by_author_and_title", res)
    }

    /// Lends an available book to an active member and opens a record.
    pub fn borrow_book(&mut self, isbn: &str, member_id: &str) -> bool {
        let res = self.try_borrow(isbn, member_id);
        self.settle("borrow_book", res)
    }

    /// Closes the member's earliest open record for this book.
    pub fn return_book(&mut self, isbn: &str, member_id: &str) -> bool {
        let res = self.try_return(isbn, member_id);
        self.settle("return_book", res)
    }

    /// Book by ISBN.
    pub fn book(&self, isbn: &str) -> Option<&Book> {
        self.books.get(isbn)
    }

    /// Member by id.
    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.get(member_id)
    }

    /// Whether `member_id` is registered.
    pub fn has_member(&self, member_id: &str) -> bool {
        self.members.contains_key(member_id)
    }

    /// All borrow records, oldest first.
    pub fn records(&self) -> &[BorrowRecord] {
        &self.records
    }

    /// Books in insertion order.
    pub fn books_in_order(&self) -> impl Iterator<Item = &Book> + '_ {
        self.book_order.iter().filter_map(|isbn| self.books.get(isbn))
    }

    /// Members in insertion order.
    pub fn members_in_order(&self) -> impl Iterator<Item = &Member> + '_ {
        self.member_order.iter().filter_map(|id| self.members.get(id))
    }

    /// First book whose title matches case-insensitively.
    pub fn find_book_by_title(&self, title: &str) -> Option<&Book> {
        let title = title.to_lowercase();
        self.books_in_order()
            .find(|b| b.title.to_lowercase() == title)
    }

    /// First book matching both author and title case-insensitively.
    pub fn find_book_by_author_and_title(&self, author: &str, title: &str) -> Option<&Book> {
        let author = author.to_lowercase();
        let title = title.to_lowercase();
        self.books_in_order()
            .find(|b| b.author.to_lowercase() == author && b.title.to_lowercase() == title)
    }

    /// Case-insensitive substring match on title, author or isbn.
    pub fn search_books(&self, query: &str) -> Vec<Book> {
        let query = query.to_lowercase();
        self.books_in_order()
            .filter(|b| {
                b.title.to_lowercase().contains(&query)
                    || b.author.to_lowercase().contains(&query)
                    || b.isbn.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    /// Books on the shelf, in insertion order.
    pub fn available_books(&self) -> Vec<Book> {
        self.books_in_order()
            .filter(|b| b.is_available)
            .cloned()
            .collect()
    }

    /// Books the member holds right now.
    pub fn current_loans(&self, member_id: &str) -> Vec<Book> {
        self.members
            .get(member_id)
            .into_iter()
            .flat_map(|m| m.borrowed_books.iter())
            .filter_map(|isbn| self.books.get(isbn))
            .cloned()
            .collect()
    }

    /// Open loans older than `days_threshold` whole days.
    pub fn get_overdue_books(&self, days_threshold: u64) -> Vec<OverdueEntry> {
        let now = self.now();
        self.records
            .iter()
            .filter(|r| r.is_open())
            .filter_map(|r| {
                let age = r.age_days(now);
                if age <= days_threshold {
                    return None;
                }
                let book = self.books.get(&r.book_isbn)?;
                let member = self.members.get(&r.member_id)?;
                Some(OverdueEntry {
                    book_title: book.title.clone(),
                    book_isbn: book.isbn.clone(),
                    member_name: member.name.clone(),
                    member_id: member.member_id.clone(),
                    days_overdue: age - days_threshold,
                })
            })
            .collect()
    }

    /// Every record of the member, oldest first. Empty for unknown ids.
    pub fn get_member_borrow_history(&self, member_id: &str) -> Vec<HistoryEntry> {
        if !self.members.contains_key(member_id) {
            return Vec::new();
        }
        self.member_records(member_id)
            .map(|r| HistoryEntry {
                book_title: self.books.get(&r.book_isbn).map(|b| b.title.clone()),
                book_isbn: r.book_isbn.clone(),
                borrowed_at: r.borrowed_at,
                returned_at: r.returned_at,
                is_returned: r.returned_at.is_some(),
            })
            .collect()
    }

    /// Every member with their current loan count, in insertion order.
    pub fn get_all_members(&self) -> Vec<MemberSummary> {
        self.members_in_order()
            .map(|m| MemberSummary {
                member_id: m.member_id.clone(),
                name: m.name.clone(),
                contact: m.contact.clone(),
                is_active: m.is_active,
                borrowed_books_count: m.borrowed_books.len(),
            })
            .collect()
    }

    /// Members ranked by total records, at most `limit` of them.
    pub fn get_top_borrowers(&self, limit: usize) -> Vec<TopBorrower> {
        let mut ranked: Vec<TopBorrower> = self
            .members_in_order()
            .map(|m| TopBorrower {
                member_id: m.member_id.clone(),
                name: m.name.clone(),
                total_borrows: self.by_member.get(&m.member_id).map_or(0, Vec::len),
            })
            .collect();
        // Stable, so ties keep member insertion order.
        ranked.sort_by(|a, b| b.total_borrows.cmp(&a.total_borrows));
        ranked.truncate(limit);
        ranked
    }

    /// Catalog and membership totals.
    pub fn get_statistics(&self) -> Statistics {
        let total_books = self.books.len();
        let available_books = self.books.values().filter(|b| b.is_available).count();
        Statistics {
            total_books,
            available_books,
            books_borrowed: total_books - available_books,
            total_members: self.members.len(),
            active_members: self.members.values().filter(|m| m.is_active).count(),
        }
    }

    fn settle(&mut self, op: &'static str, res: Result<(), StoreError>) -> bool {
        match res {
            Ok(()) => {
                self.pending_mutations += 1;
                true
            }
            Err(err) => {
                debug!(op, %err, "operation refused");
                false
            }
        }
    }

    fn try_add_book(&mut self, draft: BookDraft) -> Result<(), StoreError> {
        if self.books.contains_key(&draft.isbn) {
            return Err(StoreError::DuplicateIsbn(draft.isbn));
        }
        let book = draft.into_book();
        self.book_order.push(book.isbn.clone());
        self.books.insert(book.isbn.clone(), book);
        Ok(())
    }

    fn try_add_member(&mut self, draft: MemberDraft) -> Result<(), StoreError> {
        if self.members.contains_key(&draft.member_id) {
            return Err(StoreError::DuplicateMember(draft.member_id));
        }
        let member = draft.into_member();
        self.member_order.push(member.member_id.clone());
        self.members.insert(member.member_id.clone(), member);
        Ok(())
    }

    fn try_delete_member(&mut self, member_id: &str) -> Result<(), StoreError> {
        let member = self
            .members
            .get(member_id)
            .ok_or_else(|| StoreError::MissingMember(member_id.to_string()))?;
        if !member.borrowed_books.is_empty() {
            return Err(StoreError::MemberHasLoans {
                member_id: member_id.to_string(),
                count: member.borrowed_books.len(),
            });
        }
        self.members.remove(member_id);
        self.member_order.retain(|id| id != member_id);
        Ok(())
    }

    fn try_delete_book(&mut self, isbn: &str) -> Result<(), StoreError> {
        let book = self
            .books
            .get(isbn)
            .ok_or_else(|| StoreError::MissingBook(isbn.to_string()))?;
        if !book.is_available {
            return Err(StoreError::BookUnavailable(isbn.to_string()));
        }
        self.books.remove(isbn);
        self.book_order.retain(|i| i != isbn);
        Ok(())
    }

    fn try_borrow(&mut self, isbn: &str, member_id: &str) -> Result<(), StoreError> {
        let now = self.now();
        let book = self
            .books
            .get_mut(isbn)
            .ok_or_else(|| StoreError::MissingBook(isbn.to_string()))?;
        let member = self
            .members
            .get_mut(member_id)
            .ok_or_else(|| StoreError::MissingMember(member_id.to_string()))?;

        if !book.is_available {
            return Err(StoreError::BookUnavailable(isbn.to_string()));
        }
        if !member.is_active {
            return Err(StoreError::MemberInactive(member_id.to_string()));
        }

        book.is_available = false;
        member.borrowed_books.insert(isbn.to_string());
        self.push_record(BorrowRecord {
            book_isbn: isbn.to_string(),
            member_id: member_id.to_string(),
            borrowed_at: now,
            returned_at: None,
        });
        Ok(())
    }

    fn try_return(&mut self, isbn: &str, member_id: &str) -> Result<(), StoreError> {
        if !self.books.contains_key(isbn) {
            return Err(StoreError::MissingBook(isbn.to_string()));
        }
        let member = self
            .members
            .get_mut(member_id)
            .ok_or_else(|| StoreError::MissingMember(member_id.to_string()))?;
        if !member.borrowed_books.remove(isbn) {
            return Err(StoreError::NotBorrowedBy {
                isbn: isbn.to_string(),
                member_id: member_id.to_string(),
            });
        }

        if let Some(book) = self.books.get_mut(isbn) {
            book.is_available = true;
        }

        let now = self.now();
        let earliest_open = self
            .by_member
            .get(member_id)
            .into_iter()
            .flatten()
            .copied()
            .find(|&pos| {
                self.records
                    .get(pos)
                    .is_some_and(|r| r.book_isbn == isbn && r.is_open())
            });
        if let Some(record) = earliest_open.and_then(|pos| self.records.get_mut(pos)) {
            record.returned_at = Some(now);
        }
        Ok(())
    }

    fn member_records<'a>(&'a self, member_id: &str) -> impl Iterator<Item = &'a BorrowRecord> + 'a {
        self.by_member
            .get(member_id)
            .into_iter()
            .flatten()
            .filter_map(|&pos| self.records.get(pos))
    }

    fn push_record(&mut self, record: BorrowRecord) {
        self.by_member
            .entry(record.member_id.clone())
            .or_default()
            .push(self.records.len());
        self.records.push(record);
    }
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_ms() -> TsMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
