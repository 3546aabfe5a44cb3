use std::fmt;

use tracing::{info, warn};

use crate::{
    catalog::{BookDraft, BookPatch, MemberDraft, MemberPatch},
    core::store::{LibraryStore, now_ms},
    persist::{PersistResult, SnapshotSink},
    types::Clock,
};

/// Settings for [`Library::open`].
#[derive(Debug, Clone, Copy)]
pub struct LibraryOptions {
    /// Commit the full snapshot after every successful mutation.
    pub auto_commit: bool,
    /// Clock handed to the store.
    pub clock: Clock,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            auto_commit: true,
            clock: now_ms,
        }
    }
}

/// A [`LibraryStore`] bound to the sink that persists it.
///
/// Mutations return `Ok(false)` when the store refuses them and `Err` only
/// when committing the new state fails.
pub struct Library {
    store: LibraryStore,
    sink: Box<dyn SnapshotSink>,
    auto_commit: bool,
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("store", &self.store)
            .field("sink", &self.sink.describe())
            .field("auto_commit", &self.auto_commit)
            .finish()
    }
}

impl Library {
    /// Loads the stored state, falling back to an empty store when nothing is
    /// stored or the stored state cannot be read.
    pub fn open(mut sink: Box<dyn SnapshotSink>, options: LibraryOptions) -> Self {
        let target = sink.describe();
        let store = match sink.load() {
            Ok(Some(snapshot)) => {
                match LibraryStore::from_snapshot_with_clock(snapshot, options.clock) {
                    Ok(store) => {
                        let stats = store.get_statistics();
                        info!(
                            sink = %target,
                            books = stats.total_books,
                            members = stats.total_members,
                            records = store.records().len(),
                            "library loaded"
                        );
                        store
                    }
                    Err(err) => {
                        warn!(sink = %target, %err, "stored library rejected, starting empty");
                        LibraryStore::with_clock(options.clock)
                    }
                }
            }
            Ok(None) => {
                info!(sink = %target, "no stored library, starting empty");
                LibraryStore::with_clock(options.clock)
            }
            Err(err) => {
                warn!(sink = %target, %err, "failed to load library, starting empty");
                LibraryStore::with_clock(options.clock)
            }
        };

        Self {
            store,
            sink,
            auto_commit: options.auto_commit,
        }
    }

    /// Read access for queries.
    pub fn store(&self) -> &LibraryStore {
        &self.store
    }

    /// Whether each successful mutation is committed immediately.
    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    /// Turns per-mutation commits on or off. Pending changes stay pending.
    pub fn set_auto_commit(&mut self, enabled: bool) {
        self.auto_commit = enabled;
    }

    /// Writes the full snapshot if any mutation is pending.
    pub fn commit(&mut self) -> PersistResult<()> {
        let pending = self.store.pending_mutations();
        if pending == 0 {
            return Ok(());
        }
        let snapshot = self.store.export_snapshot();
        self.sink.save(&snapshot)?;
        self.store.mark_committed();
        info!(sink = %self.sink.describe(), mutations = pending, "library committed");
        Ok(())
    }

    /// See [`LibraryStore::add_book`].
    pub fn add_book(&mut self, draft: BookDraft) -> PersistResult<bool> {
        self.mutate(|s| s.add_book(draft))
    }

    /// See [`LibraryStore::edit_book`].
    pub fn edit_book(&mut self, isbn: &str, patch: &BookPatch) -> PersistResult<bool> {
        self.mutate(|s| s.edit_book(isbn, patch))
    }

    /// See [`LibraryStore::delete_book`].
    pub fn delete_book(&mut self, isbn: &str) -> PersistResult<bool> {
        self.mutate(|s| s.delete_book(isbn))
    }

    /// See [`LibraryStore::delete_book_by_title`].
    pub fn delete_book_by_title(&mut self, title: &str) -> PersistResult<bool> {
        self.mutate(|s| s.delete_book_by_title(title))
    }

    /// See [`LibraryStore::delete_book_by_author_and_title`].
    pub fn delete_book_by_author_and_title(
        &mut self,
        author: &str,
        title: &str,
    ) -> PersistResult<bool> {
        self.mutate(|s| s.delete_book_by_author_and_title(author, title))
    }

    /// See [`LibraryStore::add_member`].
    pub fn add_member(&mut self, draft: MemberDraft) -> PersistResult<bool> {
        self.mutate(|s| s.add_member(draft))
    }

    /// See [`LibraryStore::edit_member`].
    pub fn edit_member(&mut self, member_id: &str, patch: &MemberPatch) -> PersistResult<bool> {
        self.mutate(|s| s.edit_member(member_id, patch))
    }

    /// See [`LibraryStore::set_member_active`].
    pub fn set_member_active(&mut self, member_id: &str, active: bool) -> PersistResult<bool> {
        self.mutate(|s| s.set_member_active(member_id, active))
    }

    /// See [`LibraryStore::delete_member`].
    pub fn delete_member(&mut self, member_id: &str) -> PersistResult<bool> {
        self.mutate(|s| s.delete_member(member_id))
    }

    /// See [`LibraryStore::borrow_book`].
    pub fn borrow_book(&mut self, isbn: &str, member_id: &str) -> PersistResult<bool> {
        self.mutate(|s| s.borrow_book(isbn, member_id))
    }

    /// See [`LibraryStore::return_book`].
    pub fn return_book(&mut self, isbn: &str, member_id: &str) -> PersistResult<bool> {
        self.mutate(|s| s.return_book(isbn, member_id))
    }

    fn mutate(&mut self, op: impl FnOnce(&mut LibraryStore) -> bool) -> PersistResult<bool> {
        let applied = op(&mut self.store);
        if applied && self.auto_commit {
            self.commit()?;
        }
        Ok(applied)
    }
}
