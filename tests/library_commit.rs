use std::{
    io,
    sync::{Arc, Mutex},
};

use tempfile::TempDir;

use circdesk::{
    catalog::{BookDraft, MemberDraft},
    core::store::StoreSnapshotV1,
    persist::{PersistError, PersistResult, SnapshotSink, json::JsonFileSink, sqlite::SqliteSnapshotSink},
    runtime::library::{Library, LibraryOptions},
};

#[derive(Default, Clone)]
struct RecordingSink {
    initial: Option<StoreSnapshotV1>,
    saves: Arc<Mutex<Vec<StoreSnapshotV1>>>,
}

impl SnapshotSink for RecordingSink {
    fn load(&mut self) -> PersistResult<Option<StoreSnapshotV1>> {
        Ok(self.initial.clone())
    }

    fn save(&mut self, snapshot: &StoreSnapshotV1) -> PersistResult<()> {
        self.saves.lock().expect("lock").push(snapshot.clone());
        Ok(())
    }
}

struct BrokenSink;

impl SnapshotSink for BrokenSink {
    fn load(&mut self) -> PersistResult<Option<StoreSnapshotV1>> {
        Err(PersistError::Io(io::Error::other("disk unplugged")))
    }

    fn save(&mut self, _snapshot: &StoreSnapshotV1) -> PersistResult<()> {
        Err(PersistError::Io(io::Error::other("disk unplugged")))
    }
}

#[test]
fn every_successful_mutation_commits_full_state() {
    let sink = RecordingSink::default();
    let saves = sink.saves.clone();
    let mut library = Library::open(Box::new(sink), LibraryOptions::default());

    assert!(library.add_book(BookDraft::new("Dune", "Herbert", "Sci-Fi", "111")).unwrap());
    assert!(!library.add_book(BookDraft::new("Dune", "Herbert", "Sci-Fi", "111")).unwrap());
    assert!(library.add_member(MemberDraft::new("Alice", "M1", "a@x.com")).unwrap());
    assert!(library.borrow_book("111", "M1").unwrap());
    assert!(!library.borrow_book("111", "M1").unwrap());

    let saves = saves.lock().expect("lock");
    assert_eq!(saves.len(), 3);
    let last = saves.last().expect("saved");
    assert_eq!(last, &library.store().export_snapshot());
    assert_eq!(last.records.len(), 1);
}

#[test]
fn deferred_commit_batches_mutations() {
    let sink = RecordingSink::default();
    let saves = sink.saves.clone();
    let mut library = Library::open(
        Box::new(sink),
        LibraryOptions {
            auto_commit: false,
            ..LibraryOptions::default()
        },
    );

    library.add_book(BookDraft::new("Dune", "Herbert", "Sci-Fi", "111")).unwrap();
    library.add_book(BookDraft::new("Emma", "Austen", "Classic", "222")).unwrap();
    assert!(saves.lock().expect("lock").is_empty());
    assert_eq!(library.store().pending_mutations(), 2);

    library.commit().unwrap();
    library.commit().unwrap();
    assert_eq!(saves.lock().expect("lock").len(), 1);
    assert_eq!(library.store().pending_mutations(), 0);
}

#[test]
fn load_failure_starts_empty_but_save_failure_is_fatal() {
    let mut library = Library::open(Box::new(BrokenSink), LibraryOptions::default());
    assert_eq!(library.store().get_statistics().total_books, 0);

    let err = library
        .add_book(BookDraft::new("Dune", "Herbert", "Sci-Fi", "111"))
        .expect_err("save must fail");
    assert!(matches!(err, PersistError::Io(_)));

    // Refused operations never touch the sink.
    assert!(!library.delete_book("404").unwrap());
}

#[test]
fn stored_state_is_loaded_on_open() {
    let mut seed = Library::open(Box::new(RecordingSink::default()), LibraryOptions::default());
    seed.add_member(MemberDraft::new("Alice", "M1", "a@x.com")).unwrap();

    let sink = RecordingSink {
        initial: Some(seed.store().export_snapshot()),
        ..RecordingSink::default()
    };
    let library = Library::open(Box::new(sink), LibraryOptions::default());
    assert!(library.store().has_member("M1"));
}

#[test]
fn reopening_a_sqlite_file_restores_the_library() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("library.db");

    {
        let sink = SqliteSnapshotSink::open(&path).expect("open");
        let mut library = Library::open(Box::new(sink), LibraryOptions::default());
        library.add_book(BookDraft::new("Dune", "Herbert", "Sci-Fi", "111")).unwrap();
        library.add_member(MemberDraft::new("Alice", "M1", "a@x.com")).unwrap();
        library.borrow_book("111", "M1").unwrap();
    }

    let sink = SqliteSnapshotSink::open(&path).expect("reopen");
    let mut library = Library::open(Box::new(sink), LibraryOptions::default());
    assert!(!library.store().book("111").unwrap().is_available);
    assert!(library.return_book("111", "M1").unwrap());
}

#[test]
fn corrupt_json_file_is_treated_as_empty() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("library.json");
    std::fs::write(&path, b"not json at all").expect("write");

    let library = Library::open(Box::new(JsonFileSink::new(&path)), LibraryOptions::default());
    assert_eq!(library.store().get_statistics().total_members, 0);
}
