use std::cell::Cell;

use circdesk::{
    catalog::{BookDraft, BookPatch, BorrowRecord, MemberDraft, MemberPatch},
    core::store::{LibraryStore, StoreSnapshotV1},
    report::Statistics,
    types::MS_PER_DAY,
};

thread_local! {
    static NOW: Cell<u64> = const { Cell::new(1_700_000_000_000) };
}

fn fake_now() -> u64 {
    NOW.with(Cell::get)
}

fn advance(ms: u64) {
    NOW.with(|now| now.set(now.get() + ms));
}

fn book(title: &str, author: &str, isbn: &str) -> BookDraft {
    BookDraft::new(title, author, "Fiction", isbn)
}

fn member(name: &str, id: &str) -> MemberDraft {
    MemberDraft::new(name, id, format!("{id}@example.org"))
}

fn open_records(store: &LibraryStore, isbn: &str, member_id: &str) -> usize {
    store
        .records()
        .iter()
        .filter(|r| r.book_isbn == isbn && r.member_id == member_id && r.is_open())
        .count()
}

#[test]
fn dune_scenario_round_trip() {
    let mut store = LibraryStore::new();

    assert!(store.add_book(BookDraft::new("Dune", "Herbert", "Sci-Fi", "111")));
    assert!(!store.add_book(BookDraft::new("Dune", "Herbert", "Sci-Fi", "111")));
    assert!(!store.borrow_book("111", "M1"));
    assert!(store.add_member(MemberDraft::new("Alice", "M1", "a@x.com")));
    assert!(store.borrow_book("111", "M1"));
    assert!(!store.borrow_book("111", "M1"));
    assert!(store.return_book("111", "M1"));
    assert!(store.get_overdue_books(0).is_empty());

    assert_eq!(
        store.get_statistics(),
        Statistics {
            total_books: 1,
            available_books: 1,
            books_borrowed: 0,
            total_members: 1,
            active_members: 1,
        }
    );
}

#[test]
fn borrow_marks_book_member_and_opens_one_record() {
    let mut store = LibraryStore::new();
    store.add_book(book("Emma", "Austen", "200"));
    store.add_member(member("Bob", "M2"));

    assert!(store.borrow_book("200", "M2"));

    assert!(!store.book("200").unwrap().is_available);
    assert!(store.member("M2").unwrap().borrowed_books.contains("200"));
    assert_eq!(open_records(&store, "200", "M2"), 1);
    assert_eq!(store.current_loans("M2").len(), 1);
    assert!(store.available_books().is_empty());
}

#[test]
fn return_requires_an_active_loan_and_closes_it() {
    let mut store = LibraryStore::with_clock(fake_now);
    store.add_book(book("Emma", "Austen", "200"));
    store.add_member(member("Bob", "M2"));
    store.add_member(member("Cat", "M3"));

    assert!(!store.return_book("200", "M2"));
    assert!(store.borrow_book("200", "M2"));
    assert!(!store.return_book("200", "M3"));
    assert!(!store.return_book("999", "M2"));

    advance(3 * MS_PER_DAY);
    assert!(store.return_book("200", "M2"));

    assert!(store.book("200").unwrap().is_available);
    assert!(store.member("M2").unwrap().borrowed_books.is_empty());
    assert_eq!(open_records(&store, "200", "M2"), 0);
    let record = &store.records()[0];
    assert_eq!(record.returned_at, Some(record.borrowed_at + 3 * MS_PER_DAY));
}

#[test]
fn return_closes_the_earliest_open_record() {
    let open = |at| BorrowRecord {
        book_isbn: "1".to_string(),
        member_id: "M1".to_string(),
        borrowed_at: at,
        returned_at: None,
    };
    let mut snapshot = StoreSnapshotV1::default();
    let mut store = LibraryStore::new();
    store.add_book(book("A", "X", "1"));
    store.add_member(member("Ann", "M1"));
    store.borrow_book("1", "M1");
    let base = store.export_snapshot();
    snapshot.books = base.books;
    snapshot.members = base.members;
    snapshot.records = vec![open(10), open(20)];

    let mut store = LibraryStore::from_snapshot(snapshot).unwrap();
    assert!(store.return_book("1", "M1"));

    assert!(store.records()[0].returned_at.is_some());
    assert!(store.records()[1].returned_at.is_none());
}

#[test]
fn delete_member_blocked_by_outstanding_loans() {
    let mut store = LibraryStore::new();
    store.add_book(book("Emma", "Austen", "200"));
    store.add_member(member("Bob", "M2"));
    store.borrow_book("200", "M2");

    assert!(!store.delete_member("M2"));
    assert!(!store.delete_member("nobody"));
    store.return_book("200", "M2");
    assert!(store.delete_member("M2"));
    assert!(!store.has_member("M2"));
    assert!(store.get_all_members().is_empty());
}

#[test]
fn delete_book_blocked_while_borrowed() {
    let mut store = LibraryStore::new();
    store.add_book(book("Emma", "Austen", "200"));
    store.add_member(member("Bob", "M2"));
    store.borrow_book("200", "M2");

    assert!(!store.delete_book("200"));
    assert!(!store.delete_book("404"));
    store.return_book("200", "M2");
    assert!(store.delete_book("200"));
    assert!(store.book("200").is_none());
    assert_eq!(store.get_statistics().total_books, 0);
}

#[test]
fn delete_by_title_is_case_insensitive_and_first_match_wins() {
    let mut store = LibraryStore::new();
    store.add_book(book("Persuasion", "Austen", "1"));
    store.add_book(book("persuasion", "Someone Else", "2"));
    store.add_book(book("Emma", "Austen", "3"));

    assert!(store.delete_book_by_title("PERSUASION"));
    assert!(store.book("1").is_none());
    assert!(store.book("2").is_some());

    assert!(!store.delete_book_by_author_and_title("austen", "persuasion"));
    assert!(store.delete_book_by_author_and_title("someone else", "Persuasion"));
    assert!(!store.delete_book_by_title("missing"));
    assert_eq!(store.books_in_order().count(), 1);
}

#[test]
fn edits_apply_only_non_empty_fields() {
    let mut store = LibraryStore::new();
    store.add_book(book("Emma", "Austen", "200"));
    store.add_member(member("Bob", "M2"));

    assert!(store.edit_member(
        "M2",
        &MemberPatch {
            name: Some("Robert".to_string()),
            contact: Some(String::new()),
        }
    ));
    let m = store.member("M2").unwrap();
    assert_eq!(m.name, "Robert");
    assert_eq!(m.contact, "M2@example.org");
    assert!(!store.edit_member("M9", &MemberPatch::default()));

    assert!(store.edit_book(
        "200",
        &BookPatch {
            category: Some("Classics".to_string()),
            ..BookPatch::default()
        }
    ));
    let b = store.book("200").unwrap();
    assert_eq!((b.title.as_str(), b.category.as_str()), ("Emma", "Classics"));
    assert!(!store.edit_book("404", &BookPatch::default()));
}

#[test]
fn inactive_members_cannot_borrow() {
    let mut store = LibraryStore::new();
    store.add_book(book("Emma", "Austen", "200"));
    store.add_member(member("Bob", "M2"));

    assert!(store.set_member_active("M2", false));
    assert!(!store.borrow_book("200", "M2"));
    assert_eq!(store.get_statistics().active_members, 0);

    assert!(store.set_member_active("M2", true));
    assert!(store.borrow_book("200", "M2"));
    assert!(!store.set_member_active("M404", true));
}

#[test]
fn search_matches_title_author_or_isbn_case_insensitively() {
    let mut store = LibraryStore::new();
    store.add_book(book("The Hobbit", "Tolkien", "978-0261"));
    store.add_book(book("Dune", "Frank Herbert", "441-172"));
    store.add_book(book("Emma", "Austen", "0141"));

    let titles = |q: &str| -> Vec<String> {
        store.search_books(q).into_iter().map(|b| b.title).collect()
    };
    assert_eq!(titles("hobb"), vec!["The Hobbit"]);
    assert_eq!(titles("HERBERT"), vec!["Dune"]);
    assert_eq!(titles("0141"), vec!["Emma"]);
    assert_eq!(titles("e").len(), 3);
    assert!(titles("zzz").is_empty());
}

#[test]
fn overdue_counts_whole_days_past_threshold() {
    let mut store = LibraryStore::with_clock(fake_now);
    store.add_book(book("Emma", "Austen", "200"));
    store.add_book(book("Dune", "Herbert", "111"));
    store.add_member(member("Bob", "M2"));
    store.borrow_book("200", "M2");

    advance(14 * MS_PER_DAY + MS_PER_DAY / 2);
    assert!(store.get_overdue_books(14).is_empty());

    store.borrow_book("111", "M2");
    advance(6 * MS_PER_DAY);

    let overdue = store.get_overdue_books(14);
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].book_isbn, "200");
    assert_eq!(overdue[0].member_name, "Bob");
    assert_eq!(overdue[0].days_overdue, 6);

    assert_eq!(store.get_overdue_books(0).len(), 2);
    store.return_book("200", "M2");
    assert_eq!(store.get_overdue_books(0).len(), 1);
}

#[test]
fn history_keeps_records_of_deleted_books() {
    let mut store = LibraryStore::with_clock(fake_now);
    store.add_book(book("Emma", "Austen", "200"));
    store.add_book(book("Dune", "Herbert", "111"));
    store.add_member(member("Bob", "M2"));

    store.borrow_book("200", "M2");
    advance(MS_PER_DAY);
    store.return_book("200", "M2");
    store.borrow_book("111", "M2");
    store.delete_book("200");

    let history = store.get_member_borrow_history("M2");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].book_title, None);
    assert_eq!(history[0].book_isbn, "200");
    assert!(history[0].is_returned);
    assert_eq!(history[1].book_title.as_deref(), Some("Dune"));
    assert!(!history[1].is_returned);

    assert!(store.get_member_borrow_history("M404").is_empty());
}

#[test]
fn top_borrowers_rank_by_total_records_with_stable_ties() {
    let mut store = LibraryStore::new();
    for i in 0..4 {
        store.add_book(book(&format!("B{i}"), "A", &i.to_string()));
    }
    for id in ["M1", "M2", "M3"] {
        store.add_member(member(id, id));
    }

    for _ in 0..2 {
        store.borrow_book("0", "M2");
        store.return_book("0", "M2");
    }
    store.borrow_book("1", "M3");
    store.borrow_book("2", "M1");

    let top = store.get_top_borrowers(5);
    let ids: Vec<_> = top.iter().map(|t| t.member_id.as_str()).collect();
    assert_eq!(ids, vec!["M2", "M1", "M3"]);
    assert_eq!(top[0].total_borrows, 2);

    assert_eq!(store.get_top_borrowers(1).len(), 1);
}

#[test]
fn member_listing_reports_current_loan_counts() {
    let mut store = LibraryStore::new();
    store.add_book(book("Emma", "Austen", "200"));
    store.add_member(member("Bob", "M2"));
    store.add_member(member("Cat", "M3"));
    store.borrow_book("200", "M3");

    let listing = store.get_all_members();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].member_id, "M2");
    assert_eq!(listing[0].borrowed_books_count, 0);
    assert_eq!(listing[1].borrowed_books_count, 1);
}

#[test]
fn only_successful_mutations_are_pending() {
    let mut store = LibraryStore::new();
    assert!(store.add_book(book("Emma", "Austen", "200")));
    assert!(!store.add_book(book("Emma", "Austen", "200")));
    assert!(!store.delete_member("M404"));
    assert_eq!(store.pending_mutations(), 1);

    store.mark_committed();
    assert_eq!(store.pending_mutations(), 0);
}
