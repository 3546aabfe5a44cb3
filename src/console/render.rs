//! Text rendering for console views.

use std::io::{self, Write};

use chrono::{DateTime, Utc};

use crate::{
    catalog::Book,
    report::{HistoryEntry, MemberSummary, OverdueEntry, Statistics, TopBorrower},
    types::TsMs,
};

const RULE: &str = "------------------------------";

/// Role selection menu.
pub fn main_menu(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n=== Welcome to Library Management System ===")?;
    writeln!(out, "1. Login as Librarian")?;
    writeln!(out, "2. Login as Member")?;
    writeln!(out, "0. Exit")?;
    writeln!(out, "==========================")
}

/// Librarian actions, numbered 1 to 13.
pub fn librarian_menu(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n=== Librarian Menu ===")?;
    for line in [
        "1. Add Book",
        "2. Edit Book",
        "3. Search Books",
        "4. View Overdue Books",
        "5. View Statistics",
        "6. Delete Book",
        "7. Add Member",
        "8. View All Members",
        "9. Edit Member",
        "10. Activate/Deactivate Member",
        "11. Delete Member",
        "12. View Member History",
        "13. View Top Borrowers",
        "0. Logout",
    ] {
        writeln!(out, "{line}")?;
    }
    writeln!(out, "==========================")
}

/// Delete-by submenu.
pub fn delete_menu(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n=== Delete Book Options ===")?;
    writeln!(out, "1. Delete by ISBN")?;
    writeln!(out, "2. Delete by Title")?;
    writeln!(out, "3. Delete by Author and Title")?;
    writeln!(out, "0. Back to Librarian Menu")?;
    writeln!(out, "==========================")
}

/// Member actions, numbered 1 to 6.
pub fn member_menu(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n=== Library Management System (Member) ===")?;
    writeln!(out, "1. View Available Books")?;
    writeln!(out, "2. Search Books")?;
    writeln!(out, "3. Borrow Book")?;
    writeln!(out, "4. Return Book")?;
    writeln!(out, "5. View My Borrow History")?;
    writeln!(out, "6. View My Current Loans")?;
    writeln!(out, "0. Logout")?;
    writeln!(out, "==========================")
}

/// Formats a millisecond timestamp as UTC, falling back to the raw number.
pub fn format_ts(ts: TsMs) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Book list under `heading`, with availability when `with_status` is set.
pub fn books(out: &mut impl Write, heading: &str, books: &[Book], with_status: bool) -> io::Result<()> {
    writeln!(out, "\n=== {heading} ===")?;
    for book in books {
        writeln!(out, "Title: {}", book.title)?;
        writeln!(out, "Author: {}", book.author)?;
        writeln!(out, "Category: {}", book.category)?;
        writeln!(out, "ISBN: {}", book.isbn)?;
        if with_status {
            let status = if book.is_available { "Available" } else { "Borrowed" };
            writeln!(out, "Status: {status}")?;
        }
        writeln!(out, "{RULE}")?;
    }
    Ok(())
}

/// Librarian overdue report.
pub fn overdue(out: &mut impl Write, entries: &[OverdueEntry]) -> io::Result<()> {
    writeln!(out, "\n=== Overdue Books ===")?;
    for entry in entries {
        writeln!(out, "Title: {}", entry.book_title)?;
        writeln!(out, "ISBN: {}", entry.book_isbn)?;
        writeln!(out, "Member Name: {}", entry.member_name)?;
        writeln!(out, "Member ID: {}", entry.member_id)?;
        writeln!(out, "Days Overdue: {}", entry.days_overdue)?;
        writeln!(out, "{RULE}")?;
    }
    Ok(())
}

/// Overdue warning shown at member login.
pub fn overdue_warning(out: &mut impl Write, entries: &[OverdueEntry]) -> io::Result<()> {
    writeln!(out, "\nWARNING: You have overdue books!")?;
    for entry in entries {
        writeln!(
            out,
            "Book: {} - {} days overdue",
            entry.book_title, entry.days_overdue
        )?;
    }
    writeln!(out, "{RULE}")
}

/// Borrow history rows under `heading`.
pub fn history(out: &mut impl Write, heading: &str, entries: &[HistoryEntry]) -> io::Result<()> {
    writeln!(out, "\n=== {heading} ===")?;
    for entry in entries {
        let title = entry.book_title.as_deref().unwrap_or("(removed from catalog)");
        writeln!(out, "Book Title: {title}")?;
        writeln!(out, "ISBN: {}", entry.book_isbn)?;
        writeln!(out, "Borrowed: {}", format_ts(entry.borrowed_at))?;
        match entry.returned_at {
            Some(ts) => writeln!(out, "Returned: {}", format_ts(ts))?,
            None => writeln!(out, "Status: Not returned yet")?,
        }
        writeln!(out, "{RULE}")?;
    }
    Ok(())
}

/// Member listing with current loan counts.
pub fn members(out: &mut impl Write, members: &[MemberSummary]) -> io::Result<()> {
    writeln!(out, "\n=== All Members ===")?;
    for member in members {
        writeln!(out, "Name: {}", member.name)?;
        writeln!(out, "Member ID: {}", member.member_id)?;
        writeln!(out, "Contact: {}", member.contact)?;
        let status = if member.is_active { "Active" } else { "Inactive" };
        writeln!(out, "Status: {status}")?;
        writeln!(out, "Currently Borrowed Books: {}", member.borrowed_books_count)?;
        writeln!(out, "{RULE}")?;
    }
    Ok(())
}

/// Top borrowers, already ranked.
pub fn top_borrowers(out: &mut impl Write, borrowers: &[TopBorrower]) -> io::Result<()> {
    writeln!(out, "\n=== Top Borrowers ===")?;
    for borrower in borrowers {
        writeln!(out, "Name: {}", borrower.name)?;
        writeln!(out, "Member ID: {}", borrower.member_id)?;
        writeln!(out, "Total Borrows: {}", borrower.total_borrows)?;
        writeln!(out, "{RULE}")?;
    }
    Ok(())
}

/// Catalog and membership totals.
pub fn statistics(out: &mut impl Write, stats: &Statistics) -> io::Result<()> {
    writeln!(out, "\n=== System Statistics ===")?;
    writeln!(out, "Total Books: {}", stats.total_books)?;
    writeln!(out, "Available Books: {}", stats.available_books)?;
    writeln!(out, "Borrowed Books: {}", stats.books_borrowed)?;
    writeln!(out, "Total Members: {}", stats.total_members)?;
    writeln!(out, "Active Members: {}", stats.active_members)
}
