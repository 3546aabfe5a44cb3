use std::io::{BufRead, Write};

use super::{Console, ConsoleError, render};

impl<R: BufRead, W: Write> Console<'_, R, W> {
    pub(super) fn member_session(&mut self, member_id: &str) -> Result<(), ConsoleError> {
        let mine: Vec<_> = self
            .library
            .store()
            .get_overdue_books(self.settings.overdue_threshold_days)
            .into_iter()
            .filter(|e| e.member_id == member_id)
            .collect();
        if !mine.is_empty() {
            render::overdue_warning(&mut self.out, &mine)?;
        }

        loop {
            render::member_menu(&mut self.out)?;
            match self.prompt("Please select an option: ")?.as_str() {
                "1" => {
                    let books = self.library.store().available_books();
                    if books.is_empty() {
                        self.say("No books available for borrowing.")?;
                    } else {
                        render::books(&mut self.out, "Available Books", &books, false)?;
                    }
                }
                "2" => self.search()?,
                "3" => {
                    let isbn = self.prompt("Book ISBN: ")?;
                    if self.library.borrow_book(&isbn, member_id)? {
                        self.say("Book borrowed successfully.")?;
                    } else {
                        self.say("Error: Cannot borrow the book.")?;
                    }
                }
                "4" => {
                    let isbn = self.prompt("Book ISBN: ")?;
                    if self.library.return_book(&isbn, member_id)? {
                        self.say("Book returned successfully.")?;
                    } else {
                        self.say("Error: Cannot return the book.")?;
                    }
                }
                "5" => self.show_history(member_id, "Your Borrow History")?,
                "6" => {
                    let loans = self.library.store().current_loans(member_id);
                    if loans.is_empty() {
                        self.say("You have no books checked out.")?;
                    } else {
                        render::books(&mut self.out, "Your Current Loans", &loans, false)?;
                    }
                }
                "0" => {
                    self.say("Logged out.")?;
                    return Ok(());
                }
                _ => self.say("Invalid option. Please try again.")?,
            }
        }
    }

    /// Shared by both roles.
    pub(super) fn search(&mut self) -> Result<(), ConsoleError> {
        let query = self.prompt("Search term (title, author or ISBN): ")?;
        let results = self.library.store().search_books(&query);
        if results.is_empty() {
            self.say("No books found.")
        } else {
            render::books(&mut self.out, "Search Results", &results, true)?;
            Ok(())
        }
    }

    pub(super) fn show_history(&mut self, member_id: &str, heading: &str) -> Result<(), ConsoleError> {
        let history = self.library.store().get_member_borrow_history(member_id);
        if history.is_empty() {
            self.say("No borrow history found.")
        } else {
            render::history(&mut self.out, heading, &history)?;
            Ok(())
        }
    }
}
