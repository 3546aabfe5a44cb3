use std::io::{BufRead, Write};

use crate::catalog::{BookDraft, BookPatch, MemberDraft, MemberPatch};

use super::{Console, ConsoleError, render};

impl<R: BufRead, W: Write> Console<'_, R, W> {
    pub(super) fn librarian_session(&mut self) -> Result<(), ConsoleError> {
        loop {
            render::librarian_menu(&mut self.out)?;
            match self.prompt("Please select an option: ")?.as_str() {
                "1" => self.add_book()?,
                "2" => self.edit_book()?,
                "3" => self.search()?,
                "4" => self.list_overdue()?,
                "5" => {
                    let stats = self.library.store().get_statistics();
                    render::statistics(&mut self.out, &stats)?;
                }
                "6" => self.delete_book_menu()?,
                "7" => self.add_member()?,
                "8" => {
                    let members = self.library.store().get_all_members();
                    if members.is_empty() {
                        self.say("No members registered.")?;
                    } else {
                        render::members(&mut self.out, &members)?;
                    }
                }
                "9" => self.edit_member()?,
                "10" => self.toggle_member()?,
                "11" => {
                    let member_id = self.prompt("Enter member ID to delete: ")?;
                    if self.library.delete_member(&member_id)? {
                        self.say("Member deleted successfully.")?;
                    } else {
                        self.say("Error: Cannot delete member. They might have borrowed books or not exist.")?;
                    }
                }
                "12" => {
                    let member_id = self.prompt("Enter member ID: ")?;
                    self.show_history(&member_id, "Borrow History")?;
                }
                "13" => {
                    let top = self
                        .library
                        .store()
                        .get_top_borrowers(self.settings.top_borrowers_limit);
                    if top.is_empty() {
                        self.say("No borrowing history available.")?;
                    } else {
                        render::top_borrowers(&mut self.out, &top)?;
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

    fn add_book(&mut self) -> Result<(), ConsoleError> {
        let title = self.prompt("Book title: ")?;
        let author = self.prompt("Author: ")?;
        let category = self.prompt("Category: ")?;
        let isbn = self.prompt("ISBN number: ")?;
        if self
            .library
            .add_book(BookDraft::new(title, author, category, isbn))?
        {
            self.say("Book added successfully.")
        } else {
            self.say("Error: This ISBN is already registered.")
        }
    }

    fn edit_book(&mut self) -> Result<(), ConsoleError> {
        let isbn = self.prompt("Book ISBN to edit: ")?;
        let patch = BookPatch {
            title: self.prompt_optional("New title (press Enter to skip): ")?,
            author: self.prompt_optional("New author (press Enter to skip): ")?,
            category: self.prompt_optional("New category (press Enter to skip): ")?,
        };
        if self.library.edit_book(&isbn, &patch)? {
            self.say("Book information updated successfully.")
        } else {
            self.say("Error: Book not found.")
        }
    }

    fn list_overdue(&mut self) -> Result<(), ConsoleError> {
        let overdue = self
            .library
            .store()
            .get_overdue_books(self.settings.overdue_threshold_days);
        if overdue.is_empty() {
            self.say("No overdue books.")
        } else {
            render::overdue(&mut self.out, &overdue)?;
            Ok(())
        }
    }

    fn delete_book_menu(&mut self) -> Result<(), ConsoleError> {
        loop {
            render::delete_menu(&mut self.out)?;
            let deleted = match self.prompt("Please select a delete option: ")?.as_str() {
                "1" => {
                    let isbn = self.prompt("Enter book ISBN to delete: ")?;
                    self.library.delete_book(&isbn)?
                }
                "2" => {
                    let title = self.prompt("Enter book title to delete: ")?;
                    self.library.delete_book_by_title(&title)?
                }
                "3" => {
                    let author = self.prompt("Enter book author: ")?;
                    let title = self.prompt("Enter book title: ")?;
                    self.library.delete_book_by_author_and_title(&author, &title)?
                }
                "0" => return Ok(()),
                _ => {
                    self.say("Invalid option. Please try again.")?;
                    continue;
                }
            };
            return if deleted {
                self.say("Book deleted successfully.")
            } else {
                self.say("Error: Book cannot be deleted. It might be borrowed or not exist.")
            };
        }
    }

    fn add_member(&mut self) -> Result<(), ConsoleError> {
        let name = self.prompt("Member name: ")?;
        let member_id = self.prompt("Member ID: ")?;
        let contact = self.prompt("Contact: ")?;
        if self
            .library
            .add_member(MemberDraft::new(name, member_id, contact))?
        {
            self.say("Member added successfully.")
        } else {
            self.say("Error: This member ID is already registered.")
        }
    }

    fn edit_member(&mut self) -> Result<(), ConsoleError> {
        let member_id = self.prompt("Enter member ID to edit: ")?;
        let patch = MemberPatch {
            name: self.prompt_optional("Enter new name (press Enter to skip): ")?,
            contact: self.prompt_optional("Enter new contact (press Enter to skip): ")?,
        };
        if self.library.edit_member(&member_id, &patch)? {
            self.say("Member information updated successfully.")
        } else {
            self.say("Error: Member not found.")
        }
    }

    fn toggle_member(&mut self) -> Result<(), ConsoleError> {
        let member_id = self.prompt("Enter member ID: ")?;
        let active = match self
            .prompt("Activate (a) or deactivate (d)? ")?
            .to_lowercase()
            .as_str()
        {
            "a" => true,
            "d" => false,
            _ => return self.say("Invalid option. Please try again."),
        };
        if self.library.set_member_active(&member_id, active)? {
            self.say("Member status updated.")
        } else {
            self.say("Error: Member not found.")
        }
    }
}
