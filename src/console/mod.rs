//! Interactive text menus for the librarian and member roles.

/// Librarian password check and member login.
pub mod access;
mod librarian;
mod member;
/// Plain-text rendering of menus and query results.
pub mod render;

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::{config::LibraryConfig, persist::PersistError, runtime::library::Library};

pub use access::AccessGate;

/// Reasons a console session stops early.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Reading input or writing output failed.
    #[error("console io: {0}")]
    Io(#[from] io::Error),
    /// A commit could not be written to storage.
    #[error("failed to persist library: {0}")]
    Persist(#[from] PersistError),
    /// Input closed while a prompt was waiting.
    #[error("end of input")]
    EndOfInput,
}

/// Values the menus need from [`LibraryConfig`].
#[derive(Debug, Clone)]
pub struct ConsoleSettings {
    /// Login checks for both roles.
    pub gate: AccessGate,
    /// Loan age in days after which a book counts as overdue.
    pub overdue_threshold_days: u64,
    /// Rows shown in the top borrowers view.
    pub top_borrowers_limit: usize,
}

impl From<&LibraryConfig> for ConsoleSettings {
    fn from(config: &LibraryConfig) -> Self {
        Self {
            gate: AccessGate::new(config.librarian_password.clone()),
            overdue_threshold_days: config.overdue_threshold_days,
            top_borrowers_limit: config.top_borrowers_limit,
        }
    }
}

/// Menu-driven session over a [`Library`], reading `R` and writing `W`.
pub struct Console<'a, R, W> {
    library: &'a mut Library,
    settings: ConsoleSettings,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    /// Wraps `library` for a session; nothing is read until [`Console::run`].
    pub fn new(library: &'a mut Library, settings: ConsoleSettings, input: R, out: W) -> Self {
        Self {
            library,
            settings,
            input,
            out,
        }
    }

    /// Runs the role selection loop until `0` or end of input, then commits
    /// anything still pending.
    pub fn run(&mut self) -> Result<(), ConsoleError> {
        match self.role_loop() {
            Ok(()) | Err(ConsoleError::EndOfInput) => {}
            Err(err) => return Err(err),
        }
        self.library.commit()?;
        self.out.flush()?;
        Ok(())
    }

    fn role_loop(&mut self) -> Result<(), ConsoleError> {
        loop {
            render::main_menu(&mut self.out)?;
            match self.prompt("Please select your role: ")?.as_str() {
                "1" => {
                    let password = self.prompt("Enter librarian password: ")?;
                    if self.settings.gate.admits_librarian(&password) {
                        self.librarian_session()?;
                    } else {
                        self.say("Incorrect password. Access denied.")?;
                    }
                }
                "2" => {
                    let member_id = self.prompt("Please enter your Member ID: ")?;
                    if self
                        .settings
                        .gate
                        .admits_member(self.library.store(), &member_id)
                    {
                        self.member_session(&member_id)?;
                    } else {
                        self.say("Error: Invalid Member ID")?;
                    }
                }
                "0" => {
                    self.say("Goodbye!")?;
                    return Ok(());
                }
                _ => self.say("Invalid option. Please try again.")?,
            }
        }
    }

    fn prompt(&mut self, label: &str) -> Result<String, ConsoleError> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ConsoleError::EndOfInput);
        }
        Ok(line.trim().to_string())
    }

    /// Prompt whose empty answer means "leave unchanged".
    fn prompt_optional(&mut self, label: &str) -> Result<Option<String>, ConsoleError> {
        let answer = self.prompt(label)?;
        Ok((!answer.is_empty()).then_some(answer))
    }

    fn say(&mut self, message: &str) -> Result<(), ConsoleError> {
        writeln!(self.out, "{message}")?;
        Ok(())
    }
}
