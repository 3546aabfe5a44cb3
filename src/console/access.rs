use std::fmt;

use crate::core::store::LibraryStore;

/// Role gate in front of the console menus. Cosmetic, not a security boundary.
#[derive(Clone)]
pub struct AccessGate {
    librarian_password: String,
}

impl fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGate")
            .field("librarian_password", &"<redacted>")
            .finish()
    }
}

impl AccessGate {
    /// Gate checking the librarian menu against `librarian_password`.
    pub fn new(librarian_password: impl Into<String>) -> Self {
        Self {
            librarian_password: librarian_password.into(),
        }
    }

    /// Compares the entered password, ignoring surrounding whitespace.
    pub fn admits_librarian(&self, entered: &str) -> bool {
        entered.trim() == self.librarian_password
    }

    /// Members only need an id that exists in the store.
    pub fn admits_member(&self, store: &LibraryStore, member_id: &str) -> bool {
        store.has_member(member_id.trim())
    }
}
