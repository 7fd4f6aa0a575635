//! Per-element sync status.

use std::fmt;

/// The sync state of one relation element relative to the last
/// canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Added since the last canonicalization; not yet in the store.
    New,
    /// Unchanged since the last canonicalization.
    Saved,
    /// Present at the last canonicalization, removed since.
    Deleted,
    /// Overwritten or repositioned since the last canonicalization.
    ///
    /// Only the positionally-ordered container produces this state.
    Modified,
}

impl Status {
    /// Returns `true` unless the element is [`Status::Saved`].
    #[must_use]
    pub fn is_unsaved(self) -> bool {
        self != Self::Saved
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "new",
            Self::Saved => "saved",
            Self::Deleted => "deleted",
            Self::Modified => "modified",
        };
        f.write_str(name)
    }
}
