//! Change-tracking relation containers.
//!
//! Each container behaves like an ordinary collection for reads while
//! intercepting every mutator to maintain per-element [`Status`] plus a
//! record of elements removed since the last canonicalization. The
//! orchestrator drives them exclusively through [`Relation`]:
//! [`Relation::diff`] to generate rows, [`Relation::canonicalize`] after a
//! confirmed commit, [`Relation::repopulate`] when loading from storage.

mod list;
mod map;
mod ordered;
mod set;

pub use list::RelationList;
pub use map::RelationMap;
pub use ordered::RelationOrderedList;
pub use set::RelationSet;

use crate::error::CoreResult;
use crate::status::Status;

/// The shared contract of the four relation container kinds.
///
/// `Elem` is the element identity the diff speaks in: the stored value for
/// lists and sets, the `(key, value)` pair for maps, and the
/// `(position, value)` pair for the ordered list.
pub trait Relation {
    /// The diff element type.
    type Elem: Clone;

    /// Enumerates `(element, status)` pairs.
    ///
    /// All pending-deletion entries come first (status
    /// [`Status::Deleted`]), then all live entries, in a repeatable order;
    /// no element appears twice. Re-iterating without an intervening
    /// mutation reproduces the same sequence.
    fn diff(&self) -> Vec<(Self::Elem, Status)>;

    /// Marks every live element [`Status::Saved`] and clears all pending
    /// deletion/modification history.
    ///
    /// Idempotent: a second call with no intervening mutation is a no-op.
    /// Called by the orchestrator after a confirmed commit, never
    /// speculatively.
    fn canonicalize(&mut self);

    /// Adds an element as already-persisted ([`Status::Saved`]).
    ///
    /// Used when reconstructing an entity from storage; never marks the
    /// element `New`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DirtyRepopulate`] unless the container is
    /// clean, and [`CoreError::DuplicateElement`] where the element would
    /// collide with one already present.
    ///
    /// [`CoreError::DirtyRepopulate`]: crate::error::CoreError::DirtyRepopulate
    /// [`CoreError::DuplicateElement`]: crate::error::CoreError::DuplicateElement
    fn repopulate(&mut self, elem: Self::Elem) -> CoreResult<()>;

    /// Returns the number of entries the next sync would touch: pending
    /// deletions plus live elements whose status is not `Saved`.
    fn unsaved_entries(&self) -> usize;

    /// Returns `true` if the container has no pending deletions and every
    /// live element is `Saved`.
    fn is_clean(&self) -> bool {
        self.unsaved_entries() == 0
    }
}
