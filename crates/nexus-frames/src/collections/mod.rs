//! Versioned collection adapters.
//!
//! [`FramedList`] and [`FramedMap`] keep their contents behind an `Arc` in a
//! single [`FramedValue`](crate::FramedValue). Reads borrow the record the
//! frame sees and never claim a record of their own. The first structural
//! mutation in a frame claims a frame-tagged record and
//! [`Arc::make_mut`](std::sync::Arc::make_mut) gives it a private copy of the
//! contents.
//!
//! Views and iterators hold a snapshot of the contents. Their mutation
//! methods exist so callers get an error instead of a silent no-op: each one
//! fails with [`FrameError::ViewMutation`] and leaves the collection
//! untouched. Only the adapter's own methods mutate.

mod list;
mod map;

pub use list::{FramedList, ListIter, ListView};
pub use map::{EntriesView, FramedMap, KeysView, MapView, ValuesView};

use nexus_common::error::{FrameError, FrameResult};

/// Mutation entry points of a read-only collection view.
///
/// All methods fail with [`FrameError::ViewMutation`].
pub trait ReadOnlyView {
    /// Element type of the view.
    type Item;

    /// Rejects adding an element.
    fn add(&mut self, _item: Self::Item) -> FrameResult<bool> {
        Err(FrameError::view_mutation("add"))
    }

    /// Rejects adding elements.
    fn add_all(&mut self, _items: impl IntoIterator<Item = Self::Item>) -> FrameResult<bool> {
        Err(FrameError::view_mutation("add_all"))
    }

    /// Rejects removing an element.
    fn remove(&mut self, _item: &Self::Item) -> FrameResult<bool> {
        Err(FrameError::view_mutation("remove"))
    }

    /// Rejects removing elements.
    fn remove_all(&mut self, _items: &[Self::Item]) -> FrameResult<bool> {
        Err(FrameError::view_mutation("remove_all"))
    }

    /// Rejects retaining elements.
    fn retain_all(&mut self, _items: &[Self::Item]) -> FrameResult<bool> {
        Err(FrameError::view_mutation("retain_all"))
    }

    /// Rejects clearing.
    fn clear(&mut self) -> FrameResult<()> {
        Err(FrameError::view_mutation("clear"))
    }
}
