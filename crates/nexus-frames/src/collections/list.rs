//! Versioned list.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use nexus_common::error::{FrameError, FrameResult};

use super::ReadOnlyView;
use crate::frame::Frame;
use crate::observer::{ObjectHandle, ObjectKind};
use crate::value::{FramedObject, FramedValue};

/// A list with isolated, versioned contents.
///
/// Query methods never create a record; every structural method does, even
/// when it ends up changing nothing.
pub struct FramedList<E> {
    value: FramedValue<Arc<Vec<E>>>,
}

impl<E> Clone for FramedList<E> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<E: Clone + Send + Sync + 'static> FramedList<E> {
    /// Creates a list in `frame`.
    pub fn new(frame: &Frame, items: impl IntoIterator<Item = E>) -> FrameResult<Self> {
        let items = Arc::new(items.into_iter().collect());
        Ok(Self {
            value: FramedValue::new_of_kind(frame, items, ObjectKind::List)?,
        })
    }

    /// Creates a list visible to every frame.
    pub fn with_initial(items: impl IntoIterator<Item = E>) -> Self {
        let items = Arc::new(items.into_iter().collect());
        Self {
            value: FramedValue::initial_of_kind(items, ObjectKind::List),
        }
    }

    fn read<R>(&self, frame: &Frame, f: impl FnOnce(&[E]) -> R) -> FrameResult<R> {
        self.value.with_readable(frame, |items| f(items.as_slice()))
    }

    fn mutate<R>(&self, frame: &Frame, f: impl FnOnce(&mut Vec<E>) -> R) -> FrameResult<R> {
        self.value.writable(frame, |items| f(Arc::make_mut(items)))
    }

    /// Validates against the contents `frame` sees before claiming a record,
    /// so a rejected call leaves the frame's modified set untouched.
    fn mutate_checked<R>(
        &self,
        frame: &Frame,
        check: impl FnOnce(usize) -> FrameResult<()>,
        f: impl FnOnce(&mut Vec<E>) -> R,
    ) -> FrameResult<R> {
        self.read(frame, |items| check(items.len()))??;
        self.mutate(frame, f)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the number of elements.
    pub fn len(&self, frame: &Frame) -> FrameResult<usize> {
        self.read(frame, <[E]>::len)
    }

    /// Returns true if the list has no elements.
    pub fn is_empty(&self, frame: &Frame) -> FrameResult<bool> {
        self.read(frame, <[E]>::is_empty)
    }

    /// Returns the element at `index`.
    pub fn get(&self, frame: &Frame, index: usize) -> FrameResult<Option<E>> {
        self.read(frame, |items| items.get(index).cloned())
    }

    /// Returns the first element.
    pub fn first(&self, frame: &Frame) -> FrameResult<Option<E>> {
        self.read(frame, |items| items.first().cloned())
    }

    /// Returns the last element.
    pub fn last(&self, frame: &Frame) -> FrameResult<Option<E>> {
        self.read(frame, |items| items.last().cloned())
    }

    /// Returns a copy of the elements in `range`.
    ///
    /// # Errors
    ///
    /// Fails with [`FrameError::IndexOutOfBounds`] if `range` is out of
    /// bounds.
    pub fn slice(&self, frame: &Frame, range: Range<usize>) -> FrameResult<Vec<E>> {
        self.read(frame, |items| -> FrameResult<Vec<E>> {
            check_range(&range, items.len())?;
            Ok(items[range].to_vec())
        })?
    }

    /// Returns a copy of all elements.
    pub fn to_vec(&self, frame: &Frame) -> FrameResult<Vec<E>> {
        self.read(frame, <[E]>::to_vec)
    }

    /// Returns a read-only view of the contents `frame` sees.
    pub fn view(&self, frame: &Frame) -> FrameResult<ListView<E>> {
        self.value
            .with_readable(frame, |items| ListView::new(Arc::clone(items)))
    }

    /// Iterates the contents `frame` sees.
    pub fn iter(&self, frame: &Frame) -> FrameResult<ListIter<E>> {
        self.iter_from(frame, 0)
    }

    /// Iterates the contents `frame` sees, starting at `index`.
    pub fn iter_from(&self, frame: &Frame, index: usize) -> FrameResult<ListIter<E>> {
        self.value
            .with_readable(frame, |items| ListIter::new(Arc::clone(items), index))
    }

    // =========================================================================
    // Structural Mutations
    // =========================================================================

    /// Appends an element.
    pub fn push(&self, frame: &Frame, item: E) -> FrameResult<()> {
        self.mutate(frame, |items| items.push(item))
    }

    /// Inserts an element at `index`.
    ///
    /// # Errors
    ///
    /// Fails with [`FrameError::IndexOutOfBounds`] if `index > len`.
    pub fn insert(&self, frame: &Frame, index: usize, item: E) -> FrameResult<()> {
        self.mutate_checked(
            frame,
            |len| check_position(index, len),
            |items| items.insert(index, item),
        )
    }

    /// Appends all `items`.
    pub fn extend(&self, frame: &Frame, new_items: impl IntoIterator<Item = E>) -> FrameResult<()> {
        self.mutate(frame, |items| items.extend(new_items))
    }

    /// Inserts all `items` at `index`, keeping their order.
    ///
    /// # Errors
    ///
    /// Fails with [`FrameError::IndexOutOfBounds`] if `index > len`.
    pub fn insert_all(
        &self,
        frame: &Frame,
        index: usize,
        new_items: impl IntoIterator<Item = E>,
    ) -> FrameResult<()> {
        self.mutate_checked(
            frame,
            |len| check_position(index, len),
            |items| {
                items.splice(index..index, new_items);
            },
        )
    }

    /// Replaces the element at `index`. Returns the previous element, or
    /// `None` if `index` is out of bounds.
    pub fn set(&self, frame: &Frame, index: usize, item: E) -> FrameResult<Option<E>> {
        self.mutate(frame, |items| {
            items
                .get_mut(index)
                .map(|slot| std::mem::replace(slot, item))
        })
    }

    /// Removes and returns the element at `index`, or `None` if `index` is
    /// out of bounds.
    pub fn remove_at(&self, frame: &Frame, index: usize) -> FrameResult<Option<E>> {
        self.mutate(frame, |items| (index < items.len()).then(|| items.remove(index)))
    }

    /// Removes all elements and returns them.
    pub fn clear(&self, frame: &Frame) -> FrameResult<Vec<E>> {
        self.mutate(frame, std::mem::take)
    }

    /// Keeps the elements matching `keep`. Returns true if any was removed.
    pub fn retain(&self, frame: &Frame, mut keep: impl FnMut(&E) -> bool) -> FrameResult<bool> {
        self.mutate(frame, |items| {
            let before = items.len();
            items.retain(|item| keep(item));
            items.len() != before
        })
    }

    /// Runs `f` on the elements in `range` as a sub-list and splices the
    /// result back in place.
    ///
    /// # Errors
    ///
    /// Fails with [`FrameError::IndexOutOfBounds`] if `range` is out of
    /// bounds.
    pub fn sub_list_mut<R>(
        &self,
        frame: &Frame,
        range: Range<usize>,
        f: impl FnOnce(&mut Vec<E>) -> R,
    ) -> FrameResult<R> {
        let bounds = range.clone();
        self.mutate_checked(frame, |len| check_range(&bounds, len), |items| {
            let start = range.start;
            let mut sub: Vec<E> = items.drain(range).collect();
            let result = f(&mut sub);
            items.splice(start..start, sub);
            result
        })
    }
}

impl<E: Clone + PartialEq + Send + Sync + 'static> FramedList<E> {
    /// Returns true if the list contains `item`.
    pub fn contains(&self, frame: &Frame, item: &E) -> FrameResult<bool> {
        self.read(frame, |items| items.contains(item))
    }

    /// Returns true if the list contains every element of `wanted`.
    pub fn contains_all(&self, frame: &Frame, wanted: &[E]) -> FrameResult<bool> {
        self.read(frame, |items| wanted.iter().all(|item| items.contains(item)))
    }

    /// Returns the index of the first occurrence of `item`.
    pub fn index_of(&self, frame: &Frame, item: &E) -> FrameResult<Option<usize>> {
        self.read(frame, |items| items.iter().position(|e| e == item))
    }

    /// Returns the index of the last occurrence of `item`.
    pub fn last_index_of(&self, frame: &Frame, item: &E) -> FrameResult<Option<usize>> {
        self.read(frame, |items| items.iter().rposition(|e| e == item))
    }

    /// Removes the first occurrence of `item`. Returns true if found.
    pub fn remove(&self, frame: &Frame, item: &E) -> FrameResult<bool> {
        self.mutate(frame, |items| match items.iter().position(|e| e == item) {
            Some(index) => {
                items.remove(index);
                true
            }
            None => false,
        })
    }

    /// Removes every element contained in `unwanted`. Returns true if any
    /// was removed.
    pub fn remove_all(&self, frame: &Frame, unwanted: &[E]) -> FrameResult<bool> {
        self.retain(frame, |item| !unwanted.contains(item))
    }

    /// Removes every element not contained in `wanted`. Returns true if any
    /// was removed.
    pub fn retain_all(&self, frame: &Frame, wanted: &[E]) -> FrameResult<bool> {
        self.retain(frame, |item| wanted.contains(item))
    }
}

/// Accepts insertion positions `0..=len`.
fn check_position(index: usize, len: usize) -> FrameResult<()> {
    if index > len {
        return Err(FrameError::IndexOutOfBounds { index, len });
    }
    Ok(())
}

fn check_range(range: &Range<usize>, len: usize) -> FrameResult<()> {
    if range.start > range.end {
        return Err(FrameError::IndexOutOfBounds {
            index: range.start,
            len,
        });
    }
    check_position(range.end, len)
}

impl<E> FramedObject for FramedList<E> {
    fn handle(&self) -> ObjectHandle {
        self.value.handle()
    }
}

impl<E> PartialEq for FramedList<E> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<E> Eq for FramedList<E> {}

impl<E> fmt::Debug for FramedList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramedList")
            .field("id", &self.value.handle().id())
            .finish()
    }
}

/// A read-only snapshot of a [`FramedList`].
#[derive(Clone)]
pub struct ListView<E> {
    items: Arc<Vec<E>>,
}

impl<E> ListView<E> {
    fn new(items: Arc<Vec<E>>) -> Self {
        Self { items }
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the view has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the element at `index`.
    pub fn get(&self, index: usize) -> Option<&E> {
        self.items.get(index)
    }

    /// Returns the elements as a slice.
    pub fn as_slice(&self) -> &[E] {
        &self.items
    }

    /// Iterates the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.items.iter()
    }

    /// Rejects replacing an element.
    pub fn set(&mut self, _index: usize, _item: E) -> FrameResult<E> {
        Err(FrameError::view_mutation("set"))
    }

    /// Rejects inserting an element.
    pub fn insert(&mut self, _index: usize, _item: E) -> FrameResult<()> {
        Err(FrameError::view_mutation("insert"))
    }

    /// Rejects removing by position.
    pub fn remove_at(&mut self, _index: usize) -> FrameResult<E> {
        Err(FrameError::view_mutation("remove_at"))
    }
}

impl<E> ReadOnlyView for ListView<E> {
    type Item = E;
}

impl<'a, E> IntoIterator for &'a ListView<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<E: fmt::Debug> fmt::Debug for ListView<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

/// A positional iterator over a snapshot of a [`FramedList`].
pub struct ListIter<E> {
    items: Arc<Vec<E>>,
    front: usize,
    back: usize,
}

impl<E> ListIter<E> {
    fn new(items: Arc<Vec<E>>, start: usize) -> Self {
        let back = items.len();
        Self {
            items,
            front: start.min(back),
            back,
        }
    }

    /// Returns the index of the element the next call to `next` yields.
    pub fn next_index(&self) -> usize {
        self.front
    }

    /// Rejects removing the last yielded element.
    pub fn remove(&mut self) -> FrameResult<()> {
        Err(FrameError::view_mutation("remove"))
    }

    /// Rejects replacing the last yielded element.
    pub fn set(&mut self, _item: E) -> FrameResult<()> {
        Err(FrameError::view_mutation("set"))
    }

    /// Rejects inserting at the cursor.
    pub fn add(&mut self, _item: E) -> FrameResult<()> {
        Err(FrameError::view_mutation("add"))
    }
}

impl<E: Clone> Iterator for ListIter<E> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        if self.front >= self.back {
            return None;
        }
        let item = self.items[self.front].clone();
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<E: Clone> DoubleEndedIterator for ListIter<E> {
    fn next_back(&mut self) -> Option<E> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.items[self.back].clone())
    }
}

impl<E: Clone> ExactSizeIterator for ListIter<E> {}
