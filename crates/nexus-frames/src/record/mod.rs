//! Versioned record chains.
//!
//! Every framed value owns one chain of records. Each record holds one
//! historical value of the field, tagged with the id of the frame that
//! wrote it. Records live in a per-value arena and are linked newest-first
//! through arena indices.
//!
//! # Chain Structure
//!
//! ```text
//! FramedValue "street"
//! ┌──────────────────────────────────────────────┐
//! │ head ─▶ [2] frame: 9   "456 New Street"     │
//! │              ↓                              │
//! │         [1] frame: 0   "abandoned write"    │  (aborted, reusable)
//! │              ↓                              │
//! │         [0] frame: 1   "123 Any Street"     │  (genesis)
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The record a frame reads is the highest-tagged record the frame's
//! snapshot considers visible (see [`FrameSnapshot::is_visible`]). Chain
//! position does not matter for selection, which lets a reused record keep
//! its place in the chain while carrying a newer tag.

use std::fmt;

use nexus_common::types::FrameId;

use crate::frame::FrameSnapshot;

/// Index of a record inside its chain's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordIndex(usize);

impl RecordIndex {
    /// Returns the raw arena position.
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for RecordIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A single historical value of a field.
#[derive(Debug, Clone)]
pub struct VersionedRecord<T> {
    /// Frame that wrote this record.
    frame_id: FrameId,
    /// Next older record in the chain.
    next: Option<RecordIndex>,
    /// The value.
    value: T,
}

impl<T> VersionedRecord<T> {
    /// Returns the tag of the frame that produced this record.
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Returns the next older record, if any.
    pub fn next(&self) -> Option<RecordIndex> {
        self.next
    }

    /// Returns the stored value.
    pub fn value(&self) -> &T {
        &self.value
    }
}

/// The outcome of claiming a writable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// A new record was allocated and prepended.
    Created(RecordIndex),
    /// An obsolete record was overwritten in place.
    Reused(RecordIndex),
}

impl Claim {
    /// Returns the claimed record.
    pub fn index(self) -> RecordIndex {
        match self {
            Claim::Created(index) | Claim::Reused(index) => index,
        }
    }
}

/// A newest-first chain of versioned records for one field.
///
/// The chain is never empty: it is created with its initial record.
#[derive(Debug, Clone)]
pub struct RecordChain<T> {
    /// Arena of all records ever allocated for the field.
    records: Vec<VersionedRecord<T>>,
    /// Newest record.
    head: RecordIndex,
}

impl<T> RecordChain<T> {
    /// Creates a chain holding a single initial record.
    pub fn new(frame_id: FrameId, value: T) -> Self {
        Self {
            records: vec![VersionedRecord {
                frame_id,
                next: None,
                value,
            }],
            head: RecordIndex(0),
        }
    }

    /// Returns the number of records in the chain.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; a chain holds at least its initial record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the newest record.
    pub fn first(&self) -> &VersionedRecord<T> {
        &self.records[self.head.0]
    }

    /// Returns the record at `index`.
    pub fn record(&self, index: RecordIndex) -> &VersionedRecord<T> {
        &self.records[index.0]
    }

    /// Returns the value of the record at `index` for in-place mutation.
    pub fn value_mut(&mut self, index: RecordIndex) -> &mut T {
        &mut self.records[index.0].value
    }

    /// Iterates records from newest to oldest.
    pub fn iter(&self) -> ChainIter<'_, T> {
        ChainIter {
            chain: self,
            next: Some(self.head),
        }
    }

    /// Returns the frame tags of all records, newest first.
    pub fn tags(&self) -> Vec<FrameId> {
        self.iter().map(|(_, record)| record.frame_id).collect()
    }

    /// Links a new record at the head of the chain.
    pub fn prepend(&mut self, frame_id: FrameId, value: T) -> RecordIndex {
        let index = RecordIndex(self.records.len());
        self.records.push(VersionedRecord {
            frame_id,
            next: Some(self.head),
            value,
        });
        self.head = index;
        index
    }

    /// Selects the record visible to `snapshot`: the highest-tagged record
    /// the snapshot considers visible.
    pub fn readable(&self, snapshot: &FrameSnapshot) -> Option<RecordIndex> {
        let mut candidate: Option<(RecordIndex, FrameId)> = None;
        for (index, record) in self.iter() {
            if !snapshot.is_visible(record.frame_id) {
                continue;
            }
            match candidate {
                Some((_, best)) if best >= record.frame_id => {}
                _ => candidate = Some((index, record.frame_id)),
            }
        }
        candidate.map(|(index, _)| index)
    }

    /// Finds the record tagged with `frame_id`, if one exists.
    pub fn find_tagged(&self, frame_id: FrameId) -> Option<RecordIndex> {
        self.iter()
            .find(|(_, record)| record.frame_id == frame_id)
            .map(|(index, _)| index)
    }

    /// Finds a record no open or future frame can select.
    ///
    /// Records tagged `INVALID` belong to aborted frames and are always
    /// reusable. Records tagged below `limit` were committed before every
    /// open frame's snapshot was taken; when two of them exist the lower
    /// one is obscured by the higher one for every reader.
    pub fn reusable(&self, limit: FrameId) -> Option<RecordIndex> {
        let mut obscuring: Option<(RecordIndex, FrameId)> = None;
        for (index, record) in self.iter() {
            let tag = record.frame_id;
            if !tag.is_valid() {
                return Some(index);
            }
            if tag >= limit {
                continue;
            }
            match obscuring {
                None => obscuring = Some((index, tag)),
                Some((other, other_tag)) => {
                    return Some(if tag < other_tag { index } else { other });
                }
            }
        }
        None
    }

    /// Overwrites the record at `index` with a new tag and value.
    pub fn overwrite(&mut self, index: RecordIndex, frame_id: FrameId, value: T) {
        let record = &mut self.records[index.0];
        record.frame_id = frame_id;
        record.value = value;
    }

    /// Obtains a record tagged `frame_id` holding `value`, reusing an
    /// obsolete record when `reuse_limit` is given and one exists.
    pub fn claim(&mut self, frame_id: FrameId, value: T, reuse_limit: Option<FrameId>) -> Claim {
        if let Some(index) = reuse_limit.and_then(|limit| self.reusable(limit)) {
            self.overwrite(index, frame_id, value);
            return Claim::Reused(index);
        }
        Claim::Created(self.prepend(frame_id, value))
    }

    /// Retags every record tagged `from` with `to`. Returns the count.
    pub fn retag(&mut self, from: FrameId, to: FrameId) -> usize {
        let mut count = 0;
        for record in &mut self.records {
            if record.frame_id == from {
                record.frame_id = to;
                count += 1;
            }
        }
        count
    }
}

/// Newest-first iterator over a record chain.
pub struct ChainIter<'a, T> {
    chain: &'a RecordChain<T>,
    next: Option<RecordIndex>,
}

impl<'a, T> Iterator for ChainIter<'a, T> {
    type Item = (RecordIndex, &'a VersionedRecord<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        let record = &self.chain.records[index.0];
        self.next = record.next;
        Some((index, record))
    }
}
