//! Versioned map.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use nexus_common::error::{FrameError, FrameResult};

use super::ReadOnlyView;
use crate::frame::Frame;
use crate::observer::{ObjectHandle, ObjectKind};
use crate::value::{FramedObject, FramedValue};

/// A hash map with isolated, versioned contents.
pub struct FramedMap<K, V> {
    value: FramedValue<Arc<HashMap<K, V>>>,
}

impl<K, V> Clone for FramedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<K, V> FramedMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a map in `frame`.
    pub fn new(frame: &Frame, entries: impl IntoIterator<Item = (K, V)>) -> FrameResult<Self> {
        let entries = Arc::new(entries.into_iter().collect());
        Ok(Self {
            value: FramedValue::new_of_kind(frame, entries, ObjectKind::Map)?,
        })
    }

    /// Creates a map visible to every frame.
    pub fn with_initial(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        let entries = Arc::new(entries.into_iter().collect());
        Self {
            value: FramedValue::initial_of_kind(entries, ObjectKind::Map),
        }
    }

    fn read<R>(&self, frame: &Frame, f: impl FnOnce(&HashMap<K, V>) -> R) -> FrameResult<R> {
        self.value.with_readable(frame, |map| f(map))
    }

    fn mutate<R>(&self, frame: &Frame, f: impl FnOnce(&mut HashMap<K, V>) -> R) -> FrameResult<R> {
        self.value.writable(frame, |map| f(Arc::make_mut(map)))
    }

    fn snapshot(&self, frame: &Frame) -> FrameResult<Arc<HashMap<K, V>>> {
        self.value.with_readable(frame, Arc::clone)
    }

    /// Returns the number of entries.
    pub fn len(&self, frame: &Frame) -> FrameResult<usize> {
        self.read(frame, HashMap::len)
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self, frame: &Frame) -> FrameResult<bool> {
        self.read(frame, HashMap::is_empty)
    }

    /// Returns true if the map contains `key`.
    pub fn contains_key(&self, frame: &Frame, key: &K) -> FrameResult<bool> {
        self.read(frame, |map| map.contains_key(key))
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, frame: &Frame, key: &K) -> FrameResult<Option<V>> {
        self.read(frame, |map| map.get(key).cloned())
    }

    /// Returns a copy of all entries.
    pub fn to_hash_map(&self, frame: &Frame) -> FrameResult<HashMap<K, V>> {
        self.read(frame, HashMap::clone)
    }

    /// Returns a read-only view of the map `frame` sees.
    pub fn view(&self, frame: &Frame) -> FrameResult<MapView<K, V>> {
        Ok(MapView {
            map: self.snapshot(frame)?,
        })
    }

    /// Returns a read-only view of the entries `frame` sees.
    pub fn entries(&self, frame: &Frame) -> FrameResult<EntriesView<K, V>> {
        Ok(EntriesView {
            map: self.snapshot(frame)?,
        })
    }

    /// Returns a read-only view of the keys `frame` sees.
    pub fn keys(&self, frame: &Frame) -> FrameResult<KeysView<K, V>> {
        Ok(KeysView {
            map: self.snapshot(frame)?,
        })
    }

    /// Returns a read-only view of the values `frame` sees.
    pub fn values(&self, frame: &Frame) -> FrameResult<ValuesView<K, V>> {
        Ok(ValuesView {
            map: self.snapshot(frame)?,
        })
    }

    /// Stores `value` under `key`. Returns the previous value.
    pub fn insert(&self, frame: &Frame, key: K, value: V) -> FrameResult<Option<V>> {
        self.mutate(frame, |map| map.insert(key, value))
    }

    /// Stores every entry of `entries`.
    pub fn extend(&self, frame: &Frame, entries: impl IntoIterator<Item = (K, V)>) -> FrameResult<()> {
        self.mutate(frame, |map| map.extend(entries))
    }

    /// Removes `key`. Returns the value it held.
    pub fn remove(&self, frame: &Frame, key: &K) -> FrameResult<Option<V>> {
        self.mutate(frame, |map| map.remove(key))
    }

    /// Keeps the entries matching `keep`. Returns true if any was removed.
    pub fn retain(&self, frame: &Frame, mut keep: impl FnMut(&K, &V) -> bool) -> FrameResult<bool> {
        self.mutate(frame, |map| {
            let before = map.len();
            map.retain(|k, v| keep(k, v));
            map.len() != before
        })
    }

    /// Removes every entry.
    pub fn clear(&self, frame: &Frame) -> FrameResult<()> {
        self.mutate(frame, HashMap::clear)
    }
}

impl<K, V> FramedMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + PartialEq + Send + Sync + 'static,
{
    /// Returns true if any entry holds `value`.
    pub fn contains_value(&self, frame: &Frame, value: &V) -> FrameResult<bool> {
        self.read(frame, |map| map.values().any(|v| v == value))
    }
}

impl<K, V> FramedObject for FramedMap<K, V> {
    fn handle(&self) -> ObjectHandle {
        self.value.handle()
    }
}

impl<K, V> PartialEq for FramedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K, V> Eq for FramedMap<K, V> {}

impl<K, V> fmt::Debug for FramedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramedMap")
            .field("id", &self.value.handle().id())
            .finish()
    }
}

/// A read-only snapshot of a [`FramedMap`].
#[derive(Clone)]
pub struct MapView<K, V> {
    map: Arc<HashMap<K, V>>,
}

impl<K: Eq + Hash, V> MapView<K, V> {
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the view has no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Returns true if the view contains `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Iterates the entries.
    pub fn iter(&self) -> std::collections::hash_map::Iter<'_, K, V> {
        self.map.iter()
    }

    /// Rejects storing an entry.
    pub fn insert(&mut self, _key: K, _value: V) -> FrameResult<Option<V>> {
        Err(FrameError::view_mutation("insert"))
    }

    /// Rejects removing an entry.
    pub fn remove(&mut self, _key: &K) -> FrameResult<Option<V>> {
        Err(FrameError::view_mutation("remove"))
    }

    /// Rejects clearing.
    pub fn clear(&mut self) -> FrameResult<()> {
        Err(FrameError::view_mutation("clear"))
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for MapView<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

/// A read-only view of the entries of a [`FramedMap`].
#[derive(Clone)]
pub struct EntriesView<K, V> {
    map: Arc<HashMap<K, V>>,
}

impl<K: Eq + Hash, V: PartialEq> EntriesView<K, V> {
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the view has no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns true if `key` maps to `value`.
    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.map.get(key) == Some(value)
    }

    /// Iterates the entries.
    pub fn iter(&self) -> std::collections::hash_map::Iter<'_, K, V> {
        self.map.iter()
    }
}

impl<K, V> ReadOnlyView for EntriesView<K, V> {
    type Item = (K, V);
}

/// A read-only view of the keys of a [`FramedMap`].
#[derive(Clone)]
pub struct KeysView<K, V> {
    map: Arc<HashMap<K, V>>,
}

impl<K: Eq + Hash, V> KeysView<K, V> {
    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the view has no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns true if the view contains `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Iterates the keys.
    pub fn iter(&self) -> std::collections::hash_map::Keys<'_, K, V> {
        self.map.keys()
    }
}

impl<K, V> ReadOnlyView for KeysView<K, V> {
    type Item = K;
}

/// A read-only view of the values of a [`FramedMap`].
#[derive(Clone)]
pub struct ValuesView<K, V> {
    map: Arc<HashMap<K, V>>,
}

impl<K, V: PartialEq> ValuesView<K, V> {
    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the view has no values.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns true if any entry holds `value`.
    pub fn contains(&self, value: &V) -> bool {
        self.map.values().any(|v| v == value)
    }

    /// Iterates the values.
    pub fn iter(&self) -> std::collections::hash_map::Values<'_, K, V> {
        self.map.values()
    }
}

impl<K, V> ReadOnlyView for ValuesView<K, V> {
    type Item = V;
}
