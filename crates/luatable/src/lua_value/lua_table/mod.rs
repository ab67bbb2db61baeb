// LuaTable - hybrid array/map table
// - Array part for integer keys [1..top_index]
// - Hash part (hashbrown + ahash) for every other key
//
// Invariant: the array part holds exactly the maximal contiguous prefix 1..n.
// No key in 1..=n+1 ever lives in the hash part, so top_index() == array.len().
mod display;
mod flatten;

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use ahash::RandomState;
use smol_str::SmolStr;

use super::{FromLua, LuaValue, normalize_key};
use crate::activity::Activity;
use crate::lua_error::{LuaError, LuaResult};

type HashPart = hashbrown::HashMap<LuaValue, LuaValue, RandomState>;

/// Seeds for the per-entry hasher behind `Hash for LuaTable`.
/// Fixed so that equal tables hash alike no matter which table is asked.
const ENTRY_HASH_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

#[derive(Clone, Default)]
pub struct LuaTable {
    /// Array part: values for integer keys [1..array.len()]
    pub(crate) array: Vec<LuaValue>,

    /// Hash part: everything outside the contiguous prefix
    pub(crate) hash: HashPart,
}

impl LuaTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with room for `asize` sequential and `hsize` keyed entries
    pub fn with_capacity(asize: usize, hsize: usize) -> Self {
        LuaTable {
            array: Vec::with_capacity(asize),
            hash: HashPart::with_capacity_and_hasher(hsize, RandomState::new()),
        }
    }

    /// Build a sequence: values get keys 1..N in order
    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<LuaValue>,
    {
        LuaTable {
            array: values.into_iter().map(Into::into).collect(),
            hash: HashPart::default(),
        }
    }

    /// Same as [`from_values`](Self::from_values), for a borrowed slice
    pub fn from_array<V>(values: &[V]) -> Self
    where
        V: Clone + Into<LuaValue>,
    {
        Self::from_values(values.iter().cloned())
    }

    /// Build a table from arbitrary key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> LuaResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<LuaValue>,
        V: Into<LuaValue>,
    {
        let mut table = LuaTable::new();
        for (key, value) in pairs {
            table.update(key, value)?;
        }
        Ok(table)
    }

    /// Length of the contiguous array prefix
    #[inline(always)]
    pub fn top_index(&self) -> usize {
        self.array.len()
    }

    /// Total number of entries, array part and hash part together
    #[inline]
    pub fn len(&self) -> usize {
        self.array.len() + self.hash.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.array.is_empty() && self.hash.is_empty()
    }

    /// The contiguous prefix as a slice; index 0 holds key 1
    #[inline]
    pub fn array(&self) -> &[LuaValue] {
        &self.array
    }

    // ============ Lookup ============

    /// Fast integer key access - O(1) for the array part
    #[inline(always)]
    pub fn get_int(&self, key: i64) -> Option<&LuaValue> {
        if key >= 1 && key <= self.array.len() as i64 {
            return Some(&self.array[(key - 1) as usize]);
        }
        if self.hash.is_empty() {
            return None;
        }
        self.hash.get(&LuaValue::Integer(key))
    }

    /// String key access without building a LuaValue first
    #[inline]
    pub fn get_str(&self, key: &str) -> Option<&LuaValue> {
        self.hash.get(&LuaValue::String(SmolStr::new(key)))
    }

    /// Generic key access; never fails
    pub fn get(&self, key: &LuaValue) -> Option<&LuaValue> {
        if let Some(i) = key.as_integer() {
            return self.get_int(i);
        }
        self.hash.get(key)
    }

    #[inline]
    pub fn contains(&self, key: &LuaValue) -> bool {
        self.get(key).is_some()
    }

    /// Direct access; an absent key is an error
    pub fn index(&self, key: &LuaValue) -> LuaResult<&LuaValue> {
        self.get(key).ok_or_else(|| LuaError::key_not_found(key))
    }

    /// Typed probe: `Ok(None)` when absent, `TypeMismatch` when present with another type
    pub fn get_as<T: FromLua>(&self, key: &LuaValue) -> LuaResult<Option<T>> {
        self.get(key).map(T::from_lua).transpose()
    }

    /// Typed direct access
    pub fn index_as<T: FromLua>(&self, key: &LuaValue) -> LuaResult<T> {
        T::from_lua(self.index(key)?)
    }

    /// Mutable access to an existing value. Cannot add or remove keys.
    pub fn get_mut(&mut self, key: &LuaValue) -> Option<&mut LuaValue> {
        if let Some(i) = key.as_integer() {
            if i >= 1 && i <= self.array.len() as i64 {
                return Some(&mut self.array[(i - 1) as usize]);
            }
            return self.hash.get_mut(&LuaValue::Integer(i));
        }
        self.hash.get_mut(key)
    }

    /// Mutable access to a nested table; a shared child is copied first
    pub fn get_table_mut(&mut self, key: &LuaValue) -> LuaResult<&mut LuaTable> {
        match self.get_mut(key) {
            Some(LuaValue::Table(t)) => Ok(Rc::make_mut(t)),
            Some(other) => Err(LuaError::TypeMismatch {
                expected: "table",
                found: other.type_name(),
            }),
            None => Err(LuaError::key_not_found(key)),
        }
    }

    // ============ Update ============

    /// Insert or overwrite. Writing key top_index+1 grows the prefix and
    /// absorbs any higher keys that were waiting past the gap.
    pub fn update<K, V>(&mut self, key: K, value: V) -> LuaResult<()>
    where
        K: Into<LuaValue>,
        V: Into<LuaValue>,
    {
        match normalize_key(key.into())? {
            LuaValue::Integer(i) => self.set_int(i, value),
            key => {
                self.hash.insert(key, value.into());
            }
        }
        Ok(())
    }

    /// Fast integer key write
    pub fn set_int(&mut self, key: i64, value: impl Into<LuaValue>) {
        let value = value.into();
        let len = self.array.len() as i64;
        if key >= 1 && key <= len {
            self.array[(key - 1) as usize] = value;
        } else if key == len + 1 {
            self.array.push(value);
            self.migrate_hash_to_array();
        } else {
            self.hash.insert(LuaValue::Integer(key), value);
        }
    }

    /// Fast string key write
    pub fn set_str(&mut self, key: &str, value: impl Into<LuaValue>) {
        self.hash.insert(LuaValue::String(SmolStr::new(key)), value.into());
    }

    /// Append to the contiguous prefix
    #[inline]
    pub fn insert(&mut self, value: impl Into<LuaValue>) {
        let next = self.array.len() as i64 + 1;
        self.set_int(next, value);
    }

    /// Insert at a position, shifting `index..=top_index` up by one.
    /// Past the prefix this is a plain `update`.
    pub fn insert_at(&mut self, index: i64, value: impl Into<LuaValue>) -> LuaResult<()> {
        if index <= 0 {
            return Err(LuaError::precondition(format!(
                "insert position must be positive, got {}",
                index
            )));
        }

        if index <= self.array.len() as i64 {
            self.array.insert((index - 1) as usize, value.into());
            // The shift filled top_index+1, so waiting keys may join the prefix
            self.migrate_hash_to_array();
        } else {
            self.set_int(index, value);
        }
        Ok(())
    }

    /// Move keys top_index+1, top_index+2, ... from the hash part into the array
    fn migrate_hash_to_array(&mut self) {
        while !self.hash.is_empty() {
            let next = LuaValue::Integer(self.array.len() as i64 + 1);
            match self.hash.remove(&next) {
                Some(value) => self.array.push(value),
                None => break,
            }
        }
    }

    // ============ Remove ============

    /// Array-style remove. Inside the prefix the tail shifts down by one;
    /// past it the key is removed without shifting.
    pub fn remove_at(&mut self, index: i64) -> LuaResult<Option<LuaValue>> {
        if index <= 0 {
            return Err(LuaError::precondition(format!(
                "remove position must be positive, got {}",
                index
            )));
        }

        if index <= self.array.len() as i64 {
            return Ok(Some(self.array.remove((index - 1) as usize)));
        }
        Ok(self.hash.remove(&LuaValue::Integer(index)))
    }

    /// Remove the last element of the prefix
    #[inline]
    pub fn remove(&mut self) -> Option<LuaValue> {
        self.array.pop()
    }

    /// Map-style remove: nothing shifts. Removing a key inside the prefix cuts
    /// the prefix there and the elements after it move to the hash part.
    pub fn remove_key(&mut self, key: &LuaValue) -> Option<LuaValue> {
        let Some(i) = key.as_integer() else {
            return self.hash.remove(key);
        };

        if i >= 1 && i <= self.array.len() as i64 {
            let tail = self.array.split_off(i as usize);
            let removed = self.array.pop();
            self.migrate_array_to_hash(i + 1, tail);
            return removed;
        }
        self.hash.remove(&LuaValue::Integer(i))
    }

    fn migrate_array_to_hash(&mut self, first_key: i64, tail: Vec<LuaValue>) {
        self.hash.reserve(tail.len());
        for (offset, value) in tail.into_iter().enumerate() {
            self.hash
                .insert(LuaValue::Integer(first_key + offset as i64), value);
        }
    }

    // ============ Merge ============

    /// Merge named fields from `other`. Every key of `other` must be a string;
    /// otherwise nothing is merged.
    pub fn add(&mut self, other: &LuaTable) -> LuaResult<()> {
        if let Some((key, _)) = other.iter().find(|(key, _)| !key.is_string()) {
            return Err(LuaError::precondition(format!(
                "add expects string keys only, found {} key {}",
                key.type_name(),
                key
            )));
        }

        self.hash.reserve(other.hash.len());
        for (key, value) in &other.hash {
            self.hash.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    // ============ Iteration ============

    /// All entries: the array part in order, then the hash part in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (LuaValue, &LuaValue)> + '_ {
        self.array
            .iter()
            .enumerate()
            .map(|(i, value)| (LuaValue::Integer(i as i64 + 1), value))
            .chain(self.hash.iter().map(|(key, value)| (key.clone(), value)))
    }

    pub fn keys(&self) -> impl Iterator<Item = LuaValue> + '_ {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &LuaValue> + '_ {
        self.array.iter().chain(self.hash.values())
    }

    /// Order-independent digest of the entries.
    /// Each entry is hashed on its own and the results are summed.
    fn content_hash(&self) -> u64 {
        let [k0, k1, k2, k3] = ENTRY_HASH_SEEDS;
        let builder = RandomState::with_seeds(k0, k1, k2, k3);
        self.iter().fold(0u64, |acc, (key, value)| {
            acc.wrapping_add(builder.hash_one((&key, value)))
        })
    }
}

impl PartialEq for LuaTable {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.len() != other.len() {
            return false;
        }

        self.array
            .iter()
            .enumerate()
            .all(|(i, value)| other.get_int(i as i64 + 1) == Some(value))
            && self
                .hash
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl Eq for LuaTable {}

impl Hash for LuaTable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        state.write_u64(self.content_hash());
    }
}

impl Activity for LuaTable {}

impl<V: Into<LuaValue>> FromIterator<V> for LuaTable {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

impl<V: Into<LuaValue>> Extend<V> for LuaTable {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}
