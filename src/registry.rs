//! Name/id cache shared by resource accessors.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::Error;
use crate::response;

type Result<T> = std::result::Result<T, Error>;

/// Identifies a resource either by numeric id or by its (case-sensitive) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Id(u32),
    Name(String),
}

impl From<u32> for ResourceKey {
    fn from(id: u32) -> Self {
        ResourceKey::Id(id)
    }
}

impl From<&str> for ResourceKey {
    fn from(name: &str) -> Self {
        ResourceKey::Name(name.to_string())
    }
}

impl From<String> for ResourceKey {
    fn from(name: String) -> Self {
        ResourceKey::Name(name)
    }
}

impl From<&ResourceKey> for ResourceKey {
    fn from(key: &ResourceKey) -> Self {
        key.clone()
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Id(id) => write!(f, "{}", id),
            ResourceKey::Name(name) => write!(f, "{}", name),
        }
    }
}

/// How a resource collection is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionMode {
    /// A list in ascending id order.
    #[default]
    List,
    /// A map keyed by id.
    ById,
    /// A map keyed by name.
    ByName,
}

/// Ids and names of the resources seen so far.
///
/// Filled on first enumeration and only changed afterwards by renames,
/// creations and deletions made through this library.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    by_id: BTreeMap<u32, String>,
    by_name: HashMap<String, u32>,
}

pub(crate) type SharedRegistry = Arc<Mutex<Registry>>;

/// Lock a shared registry, taking over a poisoned lock.
pub(crate) fn lock(registry: &SharedRegistry) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A resource collection in the shape asked for with [`CollectionMode`].
#[derive(Debug, Clone)]
pub enum Collection<T> {
    List(Vec<T>),
    ById(BTreeMap<u32, T>),
    ByName(HashMap<String, T>),
}

impl<T> Collection<T> {
    /// Items in no particular order (ascending id for `List` and `ById`).
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Collection::List(items) => items,
            Collection::ById(items) => items.into_values().collect(),
            Collection::ByName(items) => items.into_values().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Collection::List(items) => items.len(),
            Collection::ById(items) => items.len(),
            Collection::ByName(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decode a `{"<id>": {...}}` listing into a map keyed by numeric id.
pub(crate) fn parse_id_map<T: DeserializeOwned>(
    address: &str,
    value: Value,
) -> Result<BTreeMap<u32, T>> {
    let value = response::resource_or_error(address, value)?;
    let raw: BTreeMap<String, T> = serde_json::from_value(value).map_err(Error::JsonLoad)?;
    raw.into_iter()
        .map(|(key, item)| {
            key.parse::<u32>()
                .map(|id| (id, item))
                .map_err(|_| Error::unexpected(address, &format!("non-numeric id {}", key)))
        })
        .collect()
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn insert(&mut self, id: u32, name: &str) {
        self.by_id.insert(id, name.to_string());
        self.by_name.insert(name.to_string(), id);
    }

    /// Point `new` at the id `old` used to name; returns `false` if `old` is unknown.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        let Some(id) = self.by_name.remove(old) else {
            return false;
        };
        self.by_name.insert(new.to_string(), id);
        self.by_id.insert(id, new.to_string());
        true
    }

    pub fn remove(&mut self, id: u32) -> Option<String> {
        let name = self.by_id.remove(&id)?;
        if self.by_name.get(&name) == Some(&id) {
            self.by_name.remove(&name);
        }
        Some(name)
    }

    /// Look up a key among the cached ids or names.
    pub fn resolve(&self, key: &ResourceKey) -> Option<u32> {
        match key {
            ResourceKey::Id(id) => self.by_id.contains_key(id).then_some(*id),
            ResourceKey::Name(name) => self.by_name.get(name).copied(),
        }
    }

    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> Vec<u32> {
        self.by_id.keys().copied().collect()
    }

    pub fn names(&self) -> Vec<(String, u32)> {
        self.by_name.iter().map(|(n, id)| (n.clone(), *id)).collect()
    }

    /// Handles in ascending id order.
    pub(crate) fn collect_list<T>(&self, make: impl Fn(u32) -> T) -> Vec<T> {
        self.by_id.keys().map(|id| make(*id)).collect()
    }

    pub(crate) fn collect_by_id<T>(&self, make: impl Fn(u32) -> T) -> BTreeMap<u32, T> {
        self.by_id.keys().map(|id| (*id, make(*id))).collect()
    }

    pub(crate) fn collect_by_name<T>(&self, make: impl Fn(u32) -> T) -> HashMap<String, T> {
        self.by_name
            .iter()
            .map(|(name, id)| (name.clone(), make(*id)))
            .collect()
    }

    /// Build a collection of handles, one per known id.
    pub(crate) fn collect<T>(&self, mode: CollectionMode, make: impl Fn(u32) -> T) -> Collection<T> {
        match mode {
            CollectionMode::List => Collection::List(self.collect_list(make)),
            CollectionMode::ById => Collection::ById(self.collect_by_id(make)),
            CollectionMode::ByName => Collection::ByName(self.collect_by_name(make)),
        }
    }
}
