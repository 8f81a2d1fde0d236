//! Typed repository over a [`KvStore`], one slot per logical collection.
//!
//! Reads never fail: a missing key, an unreadable substrate or a payload that
//! no longer decodes all yield the slot's default value. Writes are
//! best-effort; a failed write is logged and reported as `false`.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::edit::TextSnapshot;
use crate::model::{normalize, parse_raw, PhotoRecord, RawPhoto};
use crate::store::KvStore;

pub const KEY_PHOTOS: &str = "gallery.photos";
pub const KEY_TEXTS: &str = "gallery.texts";
pub const KEY_BACKGROUND: &str = "gallery.theme.bg";
pub const KEY_HERO: &str = "gallery.hero";

/// A JSON-encoded value stored under a fixed key.
pub struct Slot<T> {
    key: &'static str,
    _ty: PhantomData<fn() -> T>,
}

impl<T> Slot<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            _ty: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn get(&self, store: &dyn KvStore) -> T {
        match read_raw(store, self.key) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(key = self.key, error = %e, "discarding malformed stored value");
                T::default()
            }),
            None => T::default(),
        }
    }

    pub fn set(&self, store: &dyn KvStore, value: &T) -> bool {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "could not serialize value");
                return false;
            }
        };
        match store.set_item(self.key, &json) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "write failed; value not persisted");
                false
            }
        }
    }

    pub fn remove(&self, store: &dyn KvStore) -> bool {
        match store.remove_item(self.key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "remove failed");
                false
            }
        }
    }
}

fn read_raw(store: &dyn KvStore, key: &str) -> Option<String> {
    match store.get_item(key) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(key, error = %e, "read failed; using default");
            None
        }
    }
}

/// Owner state persisted across reloads.
pub struct Repository {
    store: Box<dyn KvStore>,
    texts: Slot<TextSnapshot>,
    background: Slot<Option<String>>,
    hero: Slot<Option<String>>,
}

impl Repository {
    pub fn new(store: Box<dyn KvStore>) -> Self {
        Self {
            store,
            texts: Slot::new(KEY_TEXTS),
            background: Slot::new(KEY_BACKGROUND),
            hero: Slot::new(KEY_HERO),
        }
    }

    pub fn store(&self) -> &dyn KvStore {
        self.store.as_ref()
    }

    /// Local records as stored, skipping entries that are not objects.
    pub fn local_raw(&self) -> Vec<RawPhoto> {
        match read_raw(self.store(), KEY_PHOTOS) {
            Some(raw) => parse_raw(&raw),
            None => Vec::new(),
        }
    }

    /// Local records, normalized.
    pub fn local_photos(&self) -> Vec<PhotoRecord> {
        normalize(self.local_raw())
    }

    pub fn set_local_raw(&self, list: &[RawPhoto]) -> bool {
        Slot::<Vec<RawPhoto>>::new(KEY_PHOTOS).set(self.store(), &list.to_vec())
    }

    pub fn texts(&self) -> TextSnapshot {
        self.texts.get(self.store())
    }

    pub fn set_texts(&self, snapshot: &TextSnapshot) -> bool {
        self.texts.set(self.store(), snapshot)
    }

    pub fn clear_texts(&self) -> bool {
        self.texts.remove(self.store())
    }

    pub fn background(&self) -> Option<String> {
        self.background.get(self.store())
    }

    pub fn set_background(&self, color: &str) -> bool {
        self.background.set(self.store(), &Some(color.to_string()))
    }

    pub fn hero(&self) -> Option<String> {
        self.hero.get(self.store())
    }

    pub fn set_hero(&self, source: &str) -> bool {
        self.hero.set(self.store(), &Some(source.to_string()))
    }

    pub fn clear_hero(&self) -> bool {
        self.hero.remove(self.store())
    }
}
