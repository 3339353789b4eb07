//! [`JsonStore`]: an owned arena that grows itself.
//!
//! The arena engine reports capacity problems and never allocates. The
//! store owns the buffer and reacts to those reports:
//!
//! ```text
//! op ──Ok──▶ done
//!  │
//!  ├─TableFull──▶ double_table ──BufferFull──▶ grow ─┐
//!  │                   │                            │
//!  │                   └──────────Ok─────────────────┤
//!  ├─BufferFull─▶ grow ─────────────────────────────┤
//!  │                                                ▼
//!  └─other──▶ error                              retry op
//! ```
//!
//! Every growth step adds at least [`StoreConfig::buffer_growth`] bytes,
//! so the loop either succeeds or reaches the configured cap.

use indexmap::IndexMap;
use packjson_arena::{
    Arena, JsonError, ObjectMut, ObjectRef, OwnedArena, OwnedValue, ScratchRegion, Value,
    ValueType,
};
use packjson_codec as codec;
use tracing::{debug, trace, warn};

use crate::config::StoreConfig;
use crate::error::StoreError;

/// An owned, growable JSON object.
#[derive(Debug)]
pub struct JsonStore {
    arena: OwnedArena,
    scratch: ScratchRegion,
    config: StoreConfig,
}

impl JsonStore {
    /// A store with the default configuration.
    pub fn new() -> Result<Self, StoreError> {
        Self::with_config(StoreConfig::default())
    }

    /// A store with a validated custom configuration.
    pub fn with_config(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let arena = OwnedArena::new(config.initial_buffer_size, config.initial_table_size)?;
        debug!(
            buf_size = config.initial_buffer_size,
            table_size = config.initial_table_size,
            "store created"
        );
        Ok(Self {
            arena,
            scratch: scratch_for(&config),
            config,
        })
    }

    /// Take ownership of an existing arena. Its current geometry replaces
    /// the config's initial sizes.
    pub fn from_arena(arena: OwnedArena, config: StoreConfig) -> Result<Self, StoreError> {
        let config = StoreConfig {
            initial_buffer_size: arena.buf_size(),
            initial_table_size: arena.table_size(),
            ..config
        };
        config.validate()?;
        Ok(Self {
            arena,
            scratch: scratch_for(&config),
            config,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Borrow the underlying arena.
    pub fn as_arena(&self) -> &OwnedArena {
        &self.arena
    }

    /// Give up the store and keep the arena.
    pub fn into_arena(self) -> OwnedArena {
        self.arena
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the store has no members.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Current buffer size in bytes.
    pub fn buf_size(&self) -> usize {
        self.arena.buf_size()
    }

    /// Current table size in slots.
    pub fn table_size(&self) -> usize {
        self.arena.table_size()
    }

    // ── Parse ──────────────────────────────────────────────────────

    /// Replace the contents with the object in `text`.
    ///
    /// Capacity errors clear the store, grow it, and parse again from the
    /// start. On any other error the store is left empty. Returns the
    /// number of input bytes consumed.
    pub fn parse(&mut self, text: impl AsRef<[u8]>) -> Result<usize, StoreError> {
        let text = text.as_ref();
        self.arena.clear();
        loop {
            let outcome = match codec::parse(&mut self.arena, text) {
                Ok(consumed) => return Ok(consumed),
                Err(JsonError::TableFull { table_size }) => {
                    trace!(table_size, "parse filled the table, retrying");
                    self.arena.clear();
                    self.double_table()
                }
                Err(JsonError::BufferFull {
                    requested,
                    available,
                }) => {
                    trace!(requested, available, "parse filled the buffer, retrying");
                    self.arena.clear();
                    self.grow(requested.saturating_sub(available))
                }
                Err(e) => Err(e.into()),
            };
            if let Err(e) = outcome {
                self.arena.clear();
                return Err(e);
            }
        }
    }

    // ── Insert ─────────────────────────────────────────────────────

    /// Insert a tagged value, growing as needed. Returns the slot.
    pub fn insert(&mut self, key: &str, value: Value<'_>) -> Result<usize, StoreError> {
        self.with_growth(|arena| arena.insert(key, value))
    }

    /// Insert an integer.
    pub fn insert_int(&mut self, key: &str, v: i32) -> Result<usize, StoreError> {
        self.with_growth(|arena| arena.insert_int(key, v))
    }

    /// Insert a float.
    pub fn insert_float(&mut self, key: &str, v: f32) -> Result<usize, StoreError> {
        self.with_growth(|arena| arena.insert_float(key, v))
    }

    /// Insert a string.
    pub fn insert_str(&mut self, key: &str, v: &str) -> Result<usize, StoreError> {
        self.with_growth(|arena| arena.insert_str(key, v))
    }

    /// Insert a `null`.
    pub fn insert_null(&mut self, key: &str) -> Result<usize, StoreError> {
        self.with_growth(|arena| arena.insert_null(key))
    }

    /// Copy `child` in as a nested object.
    pub fn insert_object<C: AsRef<[u8]>>(
        &mut self,
        key: &str,
        child: &Arena<C>,
    ) -> Result<usize, StoreError> {
        self.with_growth(|arena| arena.insert_object(key, child))
    }

    /// Reserve `size` bytes for an empty nested object with `table_size`
    /// slots. Fill it through [`get_object_mut`](Self::get_object_mut).
    pub fn insert_empty_object(
        &mut self,
        key: &str,
        size: usize,
        table_size: usize,
    ) -> Result<usize, StoreError> {
        self.with_growth(|arena| arena.insert_empty_object(key, size, table_size))
    }

    // ── Set ────────────────────────────────────────────────────────

    /// Overwrite an existing value. Strings and objects that outgrow
    /// their slot are deleted and re-inserted.
    ///
    /// The buffer is grown before the delete, so a value that can never
    /// fit under the cap fails with the old value still in place.
    pub fn set(&mut self, key: &str, value: Value<'_>) -> Result<(), StoreError> {
        match self.arena.set(key, value) {
            Err(JsonError::EntryBufferFull {
                requested,
                reserved,
            }) => {
                trace!(key, requested, reserved, "value outgrew its slot, moving it");
                // The delete frees the old slot, the re-insert needs the new one.
                let shortfall = requested.saturating_sub(reserved + self.arena.remaining());
                if shortfall > 0 {
                    self.grow(shortfall)?;
                }
                self.delete(key)?;
                self.insert(key, value).map(drop)
            }
            other => other.map_err(StoreError::from),
        }
    }

    /// Overwrite an integer.
    pub fn set_int(&mut self, key: &str, v: i32) -> Result<(), StoreError> {
        Ok(self.arena.set_int(key, v)?)
    }

    /// Overwrite a float.
    pub fn set_float(&mut self, key: &str, v: f32) -> Result<(), StoreError> {
        Ok(self.arena.set_float(key, v)?)
    }

    /// Overwrite a string, moving it if it no longer fits its slot.
    pub fn set_str(&mut self, key: &str, v: &str) -> Result<(), StoreError> {
        self.set(key, Value::Str(v))
    }

    // ── Read ───────────────────────────────────────────────────────

    /// Raw value bytes of `key` if it holds a `ty`.
    pub fn get(&self, key: &str, ty: ValueType) -> Option<&[u8]> {
        self.arena.get(key, ty)
    }

    /// The integer under `key`.
    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.arena.get_int(key)
    }

    /// The float under `key`.
    pub fn get_float(&self, key: &str) -> Option<f32> {
        self.arena.get_float(key)
    }

    /// The string under `key`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.arena.get_str(key)
    }

    /// The nested object under `key`.
    pub fn get_object(&self, key: &str) -> Option<ObjectRef<'_>> {
        self.arena.get_object(key)
    }

    /// Mutable view of the nested object under `key`. The child cannot
    /// grow past the bytes reserved for it.
    pub fn get_object_mut(&mut self, key: &str) -> Option<ObjectMut<'_>> {
        self.arena.get_object_mut(key)
    }

    /// The tagged value under `key`.
    pub fn value(&self, key: &str) -> Option<Value<'_>> {
        self.arena.value(key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.arena.contains_key(key)
    }

    /// Owned snapshot of the contents.
    pub fn to_owned_map(&self) -> IndexMap<String, OwnedValue> {
        self.arena.to_owned_map()
    }

    // ── Remove ─────────────────────────────────────────────────────

    /// Remove `key`, reusing the store's scratch region for the rebuild.
    pub fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        Ok(self.arena.delete_with(key, &mut self.scratch)?)
    }

    /// Remove every member. The buffer and table keep their size.
    pub fn clear(&mut self) {
        self.arena.clear();
    }

    // ── Text output ────────────────────────────────────────────────

    /// The contents as compact JSON text.
    pub fn stringify(&self) -> String {
        codec::stringify(&self.arena)
    }

    /// Length of [`stringify`](Self::stringify)'s output.
    pub fn stringify_length(&self) -> usize {
        codec::stringify_length(&self.arena)
    }

    /// Write the JSON text into `dest`. Returns the length written.
    pub fn stringify_into(&self, dest: &mut [u8]) -> Result<usize, StoreError> {
        Ok(codec::stringify_into(&self.arena, dest)?)
    }

    // ── Growth ─────────────────────────────────────────────────────

    fn with_growth<T>(
        &mut self,
        mut op: impl FnMut(&mut OwnedArena) -> Result<T, JsonError>,
    ) -> Result<T, StoreError> {
        loop {
            match op(&mut self.arena) {
                Ok(v) => return Ok(v),
                Err(JsonError::TableFull { table_size }) => {
                    trace!(table_size, "table full, retrying after doubling");
                    self.double_table()?;
                }
                Err(JsonError::BufferFull {
                    requested,
                    available,
                }) => {
                    trace!(requested, available, "buffer full, retrying after growth");
                    self.grow(requested.saturating_sub(available))?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Double the table, growing the buffer first if the new slots do
    /// not fit.
    fn double_table(&mut self) -> Result<(), StoreError> {
        loop {
            match self.arena.double_table_with(&mut self.scratch) {
                Ok(()) => {
                    debug!(table_size = self.arena.table_size(), "doubled table");
                    return Ok(());
                }
                Err(JsonError::BufferFull {
                    requested,
                    available,
                }) => self.grow(requested.saturating_sub(available))?,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Move to a buffer at least `shortfall` bytes larger.
    fn grow(&mut self, shortfall: usize) -> Result<(), StoreError> {
        let old = self.arena.buf_size();
        let cap = self.config.buffer_cap();
        let needed = old.saturating_add(shortfall.max(1));
        if needed > cap {
            warn!(buf_size = old, needed, cap, "buffer cap reached, not growing");
            return Err(StoreError::CapacityExceeded {
                requested: needed,
                cap,
            });
        }
        let new_size = old
            .saturating_add(shortfall.max(self.config.buffer_growth))
            .min(cap);
        self.arena.replace_buffer(vec![0; new_size])?;
        debug!(from = old, to = new_size, "grew buffer");
        Ok(())
    }
}

fn scratch_for(config: &StoreConfig) -> ScratchRegion {
    match config.scratch_limit {
        Some(limit) => ScratchRegion::with_limit(limit),
        None => ScratchRegion::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> StoreConfig {
        StoreConfig {
            initial_buffer_size: 128,
            initial_table_size: 2,
            ..StoreConfig::default()
        }
    }

    #[test]
    fn inserts_past_the_initial_table() {
        let mut store = JsonStore::with_config(small_config()).unwrap();
        for (i, key) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            store.insert_int(key, i as i32).unwrap();
        }
        assert_eq!(store.len(), 5);
        assert!(store.table_size() >= 8);
        assert_eq!(store.get_int("e"), Some(4));
    }

    #[test]
    fn grows_by_at_least_the_shortfall() {
        let mut store = JsonStore::with_config(small_config()).unwrap();
        let long = "x".repeat(200);
        store.insert_str("long", &long).unwrap();
        assert_eq!(store.get_str("long"), Some(long.as_str()));
        assert!(store.buf_size() > 200);
    }

    #[test]
    fn key_exists_is_not_retried() {
        let mut store = JsonStore::new().unwrap();
        store.insert_int("k", 1).unwrap();
        let size = store.buf_size();
        assert_eq!(
            store.insert_int("k", 2),
            Err(StoreError::Json(JsonError::KeyExists))
        );
        assert_eq!(store.buf_size(), size);
    }

    #[test]
    fn cap_stops_growth() {
        let mut store = JsonStore::with_config(StoreConfig {
            max_buffer_size: Some(128),
            ..small_config()
        })
        .unwrap();
        let err = store.insert_str("long", &"y".repeat(100)).unwrap_err();
        assert!(matches!(err, StoreError::CapacityExceeded { cap: 128, .. }));
        assert!(store.is_empty());
        assert_eq!(store.buf_size(), 128);
    }

    #[test]
    fn set_str_moves_a_longer_string() {
        let mut store = JsonStore::new().unwrap();
        store.insert_str("i", "IS").unwrap();
        store.set_str("i", "IS...!!~~!~!~!~!~!!~!!!?").unwrap();
        assert_eq!(store.get_str("i"), Some("IS...!!~~!~!~!~!~!!~!!!?"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn set_past_the_cap_keeps_the_old_value() {
        let mut store = JsonStore::with_config(StoreConfig {
            max_buffer_size: Some(160),
            ..small_config()
        })
        .unwrap();
        store.insert_str("k", "short").unwrap();
        let err = store.set_str("k", &"z".repeat(100)).unwrap_err();
        assert!(matches!(err, StoreError::CapacityExceeded { cap: 160, .. }));
        assert_eq!(store.get_str("k"), Some("short"));
        assert_eq!(store.len(), 1);

        store.set_str("k", &"z".repeat(40)).unwrap();
        assert_eq!(store.get_str("k"), Some("z".repeat(40).as_str()));
        assert!(store.buf_size() <= 160);
    }

    #[test]
    fn set_on_missing_key_fails() {
        let mut store = JsonStore::new().unwrap();
        assert_eq!(
            store.set_int("nope", 1),
            Err(StoreError::Json(JsonError::NoMatchedKey))
        );
        assert_eq!(
            store.set_str("nope", "x"),
            Err(StoreError::Json(JsonError::NoMatchedKey))
        );
    }

    #[test]
    fn parse_grows_until_the_text_fits() {
        let mut store = JsonStore::with_config(small_config()).unwrap();
        let text = r#"{"a":1,"b":2,"c":3,"d":"a somewhat longer string value","e":0.5}"#;
        assert_eq!(store.parse(text).unwrap(), text.len());
        assert_eq!(store.len(), 5);
        assert_eq!(store.get_str("d"), Some("a somewhat longer string value"));
    }

    #[test]
    fn parse_error_leaves_the_store_empty() {
        let mut store = JsonStore::new().unwrap();
        store.insert_int("old", 1).unwrap();
        let err = store.parse(r#"{"a":1,"b":}"#).unwrap_err();
        assert!(matches!(err, StoreError::Json(JsonError::Syntax { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn parse_replaces_previous_contents() {
        let mut store = JsonStore::new().unwrap();
        store.insert_int("old", 1).unwrap();
        store.parse(r#"{"new":2}"#).unwrap();
        assert!(!store.contains_key("old"));
        assert_eq!(store.get_int("new"), Some(2));
    }

    #[test]
    fn scratch_limit_bounds_deletes() {
        let mut store = JsonStore::with_config(StoreConfig {
            scratch_limit: Some(16),
            ..StoreConfig::default()
        })
        .unwrap();
        store.insert_int("a", 1).unwrap();
        assert!(matches!(
            store.delete("a"),
            Err(StoreError::Json(JsonError::ScratchExhausted { .. }))
        ));
        assert_eq!(store.get_int("a"), Some(1));
    }

    #[test]
    fn from_arena_keeps_contents() {
        let mut arena = OwnedArena::new(256, 4).unwrap();
        arena.insert_int("k", 7).unwrap();
        let mut store = JsonStore::from_arena(arena, StoreConfig::default()).unwrap();
        store.insert_int("j", 8).unwrap();
        assert_eq!(store.get_int("k"), Some(7));
        assert_eq!(store.into_arena().get_int("j"), Some(8));
    }
}
