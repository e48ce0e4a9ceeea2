//! Item storage.
//!
//! Handlers only see the [`ItemRepository`] contract, so the in-memory
//! [`MemoryStore`] can be swapped for another backend without touching them.

use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::types::{Item, ItemId, NewItem};
use crate::error::StoreError;

/// Operations over the item collection.
///
/// Items are kept in insertion order. Ids are assigned by the store and
/// never taken from the caller.
pub trait ItemRepository: fmt::Debug + Send + Sync + 'static {
    /// All items in insertion order.
    fn list(&self) -> Result<Vec<Item>, StoreError>;

    /// The item with the given id.
    fn get(&self, id: ItemId) -> Result<Item, StoreError>;

    /// Append a new item with a freshly assigned id.
    fn create(&self, values: NewItem) -> Result<Item, StoreError>;

    /// Replace the values of an existing item in place, keeping its id and position.
    fn update(&self, id: ItemId, values: NewItem) -> Result<Item, StoreError>;

    /// Remove an item.
    fn delete(&self, id: ItemId) -> Result<(), StoreError>;

    /// Copy an item's name and description into a new item with a fresh id.
    fn duplicate(&self, id: ItemId) -> Result<Item, StoreError>;

    /// Number of stored items.
    fn len(&self) -> Result<usize, StoreError>;

    /// Whether the store holds no items.
    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Items whose name equals `name` exactly, in insertion order.
    fn list_by_name(&self, name: &str) -> Result<Vec<Item>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|item| item.name == name)
            .collect())
    }
}

#[derive(Debug, Default)]
struct Inner {
    items: Vec<Item>,
    next_id: ItemId,
}

impl Inner {
    fn position(&self, id: ItemId) -> Result<usize, StoreError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn push(&mut self, values: NewItem) -> Item {
        let item = Item::from_new(self.next_id, values);
        self.next_id += 1;
        self.items.push(item.clone());
        item
    }
}

/// In-memory item store guarded by a read/write lock.
///
/// Ids come from a monotonic counter, so a deleted id is never handed out
/// again and new ids cannot collide with existing ones.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the two startup items.
    pub fn seeded() -> Self {
        Self::with_items([
            NewItem::new("first", "first item"),
            NewItem::new("second", "second item"),
        ])
    }

    /// Create a store from initial values, assigning ids from 0.
    pub fn with_items(values: impl IntoIterator<Item = NewItem>) -> Self {
        let mut inner = Inner::default();
        for value in values {
            inner.push(value);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Operation("item store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Operation("item store lock poisoned".to_string()))
    }
}

impl ItemRepository for MemoryStore {
    fn list(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.read()?.items.clone())
    }

    fn get(&self, id: ItemId) -> Result<Item, StoreError> {
        let inner = self.read()?;
        let index = inner.position(id)?;
        Ok(inner.items[index].clone())
    }

    fn create(&self, values: NewItem) -> Result<Item, StoreError> {
        let item = self.write()?.push(values);
        debug!(id = item.id, "Item created");
        Ok(item)
    }

    fn update(&self, id: ItemId, values: NewItem) -> Result<Item, StoreError> {
        let mut inner = self.write()?;
        let index = inner.position(id)?;
        let item = Item::from_new(id, values);
        inner.items[index] = item.clone();
        debug!(id, "Item updated");
        Ok(item)
    }

    fn delete(&self, id: ItemId) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let index = inner.position(id)?;
        inner.items.remove(index);
        debug!(id, "Item deleted");
        Ok(())
    }

    fn duplicate(&self, id: ItemId) -> Result<Item, StoreError> {
        let mut inner = self.write()?;
        let index = inner.position(id)?;
        let values = inner.items[index].values();
        let copy = inner.push(values);
        debug!(source = id, id = copy.id, "Item duplicated");
        Ok(copy)
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(store: &MemoryStore) -> Vec<ItemId> {
        store.list().unwrap().iter().map(|item| item.id).collect()
    }

    #[test]
    fn seeded_store_holds_startup_items() {
        let store = MemoryStore::seeded();
        assert_eq!(
            store.list().unwrap(),
            vec![
                Item::from_new(0, NewItem::new("first", "first item")),
                Item::from_new(1, NewItem::new("second", "second item")),
            ]
        );
    }

    #[test]
    fn get_returns_item_with_requested_id() {
        let store = MemoryStore::seeded();
        for id in [0, 1] {
            assert_eq!(store.get(id).unwrap().id, id);
        }
    }

    #[test]
    fn missing_id_is_not_found_everywhere() {
        let store = MemoryStore::seeded();
        assert_eq!(store.get(999), Err(StoreError::NotFound(999)));
        assert_eq!(
            store.update(999, NewItem::default()),
            Err(StoreError::NotFound(999))
        );
        assert_eq!(store.delete(999), Err(StoreError::NotFound(999)));
        assert_eq!(store.duplicate(999), Err(StoreError::NotFound(999)));
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn create_then_get_round_trips_values() {
        let store = MemoryStore::seeded();
        let created = store.create(NewItem::new("new_name", "new_description")).unwrap();

        assert_eq!(created.id, 2);
        assert_eq!(store.get(2).unwrap(), created);
        assert_eq!(ids(&store), vec![0, 1, 2]);
    }

    #[test]
    fn delete_removes_exactly_one_item() {
        let store = MemoryStore::seeded();
        store.delete(0).unwrap();

        assert_eq!(store.get(0), Err(StoreError::NotFound(0)));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn update_keeps_id_and_position() {
        let store = MemoryStore::seeded();
        store.create(NewItem::new("third", "third item")).unwrap();

        let updated = store.update(1, NewItem::new("changed", "changed item")).unwrap();

        assert_eq!(updated, Item::from_new(1, NewItem::new("changed", "changed item")));
        assert_eq!(ids(&store), vec![0, 1, 2]);
        assert_eq!(store.get(1).unwrap(), updated);
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn duplicate_copies_values_under_new_id() {
        let store = MemoryStore::seeded();
        let copy = store.duplicate(0).unwrap();

        assert_ne!(copy.id, 0);
        assert_eq!(copy.values(), store.get(0).unwrap().values());
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::seeded();
        store.delete(0).unwrap();

        let created = store.create(NewItem::new("x", "y")).unwrap();

        assert_eq!(created.id, 2);
        assert_eq!(ids(&store), vec![1, 2]);
    }

    #[test]
    fn list_by_name_filters_on_exact_match() {
        let store = MemoryStore::seeded();
        store.create(NewItem::new("second", "another")).unwrap();

        let found = store.list_by_name("second").unwrap();
        assert_eq!(found.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(store.list_by_name("sec").unwrap().is_empty());
    }

    #[test]
    fn concurrent_writers_get_distinct_ids() {
        let store = MemoryStore::seeded();
        let writers = 16;

        std::thread::scope(|scope| {
            for n in 0..writers {
                let store = &store;
                scope.spawn(move || {
                    if n % 2 == 0 {
                        store.create(NewItem::new(format!("item {n}"), "")).unwrap();
                    } else {
                        store.duplicate(0).unwrap();
                    }
                });
            }
        });

        let mut seen = ids(&store);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 2 + writers);
        assert_eq!(store.len().unwrap(), 2 + writers);
    }

    #[test]
    fn empty_store_starts_at_zero() {
        let store = MemoryStore::new();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.create(NewItem::default()).unwrap().id, 0);
    }
}
