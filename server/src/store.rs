//! Todo storage behind a swappable trait.
//!
//! # Design
//! Stores are plain synchronous data structures. Serialization of access is
//! the caller's job: the server wraps the store in one `RwLock` and holds the
//! write guard across each whole read-modify-write, so readers never see a
//! half-applied change.

use thiserror::Error;
use todo_core::TodoItem;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("todo item {0} already exists")]
    DuplicateId(Uuid),
}

/// Change applied to a stored item in place.
pub type Change<'a> = Box<dyn FnOnce(&mut TodoItem) + Send + 'a>;

pub trait TodoStore: Send + Sync {
    /// Every item, in insertion order.
    fn list(&self) -> Vec<TodoItem>;

    fn get(&self, id: Uuid) -> Option<TodoItem>;

    /// Append `item`. Identifiers are unique within a store.
    fn insert(&mut self, item: TodoItem) -> Result<(), StoreError>;

    /// Apply `change` to the item with `id` and return the result.
    fn update(&mut self, id: Uuid, change: Change<'_>) -> Option<TodoItem>;

    /// Remove the item with `id`, keeping the order of the rest.
    fn remove(&mut self, id: Uuid) -> Option<TodoItem>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered in-memory store. Lookups are linear scans.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Vec<TodoItem>,
}

const SEED: [(&str, &str, bool); 4] = [
    ("b5f713b0-6247-496d-9b02-3e1faf3ebbd3", "Todo 1", false),
    ("0352304c-1eb2-4d66-bb41-cf4bd5737d53", "Todo 2", false),
    ("8ea45006-4dfd-4d12-987d-ba304553c7ed", "Todo 3", false),
    ("60adcc13-aea5-4b6d-bf7b-6e29bcdf038c", "Todo 4", true),
];

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Four demo items: three open, one done.
    pub fn seeded() -> Self {
        let items = SEED
            .iter()
            .filter_map(|(id, title, completed)| {
                Uuid::parse_str(id).ok().map(|id| TodoItem {
                    id,
                    title: (*title).to_string(),
                    completed: *completed,
                })
            })
            .collect();
        Self { items }
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

impl TodoStore for MemoryStore {
    fn list(&self) -> Vec<TodoItem> {
        self.items.clone()
    }

    fn get(&self, id: Uuid) -> Option<TodoItem> {
        self.items.iter().find(|item| item.id == id).cloned()
    }

    fn insert(&mut self, item: TodoItem) -> Result<(), StoreError> {
        if self.position(item.id).is_some() {
            return Err(StoreError::DuplicateId(item.id));
        }
        self.items.push(item);
        Ok(())
    }

    fn update(&mut self, id: Uuid, change: Change<'_>) -> Option<TodoItem> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        change(item);
        Some(item.clone())
    }

    fn remove(&mut self, id: Uuid) -> Option<TodoItem> {
        self.position(id).map(|index| self.items.remove(index))
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
