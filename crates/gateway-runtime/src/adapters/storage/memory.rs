//! In-memory JSON tree store.
//!
//! Mirrors the realtime database semantics the gateway relies on: reading a
//! missing path yields nothing, writing creates intermediate nodes, and
//! writing `null` removes a node together with any parents left empty.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use shared_types::StoreError;

use super::KeyValueStore;

/// Process-local store backed by a `serde_json::Value` tree.
#[derive(Debug)]
pub struct InMemoryStore {
    root: RwLock<Value>,
    online: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_data(Value::Null)
    }

    /// Create a store holding `root`.
    pub fn with_data(root: Value) -> Self {
        Self {
            root: RwLock::new(root),
            online: AtomicBool::new(true),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Simulate an outage (`false`) or recovery (`true`).
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of `get` calls served, failed ones included.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `set` calls served, failed ones included.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Inspect the tree without counting a read.
    pub fn peek(&self, path: &str) -> Option<Value> {
        lookup(&self.root.read(), path).cloned()
    }

    /// Overwrite a node without counting a write.
    pub fn seed(&self, path: &str, value: Value) {
        write_at(&mut self.root.write(), &segments(path), value);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".into()))
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(lookup(&self.root.read(), path).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        write_at(&mut self.root.write(), &segments(path), value);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_online()
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments(path) {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!node.is_null()).then_some(node)
}

fn write_at(node: &mut Value, path: &[&str], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }

    if let Value::Object(map) = node {
        let child = map.entry(head.to_string()).or_insert(Value::Null);
        write_at(child, rest, value);
        let prune = child.is_null() || child.as_object().is_some_and(Map::is_empty);
        if prune {
            map.remove(*head);
        }
    }
}
