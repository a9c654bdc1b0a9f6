//! LRU Engine Module
//!
//! Byte-bounded least-recently-used store keyed by string.
//!
//! Entries live in a slot vector and are linked into a doubly linked recency
//! list by index, so `get`, `set` and `remove_oldest` are all O(1):
//!
//! ```text
//!   index: HashMap<String, usize>
//!
//!   head ──► [slot 2] ◄──► [slot 0] ◄──► [slot 1] ◄── tail
//!    (MRU)                                            (LRU)
//! ```

use std::collections::HashMap;
use std::fmt;

// == Value ==
/// Anything stored in the engine must report its own size in bytes.
pub trait Value {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Callback fired once for every evicted entry, after it has been unlinked.
pub type OnEvicted<V> = Box<dyn FnMut(&str, &V) + Send>;

#[derive(Debug)]
struct Node<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU ==
/// Least-recently-used store bounded by the total byte size of its entries.
///
/// Each entry is charged `key.len() + value.len()` bytes. A `max_bytes` of 0
/// means the store is unbounded.
pub struct Lru<V> {
    max_bytes: usize,
    used_bytes: usize,
    slots: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    /// Most recently used
    head: Option<usize>,
    /// Least recently used
    tail: Option<usize>,
    index: HashMap<String, usize>,
    on_evicted: Option<OnEvicted<V>>,
}

impl<V: Value> Lru<V> {
    // == Constructor ==
    /// Creates an empty store with the given byte budget and optional eviction callback.
    pub fn new(max_bytes: usize, on_evicted: Option<OnEvicted<V>>) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            index: HashMap::new(),
            on_evicted,
        }
    }

    // == Get ==
    /// Looks up a key and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        self.slots[idx].as_ref().map(|node| &node.value)
    }

    /// Looks up a key without touching its recency.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.slots[idx].as_ref().map(|node| &node.value)
    }

    // == Set ==
    /// Inserts or replaces a value, then evicts from the LRU end until the
    /// store fits its budget again.
    ///
    /// An entry larger than the whole budget is inserted and then evicted
    /// straight away.
    pub fn set(&mut self, key: String, value: V) {
        if let Some(idx) = self.index.get(&key).copied() {
            self.move_to_front(idx);
            if let Some(node) = self.slots[idx].as_mut() {
                self.used_bytes = self.used_bytes + value.len() - node.value.len();
                node.value = value;
            }
        } else {
            self.used_bytes += key.len() + value.len();
            let idx = self.alloc(Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.attach_front(idx);
            self.index.insert(key, idx);
        }

        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            self.remove_oldest();
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, firing the eviction callback.
    ///
    /// Returns `None` when the store is empty.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let idx = self.tail?;
        let node = self.unlink(idx);

        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(&node.key, &node.value);
        }

        Some((node.key, node.value))
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently charged against the budget.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    // == List Plumbing ==
    fn alloc(&mut self, node: Node<V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    /// Detaches the node from the list and the index, releasing its slot.
    fn unlink(&mut self, idx: usize) -> Node<V> {
        self.detach(idx);
        let node = self.slots[idx]
            .take()
            .unwrap_or_else(|| unreachable!("linked slot {idx} is empty"));
        self.free.push(idx);
        self.index.remove(&node.key);
        self.used_bytes -= node.key.len() + node.value.len();
        node
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.detach(idx);
        self.attach_front(idx);
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = match self.slots[idx].as_ref() {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.slots[p].as_mut() {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.slots[n].as_mut() {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.slots[idx].as_mut() {
            node.prev = None;
            node.next = None;
        }
    }

    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.slots[idx].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        if let Some(h) = old_head {
            if let Some(node) = self.slots[h].as_mut() {
                node.prev = Some(idx);
            }
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    /// Keys from most to least recently used.
    #[cfg(test)]
    fn keys_by_recency(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self.slots[idx].as_ref().expect("linked slot");
            keys.push(node.key.clone());
            cursor = node.next;
        }
        keys
    }
}

impl<V> fmt::Debug for Lru<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lru")
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.index.len())
            .field("on_evicted", &self.on_evicted.is_some())
            .finish()
    }
}
