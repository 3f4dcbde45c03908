//! Indexed Priority Queue
//!
//! Binary min-heap with O(log n) arbitrary removal and priority updates.
//! Heap entries live in a slot arena; callers hold generation-checked
//! [`QueueHandle`]s instead of items carrying their own heap position, so
//! a stale handle is rejected rather than corrupting the heap. Duplicate
//! priorities are tolerated with arbitrary tie order.

use std::sync::{Mutex, MutexGuard};

/// Stable external handle to a queued item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    entry: Option<SlotEntry<T>>,
}

#[derive(Debug)]
struct SlotEntry<T> {
    item: T,
    priority: f64,
    heap_pos: usize,
}

/// Min-heap keyed by an `f64` priority.
#[derive(Debug)]
pub struct IndexedPriorityQueue<T> {
    /// Slot indices ordered as a binary min-heap.
    heap: Vec<u32>,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Default for IndexedPriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IndexedPriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// True while the handle refers to a live entry.
    pub fn contains(&self, handle: QueueHandle) -> bool {
        self.entry(handle).is_some()
    }

    /// Current priority of a live entry.
    pub fn priority(&self, handle: QueueHandle) -> Option<f64> {
        self.entry(handle).map(|e| e.priority)
    }

    fn entry(&self, handle: QueueHandle) -> Option<&SlotEntry<T>> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.entry.as_ref())
    }

    /// Inserts an item, returning a handle valid until the item leaves the
    /// queue.
    pub fn push(&mut self, item: T, priority: f64) -> QueueHandle {
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let heap_pos = self.heap.len();
        let slot = &mut self.slots[index as usize];
        slot.entry = Some(SlotEntry {
            item,
            priority,
            heap_pos,
        });
        let handle = QueueHandle {
            index,
            generation: slot.generation,
        };
        self.heap.push(index);
        self.sift_up(heap_pos);
        handle
    }

    /// Minimum-priority item without removing it.
    pub fn peek(&self) -> Option<(&T, f64)> {
        let &index = self.heap.first()?;
        let entry = self.slots[index as usize].entry.as_ref()?;
        Some((&entry.item, entry.priority))
    }

    /// Removes and returns the minimum-priority item.
    pub fn pop(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            None
        } else {
            Some(self.remove_at(0))
        }
    }

    /// Removes an arbitrary live entry in O(log n). Root removal takes the
    /// pop fast path. Stale handles return `None`.
    pub fn remove(&mut self, handle: QueueHandle) -> Option<T> {
        let pos = self.entry(handle)?.heap_pos;
        Some(self.remove_at(pos))
    }

    /// Re-heapifies after changing an entry's priority. Returns `false`
    /// for stale handles.
    pub fn update_priority(&mut self, handle: QueueHandle, priority: f64) -> bool {
        let slot = match self.slots.get_mut(handle.index as usize) {
            Some(s) if s.generation == handle.generation => s,
            _ => return false,
        };
        let entry = match slot.entry.as_mut() {
            Some(e) => e,
            None => return false,
        };
        let pos = entry.heap_pos;
        let old = entry.priority;
        entry.priority = priority;
        if priority < old {
            self.sift_up(pos);
        } else {
            self.sift_down(pos);
        }
        true
    }

    fn remove_at(&mut self, pos: usize) -> T {
        let last = self.heap.len() - 1;
        self.heap.swap(pos, last);
        if pos != last {
            self.set_heap_pos(pos);
        }
        let index = self.heap.pop().expect("heap checked non-empty");
        let slot = &mut self.slots[index as usize];
        let entry = slot.entry.take().expect("queued slot must hold an entry");
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        if pos < self.heap.len() {
            // The swapped-in element may need to move either direction.
            self.sift_down(pos);
            self.sift_up(pos);
        }
        entry.item
    }

    fn priority_at(&self, pos: usize) -> f64 {
        let index = self.heap[pos] as usize;
        self.slots[index]
            .entry
            .as_ref()
            .expect("heap entry must be live")
            .priority
    }

    fn set_heap_pos(&mut self, pos: usize) {
        let index = self.heap[pos] as usize;
        if let Some(entry) = self.slots[index].entry.as_mut() {
            entry.heap_pos = pos;
        }
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.priority_at(pos) < self.priority_at(parent) {
                self.heap.swap(pos, parent);
                self.set_heap_pos(pos);
                self.set_heap_pos(parent);
                pos = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        loop {
            let left = pos * 2 + 1;
            let right = left + 1;
            let mut smallest = pos;
            if left < self.heap.len() && self.priority_at(left) < self.priority_at(smallest) {
                smallest = left;
            }
            if right < self.heap.len() && self.priority_at(right) < self.priority_at(smallest) {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.heap.swap(pos, smallest);
            self.set_heap_pos(pos);
            self.set_heap_pos(smallest);
            pos = smallest;
        }
    }
}

/// Mutex-guarded queue letting other threads enqueue, remove, and update
/// priorities concurrently with each other. Processing itself stays on one
/// thread; only queue mutation is guarded.
#[derive(Debug, Default)]
pub struct SharedIndexedPriorityQueue<T> {
    inner: Mutex<IndexedPriorityQueue<T>>,
}

impl<T> SharedIndexedPriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(IndexedPriorityQueue::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, IndexedPriorityQueue<T>> {
        // A panic mid-mutation cannot leave the heap half-updated; recover
        // the guard rather than poisoning every later caller.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, item: T, priority: f64) -> QueueHandle {
        self.lock().push(item, priority)
    }

    pub fn pop(&self) -> Option<T> {
        self.lock().pop()
    }

    pub fn remove(&self, handle: QueueHandle) -> Option<T> {
        self.lock().remove(handle)
    }

    pub fn update_priority(&self, handle: QueueHandle, priority: f64) -> bool {
        self.lock().update_priority(handle, priority)
    }

    pub fn contains(&self, handle: QueueHandle) -> bool {
        self.lock().contains(handle)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Runs a closure against the locked queue, for compound operations.
    pub fn with<R>(&self, f: impl FnOnce(&mut IndexedPriorityQueue<T>) -> R) -> R {
        f(&mut self.lock())
    }
}
