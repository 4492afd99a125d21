use crate::buffer::replace::Replacer;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;

// sentinel slots in the arena
const HEAD: usize = 0;
const TAIL: usize = 1;

struct Node<T> {
    value: Option<T>,
    prev: usize,
    next: usize,
}

// Doubly linked list in a slot arena plus a value -> slot index. The list
// owns all nodes, so detaching from the middle is O(1) without any
// per-node reference counting. Freed slots are recycled.
struct LruList<T> {
    slots: Vec<Node<T>>,
    index: HashMap<T, usize>,
    free_slots: Vec<usize>,
}

pub struct LruReplacer<T> {
    inner: Mutex<LruList<T>>,
}

impl<T> LruList<T>
where
    T: Copy + Eq + Hash,
{
    fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity + 2);
        slots.push(Node {
            value: None,
            prev: HEAD,
            next: TAIL,
        });
        slots.push(Node {
            value: None,
            prev: HEAD,
            next: TAIL,
        });
        Self {
            slots,
            index: HashMap::with_capacity(capacity),
            free_slots: Vec::new(),
        }
    }

    fn detach(&mut self, slot: usize) {
        let prev = self.slots[slot].prev;
        let next = self.slots[slot].next;
        self.slots[prev].next = next;
        self.slots[next].prev = prev;
    }

    // link `slot` right after the head sentinel
    fn attach_front(&mut self, slot: usize) {
        let first = self.slots[HEAD].next;
        self.slots[slot].prev = HEAD;
        self.slots[slot].next = first;
        self.slots[first].prev = slot;
        self.slots[HEAD].next = slot;
    }

    fn alloc(&mut self, value: T) -> usize {
        if let Some(slot) = self.free_slots.pop() {
            self.slots[slot].value = Some(value);
            slot
        } else {
            self.slots.push(Node {
                value: Some(value),
                prev: HEAD,
                next: TAIL,
            });
            self.slots.len() - 1
        }
    }

    fn release(&mut self, slot: usize) -> Option<T> {
        let value = self.slots[slot].value.take();
        self.free_slots.push(slot);
        value
    }
}

impl<T> LruReplacer<T>
where
    T: Copy + Eq + Hash,
{
    pub fn new(num_frames: usize) -> Self {
        Self {
            inner: Mutex::new(LruList::new(num_frames)),
        }
    }
}

impl<T> Replacer<T> for LruReplacer<T>
where
    T: Copy + Eq + Hash,
{
    fn insert(&self, value: T) {
        let mut list = self.inner.lock();
        let slot = match list.index.get(&value).copied() {
            Some(slot) => {
                list.detach(slot);
                slot
            }
            None => {
                let slot = list.alloc(value);
                list.index.insert(value, slot);
                slot
            }
        };
        list.attach_front(slot);
    }

    fn victim(&self) -> Option<T> {
        let mut list = self.inner.lock();
        let last = list.slots[TAIL].prev;
        if last == HEAD {
            return None;
        }
        list.detach(last);
        let value = list.release(last)?;
        list.index.remove(&value);
        Some(value)
    }

    fn erase(&self, value: T) -> bool {
        let mut list = self.inner.lock();
        match list.index.remove(&value) {
            Some(slot) => {
                list.detach(slot);
                list.release(slot);
                true
            }
            None => false,
        }
    }

    fn size(&self) -> usize {
        self.inner.lock().index.len()
    }
}
