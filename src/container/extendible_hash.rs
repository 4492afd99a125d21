use parking_lot::Mutex;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;

struct BucketData<K, V> {
    local_depth: usize,
    items: HashMap<K, V>,
}

// The bucket latch guards both the entries and the local depth.
struct Bucket<K, V> {
    latch: Mutex<BucketData<K, V>>,
}

impl<K, V> Bucket<K, V> {
    fn new(local_depth: usize, items: HashMap<K, V>) -> Self {
        Self {
            latch: Mutex::new(BucketData { local_depth, items }),
        }
    }
}

// Directory state guarded by one latch: the slot array, its depth and the
// number of distinct buckets. Slots alias the same bucket whenever that
// bucket's local depth is below the global depth.
struct Directory<K, V> {
    global_depth: usize,
    slots: Vec<Arc<Bucket<K, V>>>,
    num_buckets: usize,
}

// Extendible hash table with a doubling directory and fixed-capacity
// buckets. Buckets split on overflow; they are never coalesced. Lookups
// resolve their slot under the directory latch, drop it, then take only
// the bucket latch. An insert that has to split takes the directory latch
// while still holding the overflowing bucket's latch; that is the only
// place two latches nest.
pub struct ExtendibleHash<K, V, S = RandomState> {
    bucket_size: usize,
    hash_builder: S,
    dir: Mutex<Directory<K, V>>,
}

impl<K, V> ExtendibleHash<K, V, RandomState>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // A bucket capacity must always be given; there is no default.
    pub fn new(bucket_size: usize) -> Self {
        Self::with_hasher(bucket_size, RandomState::new())
    }
}

impl<K, V, S> ExtendibleHash<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    pub fn with_hasher(bucket_size: usize, hash_builder: S) -> Self {
        assert!(bucket_size > 0, "bucket size must be at least 1");
        Self {
            bucket_size,
            hash_builder,
            dir: Mutex::new(Directory {
                global_depth: 0,
                slots: vec![Arc::new(Bucket::new(0, HashMap::new()))],
                num_buckets: 1,
            }),
        }
    }

    fn hash_key(&self, key: &K) -> usize {
        let mut hasher = self.hash_builder.build_hasher();
        key.hash(&mut hasher);
        hasher.finish() as usize
    }

    // low `global_depth` bits of the hash pick the slot
    fn lookup_bucket(&self, key: &K) -> Arc<Bucket<K, V>> {
        let dir = self.dir.lock();
        let slot = self.hash_key(key) & ((1usize << dir.global_depth) - 1);
        Arc::clone(&dir.slots[slot])
    }

    pub fn find(&self, key: &K) -> Option<V> {
        let bucket = self.lookup_bucket(key);
        let data = bucket.latch.lock();
        data.items.get(key).cloned()
    }

    pub fn remove(&self, key: &K) -> bool {
        let bucket = self.lookup_bucket(key);
        let mut data = bucket.latch.lock();
        data.items.remove(key).is_some()
    }

    pub fn insert(&self, key: K, value: V) {
        loop {
            let bucket = self.lookup_bucket(&key);
            let mut data = bucket.latch.lock();
            if data.items.len() < self.bucket_size || data.items.contains_key(&key) {
                data.items.insert(key, value);
                return;
            }

            // overflow: split this bucket and retry against the new layout
            let mut dir = self.dir.lock();
            let slot = self.hash_key(&key) & ((1usize << dir.global_depth) - 1);
            if !Arc::ptr_eq(&dir.slots[slot], &bucket) {
                // the slot was repointed while we waited for the bucket latch
                continue;
            }

            data.local_depth += 1;
            if data.local_depth > dir.global_depth {
                let len = dir.slots.len();
                for i in 0..len {
                    let alias = Arc::clone(&dir.slots[i]);
                    dir.slots.push(alias);
                }
                dir.global_depth += 1;
            }

            // the new high bit decides which entries move to the sibling
            let mask = 1usize << (data.local_depth - 1);
            let moved: Vec<K> = data
                .items
                .keys()
                .filter(|k| self.hash_key(k) & mask != 0)
                .cloned()
                .collect();
            let mut sibling_items = HashMap::with_capacity(moved.len());
            for k in moved {
                if let Some(v) = data.items.remove(&k) {
                    sibling_items.insert(k, v);
                }
            }
            let sibling = Arc::new(Bucket::new(data.local_depth, sibling_items));

            for i in 0..dir.slots.len() {
                if Arc::ptr_eq(&dir.slots[i], &bucket) && i & mask != 0 {
                    dir.slots[i] = Arc::clone(&sibling);
                }
            }
            dir.num_buckets += 1;
        }
    }

    pub fn get_global_depth(&self) -> usize {
        self.dir.lock().global_depth
    }

    pub fn get_num_buckets(&self) -> usize {
        self.dir.lock().num_buckets
    }

    // Local depth of the bucket behind directory slot `bucket_id`.
    // An empty bucket reports -1, the same as an out-of-range slot.
    pub fn get_local_depth(&self, bucket_id: usize) -> i32 {
        let bucket = {
            let dir = self.dir.lock();
            match dir.slots.get(bucket_id) {
                Some(bucket) => Arc::clone(bucket),
                None => return -1,
            }
        };
        let data = bucket.latch.lock();
        if data.items.is_empty() {
            return -1;
        }
        data.local_depth as i32
    }
}
