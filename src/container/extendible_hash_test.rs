use crate::container::extendible_hash::ExtendibleHash;
use std::hash::{BuildHasher, Hasher};
use std::sync::Arc;

// Hashes a key to itself so tests can steer which bucket it lands in.
#[derive(Clone, Default)]
struct IdentityState;

struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }
    fn write(&mut self, bytes: &[u8]) {
        let mut buf = [0u8; 8];
        let n = bytes.len().min(8);
        buf[..n].copy_from_slice(&bytes[..n]);
        self.0 = u64::from_le_bytes(buf);
    }
    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

impl BuildHasher for IdentityState {
    type Hasher = IdentityHasher;
    fn build_hasher(&self) -> IdentityHasher {
        IdentityHasher(0)
    }
}

#[test]
fn test_insert_find_remove() {
    let table: ExtendibleHash<u64, String> = ExtendibleHash::new(4);

    table.insert(1, "a".to_string());
    table.insert(2, "b".to_string());
    table.insert(3, "c".to_string());

    assert_eq!(table.find(&1), Some("a".to_string()));
    assert_eq!(table.find(&2), Some("b".to_string()));
    assert_eq!(table.find(&3), Some("c".to_string()));
    assert_eq!(table.find(&4), None);

    assert!(table.remove(&2));
    assert_eq!(table.find(&2), None);
    assert!(!table.remove(&2));
}

#[test]
fn test_insert_overwrites_existing_key() {
    // both keys share every low bit the table could mask with
    let table = ExtendibleHash::with_hasher(2, IdentityState);
    table.insert(0u64, 10u64);
    table.insert(4u64, 11u64);

    // the bucket is full, but rewriting a resident key must not split
    table.insert(0u64, 12u64);
    assert_eq!(table.find(&0), Some(12));
    assert_eq!(table.get_global_depth(), 0);
    assert_eq!(table.get_num_buckets(), 1);
}

#[test]
fn test_local_depth_reporting() {
    let table: ExtendibleHash<u64, u64> = ExtendibleHash::new(4);

    // a fresh table has a single empty bucket
    assert_eq!(table.get_global_depth(), 0);
    assert_eq!(table.get_num_buckets(), 1);
    assert_eq!(table.get_local_depth(0), -1);
    assert_eq!(table.get_local_depth(100), -1);

    table.insert(1, 1);
    assert_eq!(table.get_local_depth(0), 0);
}

#[test]
fn test_split_and_directory_doubling() {
    let table = ExtendibleHash::with_hasher(2, IdentityState);

    for key in [0b00u64, 0b01, 0b11, 0b10, 0b110] {
        table.insert(key, key);
    }

    // two low bits are enough to keep every bucket within capacity
    assert_eq!(table.get_global_depth(), 2);
    assert_eq!(table.get_num_buckets(), 3);

    for key in [0b00u64, 0b01, 0b11, 0b10, 0b110] {
        assert_eq!(table.find(&key), Some(key));
    }

    // slots 0 and 2 hold split buckets, slots 1 and 3 alias the same one
    assert_eq!(table.get_local_depth(0), 2);
    assert_eq!(table.get_local_depth(1), 1);
    assert_eq!(table.get_local_depth(2), 2);
    assert_eq!(table.get_local_depth(3), 1);
}

#[test]
fn test_split_until_keys_separate() {
    let table = ExtendibleHash::with_hasher(1, IdentityState);

    for key in 0..8u64 {
        table.insert(key, key * 10);
    }

    // capacity one forces singleton buckets: three bits separate 0..8
    assert_eq!(table.get_global_depth(), 3);
    assert_eq!(table.get_num_buckets(), 8);
    for key in 0..8u64 {
        assert_eq!(table.find(&key), Some(key * 10));
        assert_eq!(table.get_local_depth(key as usize), 3);
    }
}

#[test]
fn test_many_inserts_then_removes() {
    let table: ExtendibleHash<u64, u64> = ExtendibleHash::new(4);

    for key in 0..1000u64 {
        table.insert(key, key * 2);
    }
    for key in 0..1000u64 {
        assert_eq!(table.find(&key), Some(key * 2));
    }

    let global_depth = table.get_global_depth();
    assert!(table.get_num_buckets() > 1);
    for slot in 0..(1usize << global_depth) {
        assert!(table.get_local_depth(slot) <= global_depth as i32);
    }

    for key in (0..1000u64).step_by(2) {
        assert!(table.remove(&key));
    }
    for key in 0..1000u64 {
        if key % 2 == 0 {
            assert_eq!(table.find(&key), None);
        } else {
            assert_eq!(table.find(&key), Some(key * 2));
        }
    }
}

#[test]
fn test_concurrent_inserts() {
    let table: Arc<ExtendibleHash<u64, u64>> = Arc::new(ExtendibleHash::new(4));

    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let table = Arc::clone(&table);
            std::thread::spawn(move || {
                for i in 0..500u64 {
                    let key = t * 1000 + i;
                    table.insert(key, key + 7);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for t in 0..4u64 {
        for i in 0..500u64 {
            let key = t * 1000 + i;
            assert_eq!(table.find(&key), Some(key + 7));
        }
    }
}
