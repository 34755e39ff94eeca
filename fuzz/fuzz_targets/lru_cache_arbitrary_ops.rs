#![no_main]

use libfuzzer_sys::fuzz_target;
use lrukit::policy::lru::LruCache;

// Fuzz arbitrary operation sequences on LruCache
//
// Byte 0 picks the starting capacity, then each pair of bytes is an
// (operation, key) pair. A Vec model tracks the expected recency order.
fuzz_target!(|data: &[u8]| {
    let Some((&first, rest)) = data.split_first() else {
        return;
    };

    let mut capacity = usize::from(first % 16) + 1;
    let mut cache: LruCache<u8, u32> = LruCache::new(capacity);
    // Most recently used first.
    let mut model: Vec<(u8, u32)> = Vec::new();

    for (step, pair) in rest.chunks_exact(2).enumerate() {
        let op = pair[0] % 9;
        let key = pair[1] % 32;
        let value = step as u32;

        match op {
            0 => {
                // insert
                let expected = match model.iter().position(|(k, _)| *k == key) {
                    Some(pos) => Some(model.remove(pos).1),
                    None => {
                        if model.len() >= capacity {
                            model.pop();
                        }
                        None
                    },
                };
                model.insert(0, (key, value));
                assert_eq!(cache.insert(key, value), expected);
            },
            1 => {
                // index_set
                let expected = model
                    .iter()
                    .position(|(k, _)| *k == key)
                    .map(|pos| model.remove(pos).1);
                model.insert(0, (key, value));
                assert_eq!(cache.index_set(key, value), expected);
            },
            2 => {
                // get
                match model.iter().position(|(k, _)| *k == key) {
                    Some(pos) => {
                        let entry = model.remove(pos);
                        model.insert(0, entry);
                        assert_eq!(cache.get(&key).copied(), Ok(entry.1));
                    },
                    None => assert!(cache.get(&key).is_err()),
                }
            },
            3 => {
                // contains_key
                let pos = model.iter().position(|(k, _)| *k == key);
                if let Some(pos) = pos {
                    let entry = model.remove(pos);
                    model.insert(0, entry);
                }
                assert_eq!(cache.contains_key(&key), pos.is_some());
            },
            4 => {
                // remove
                let pos = model.iter().position(|(k, _)| *k == key);
                if let Some(pos) = pos {
                    model.remove(pos);
                }
                assert_eq!(cache.remove(&key), pos.is_some());
            },
            5 => {
                // peek
                let expected = model.iter().find(|(k, _)| *k == key).map(|(_, v)| v);
                assert_eq!(cache.peek(&key), expected);
            },
            6 => {
                // set_capacity
                capacity = usize::from(key % 16) + 1;
                cache.set_capacity(capacity).unwrap();
            },
            7 => {
                // enforce_capacity
                let evicted = cache.enforce_capacity();
                let keep = model.len().min(capacity);
                let mut expected: Vec<_> = model.split_off(keep);
                expected.reverse();
                assert_eq!(evicted, expected);
            },
            _ => {
                // clear
                if key == 0 {
                    cache.clear();
                    model.clear();
                }
            },
        }

        assert_eq!(cache.len(), model.len());
        assert_eq!(cache.most_recent().ok(), model.first().map(|(_, v)| v));
        assert_eq!(cache.least_recent().ok(), model.last().map(|(_, v)| v));
    }

    assert_eq!(cache.to_vec(), model);
    cache.check_invariants().unwrap();
});
