#![no_main]

use libfuzzer_sys::fuzz_target;
use lrukit::ds::RecencyList;

// Fuzz arbitrary operation sequences on RecencyList
//
// Tests random sequences of push_front, pop_back, move_to_front, remove,
// get and clear, including operations on stale handles.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut list: RecencyList<u32> = RecencyList::new();
    let mut all_ids = Vec::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 6;
        let value = u32::from(pair[1]);

        match op {
            0 => {
                // push_front
                let id = list.push_front(value);
                all_ids.push(id);

                assert_eq!(list.front(), Ok(&value));
                assert_eq!(list.front_id(), Some(id));
                assert_eq!(list.get(id), Some(&value));
            },
            1 => {
                // pop_back
                let old_len = list.len();
                match list.pop_back() {
                    Ok(_) => assert_eq!(list.len(), old_len - 1),
                    Err(_) => assert_eq!(old_len, 0),
                }
            },
            2 => {
                // move_to_front
                if !all_ids.is_empty() {
                    let id = all_ids[(value as usize) % all_ids.len()];
                    let live = list.contains(id);
                    let moved = list.move_to_front(id);
                    assert_eq!(moved.is_ok(), live);
                    if live {
                        assert_eq!(list.front_id(), Some(id));
                    }
                }
            },
            3 => {
                // remove
                if !all_ids.is_empty() {
                    let id = all_ids[(value as usize) % all_ids.len()];
                    let live = list.contains(id);
                    let old_len = list.len();
                    assert_eq!(list.remove(id).is_ok(), live);
                    assert!(!list.contains(id));
                    if live {
                        assert_eq!(list.len(), old_len - 1);
                    }
                }
            },
            4 => {
                // get
                if !all_ids.is_empty() {
                    let id = all_ids[(value as usize) % all_ids.len()];
                    assert_eq!(list.get(id).is_some(), list.contains(id));
                }
            },
            _ => {
                // clear
                if value % 8 == 0 {
                    list.clear();
                    assert!(list.is_empty());
                    assert!(list.front().is_err());
                    assert!(list.back().is_err());
                }
            },
        }

        assert_eq!(list.iter().count(), list.len());
        assert_eq!(list.iter_entries().count(), list.len());
        assert_eq!(list.front_id().is_some(), !list.is_empty());
        assert_eq!(list.back_id().is_some(), !list.is_empty());
    }
});
