use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use crate::engines::EngineData;
use crate::name::CanonicalName;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SharedMemoryKey {
    pub receiver: CanonicalName,
    pub sender: CanonicalName,
    pub communication_id: i64,
}

/// Payloads in transit between services of one DPE.
///
/// An entry is written by the sender's dispatcher and taken exactly once by
/// the receiver. Only receivers deployed on this DPE accept entries, so a
/// payload for a missing service is never stored.
#[derive(Debug, Default)]
pub struct SharedMemory {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    receivers: HashSet<CanonicalName>,
    entries: HashMap<SharedMemoryKey, EngineData>,
}

impl SharedMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept entries for `receiver` from now on.
    pub fn open_receiver(&self, receiver: &CanonicalName) {
        self.inner.lock().receivers.insert(receiver.clone());
    }

    /// Stop accepting entries for `receiver` and drop the ones waiting for
    /// it, returning how many were dropped.
    pub fn close_receiver(&self, receiver: &CanonicalName) -> usize {
        let mut inner = self.inner.lock();
        inner.receivers.remove(receiver);
        let before = inner.entries.len();
        inner.entries.retain(|key, _| &key.receiver != receiver);
        before - inner.entries.len()
    }

    pub fn is_open(&self, receiver: &CanonicalName) -> bool {
        self.inner.lock().receivers.contains(receiver)
    }

    /// Store `data` unless the receiver is not open. Returns whether it was
    /// stored.
    pub fn put(&self, key: SharedMemoryKey, data: EngineData) -> bool {
        let mut inner = self.inner.lock();
        if !inner.receivers.contains(&key.receiver) {
            return false;
        }
        inner.entries.insert(key, data);
        true
    }

    pub fn take(&self, key: &SharedMemoryKey) -> Option<EngineData> {
        self.inner.lock().entries.remove(key)
    }

    pub fn contains(&self, key: &SharedMemoryKey) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(receiver: &str, id: i64) -> SharedMemoryKey {
        SharedMemoryKey {
            receiver: receiver.parse().unwrap(),
            sender: "10.1.1.1_java:c:A".parse().unwrap(),
            communication_id: id,
        }
    }

    fn open(receivers: &[&str]) -> SharedMemory {
        let memory = SharedMemory::new();
        for receiver in receivers {
            memory.open_receiver(&receiver.parse().unwrap());
        }
        memory
    }

    #[test]
    fn test_take_is_single_use() {
        let memory = open(&["10.1.1.1_java:c:B"]);
        assert!(memory.put(key("10.1.1.1_java:c:B", 1), EngineData::text("x")));
        assert!(memory.contains(&key("10.1.1.1_java:c:B", 1)));
        assert!(!memory.contains(&key("10.1.1.1_java:c:B", 2)));

        assert_eq!(memory.take(&key("10.1.1.1_java:c:B", 1)), Some(EngineData::text("x")));
        assert_eq!(memory.take(&key("10.1.1.1_java:c:B", 1)), None);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_unknown_receiver_is_refused() {
        let memory = open(&["10.1.1.1_java:c:B"]);
        assert!(!memory.put(key("10.1.1.1_java:c:Nobody", 1), EngineData::text("x")));
        assert!(memory.is_empty());
    }

    #[test]
    fn test_close_receiver() {
        let memory = open(&["10.1.1.1_java:c:B", "10.1.1.1_java:c:C"]);
        memory.put(key("10.1.1.1_java:c:B", 1), EngineData::text("x"));
        memory.put(key("10.1.1.1_java:c:B", 2), EngineData::text("y"));
        memory.put(key("10.1.1.1_java:c:C", 1), EngineData::text("z"));

        let b: CanonicalName = "10.1.1.1_java:c:B".parse().unwrap();
        assert_eq!(memory.close_receiver(&b), 2);
        assert_eq!(memory.len(), 1);
        assert!(!memory.is_open(&b));
        assert!(!memory.put(key("10.1.1.1_java:c:B", 3), EngineData::text("late")));
        assert_eq!(memory.len(), 1);
    }
}
