//! The Timer Table: a dense, pre-sized record of every chunk this session
//! will ever send, toggling between EMPTY and in-flight. Backed by a dense
//! `Vec` indexed by plan position rather than a hash map keyed directly on
//! Chunk ID, so the scanner can walk it in one linear pass; a side index
//! gives ACK/clear lookups O(1) access by Chunk ID.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::partition::ChunkPlan;

#[derive(Debug, Clone, Copy)]
enum Slot {
    Empty,
    InFlight { send_time: f64, payload_size: u32 },
}

struct Inner {
    slots: Vec<Slot>,
}

pub struct TimerTable {
    index: HashMap<u64, usize>,
    inner: Mutex<Inner>,
}

impl TimerTable {
    pub fn new(plan: &[ChunkPlan]) -> Self {
        let mut index = HashMap::with_capacity(plan.len());
        let mut slots = Vec::with_capacity(plan.len());
        for (i, chunk) in plan.iter().enumerate() {
            index.insert(chunk.chunk_id, i);
            slots.push(Slot::Empty);
        }
        TimerTable {
            index,
            inner: Mutex::new(Inner { slots }),
        }
    }

    pub fn planned_count(&self) -> usize {
        self.index.len()
    }

    /// Installs (or re-installs, for a retransmit) an InFlight record. Must
    /// only be called with a Chunk ID that was part of the original plan:
    /// every planned Chunk ID has exactly one entry for the session's
    /// lifetime.
    pub fn install(&self, chunk_id: u64, send_time: f64, payload_size: u32) {
        let &i = self
            .index
            .get(&chunk_id)
            .expect("install() called with a chunk id outside the partitioning plan");
        let mut inner = self.inner.lock().unwrap();
        inner.slots[i] = Slot::InFlight {
            send_time,
            payload_size,
        };
    }

    /// Fetch without clearing. Returns `None` for an unknown or already-EMPTY
    /// chunk id — both are spurious/duplicate ACKs.
    pub fn fetch(&self, chunk_id: u64) -> Option<(f64, u32)> {
        let i = *self.index.get(&chunk_id)?;
        let inner = self.inner.lock().unwrap();
        match inner.slots[i] {
            Slot::Empty => None,
            Slot::InFlight {
                send_time,
                payload_size,
            } => Some((send_time, payload_size)),
        }
    }

    /// Clear to EMPTY. Idempotent — clearing an already-EMPTY slot is a
    /// no-op.
    pub fn clear(&self, chunk_id: u64) {
        if let Some(&i) = self.index.get(&chunk_id) {
            let mut inner = self.inner.lock().unwrap();
            inner.slots[i] = Slot::Empty;
        }
    }

    /// Scans every non-EMPTY slot under a single lock, evicting (to EMPTY)
    /// and collecting every one older than `threshold` seconds as of `now`.
    /// Eviction happens in the same critical section as the scan so a chunk
    /// can never be double-enqueued across two scanner passes.
    pub fn scan_and_evict(&self, now: f64, threshold: f64) -> Vec<(u64, u32)> {
        let mut expired = Vec::new();
        let mut inner = self.inner.lock().unwrap();
        for (&chunk_id, &i) in self.index.iter() {
            if let Slot::InFlight {
                send_time,
                payload_size,
            } = inner.slots[i]
            {
                if now - send_time > threshold {
                    expired.push((chunk_id, payload_size));
                    inner.slots[i] = Slot::Empty;
                }
            }
        }
        expired
    }

    /// True once every slot has returned to EMPTY (successful completion has
    /// no chunks left in flight).
    pub fn is_drained(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner
            .slots
            .iter()
            .all(|slot| matches!(slot, Slot::Empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(ids: &[u64]) -> Vec<ChunkPlan> {
        ids.iter()
            .map(|&chunk_id| ChunkPlan {
                chunk_id,
                payload_size: 4,
            })
            .collect()
    }

    #[test]
    fn fresh_table_is_drained() {
        let table = TimerTable::new(&plan(&[0, 4, 8]));
        assert!(table.is_drained());
        assert_eq!(table.planned_count(), 3);
    }

    #[test]
    fn install_then_clear_round_trips() {
        let table = TimerTable::new(&plan(&[0]));
        table.install(0, 1.0, 4);
        assert!(!table.is_drained());
        assert_eq!(table.fetch(0), Some((1.0, 4)));
        table.clear(0);
        assert!(table.is_drained());
    }

    #[test]
    fn duplicate_ack_is_a_noop_fetch() {
        let table = TimerTable::new(&plan(&[0]));
        table.install(0, 1.0, 4);
        table.clear(0);
        assert_eq!(table.fetch(0), None);
        table.clear(0); // clearing twice must not panic
    }

    #[test]
    fn scan_evicts_only_expired_inflight_entries() {
        let table = TimerTable::new(&plan(&[0, 4, 8]));
        table.install(0, 1.0, 4);
        table.install(4, 9.0, 4); // fresh, should survive the scan
        // chunk_id 8 stays EMPTY

        let mut expired = table.scan_and_evict(10.0, 2.0);
        expired.sort();
        assert_eq!(expired, vec![(0, 4)]);
        assert_eq!(table.fetch(0), None);
        assert_eq!(table.fetch(4), Some((9.0, 4)));
    }

    #[test]
    fn scan_is_idempotent_across_passes() {
        let table = TimerTable::new(&plan(&[0]));
        table.install(0, 1.0, 4);
        assert_eq!(table.scan_and_evict(10.0, 2.0), vec![(0, 4)]);
        assert_eq!(table.scan_and_evict(20.0, 2.0), Vec::new());
    }
}
