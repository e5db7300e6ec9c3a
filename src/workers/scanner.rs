//! Timeout Scanner: the single thread that walks the Timer Table looking for
//! chunks past their deadline and hands them to the Retransmit Pool.
//! Clearing the entry happens in the same critical section as the scan so a
//! chunk can never be enqueued twice before its retransmit reinstalls the
//! record.

use std::sync::atomic::Ordering;
use std::time::Duration;

use log::trace;

use crate::session::Session;

use super::interruptible_sleep;

pub fn run(session: &Session) {
    loop {
        if session.is_shutting_down() {
            return;
        }

        let rtt = session.rtt.current();
        let interval = Duration::from_secs_f64(rtt.max(0.0)).max(session.config.min_scan_interval);
        interruptible_sleep(session, interval);
        if session.is_shutting_down() {
            return;
        }

        let threshold = rtt * session.config.max_rtt_multiplier as f64;
        let now = session.clock.now();
        let expired = session.timer_table.scan_and_evict(now, threshold);

        for (chunk_id, payload_size) in expired {
            trace!("scanner: chunk {chunk_id} timed out, enqueuing for retransmit");
            let tx = session.retransmit_tx.lock().unwrap();
            let _ = tx.send((chunk_id, payload_size));
            session.counters.timeouts.fetch_add(1, Ordering::Relaxed);
        }
    }
}
