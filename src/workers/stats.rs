//! Statistics Reporter: periodically logs a counters snapshot. Observability
//! only — nothing here feeds back into protocol correctness.

use log::info;

use crate::session::Session;

use super::interruptible_sleep;

pub fn run(session: &Session) {
    loop {
        interruptible_sleep(session, session.config.statistic_interval);
        if session.is_shutting_down() {
            return;
        }

        let snapshot = session.counters.snapshot();
        let planned = session.timer_table.planned_count();

        info!(
            "sent={}/{planned} resent={} acked={} timeouts={} loss_ratio={:.4}",
            snapshot.sent,
            snapshot.resent,
            snapshot.acked,
            snapshot.timeouts,
            snapshot.loss_ratio(),
        );
    }
}
