//! The five worker pools that make up the engine: Sender Pool, ACK Receiver
//! Pool, Timeout Scanner, Retransmit Pool, and Statistics Reporter. Each
//! submodule owns one role; `spawn_all` wires them to a shared `Session`.

mod ack_receiver;
mod retransmit;
mod scanner;
mod sender;
mod stats;

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::err::Error;
use crate::partition;
use crate::session::Session;

/// How often a long sleep re-checks the shutdown flag (shared by the
/// scanner's RTT-paced sleep and the stats reporter's fixed interval).
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// Sleeps up to `total`, waking early (and returning immediately) once
/// `session.shutdown` is observed, so daemon loops stay responsive without
/// a condvar.
fn interruptible_sleep(session: &Session, total: Duration) {
    let mut remaining = total;
    while remaining > Duration::ZERO {
        if session.is_shutting_down() {
            return;
        }
        let slice = remaining.min(SHUTDOWN_POLL);
        thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
}

pub fn spawn_all(session: &Arc<Session>) -> Result<Vec<JoinHandle<()>>, Error> {
    let mut handles = Vec::new();

    let ranges = partition::partition_ranges(session.file_size, session.config.send_thread_number)?;

    for range in ranges {
        let session = Arc::clone(session);
        handles.push(
            thread::Builder::new()
                .name(format!("sender-{}", range.thread_id))
                .spawn(move || sender::run(range, &session))
                .expect("failed to spawn sender thread"),
        );
    }

    for thread_id in 0..session.config.ack_handle_thread_number {
        let session = Arc::clone(session);
        handles.push(
            thread::Builder::new()
                .name(format!("ack-recv-{thread_id}"))
                .spawn(move || ack_receiver::run(thread_id, &session))
                .expect("failed to spawn ack receiver thread"),
        );
    }

    {
        let session = Arc::clone(session);
        handles.push(
            thread::Builder::new()
                .name("timeout-scanner".into())
                .spawn(move || scanner::run(&session))
                .expect("failed to spawn timeout scanner thread"),
        );
    }

    for thread_id in 0..session.config.timeout_resend_thread_number {
        let session = Arc::clone(session);
        handles.push(
            thread::Builder::new()
                .name(format!("retransmit-{thread_id}"))
                .spawn(move || retransmit::run(&session))
                .expect("failed to spawn retransmit thread"),
        );
    }

    {
        let session = Arc::clone(session);
        handles.push(
            thread::Builder::new()
                .name("stats-reporter".into())
                .spawn(move || stats::run(&session))
                .expect("failed to spawn stats reporter thread"),
        );
    }

    Ok(handles)
}
