//! ACK Receiver Pool worker: reads ACK datagrams off the control socket,
//! feeds the RTT Controller a sample, and clears the Timer Table entry.
//! Multiple workers block on the same socket concurrently; the OS hands each
//! arriving datagram to exactly one of them.

use std::sync::atomic::Ordering;

use log::trace;

use crate::session::Session;
use crate::wire;

pub fn run(thread_id: usize, session: &Session) {
    let mut buf = [0u8; 1024];

    loop {
        if session.is_shutting_down() {
            return;
        }

        let n = match session.control_socket.recv_from(&mut buf) {
            Ok((n, _)) => n,
            Err(e) if is_timeout(&e) => continue,
            Err(e) => {
                log::warn!("ack-recv-{thread_id}: socket error: {e}");
                continue;
            }
        };

        let Some(chunk_id) = wire::decode_ack(&buf[..n]) else {
            trace!("ack-recv-{thread_id}: discarding undersized datagram ({n} bytes)");
            continue;
        };

        let Some((send_time, _payload_size)) = session.timer_table.fetch(chunk_id) else {
            trace!("ack-recv-{thread_id}: duplicate or unknown ack for chunk {chunk_id}");
            continue;
        };

        let sample = session.clock.now() - send_time;
        session.rtt.sample(sample, &session.counters);

        session.timer_table.clear(chunk_id);
        session.counters.acked.fetch_add(1, Ordering::Relaxed);
    }
}

fn is_timeout(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}
