//! Retransmit Pool worker: consumes the Retransmit Queue, re-reads the
//! chunk's bytes from the source file, re-arms its Timer Table entry, and
//! re-emits the datagram. Shared by dedicated retransmit threads and by
//! sender threads that have finished their initial range.

use std::io::{Read, Seek, SeekFrom};
use std::sync::atomic::Ordering;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use log::{error, trace};

use crate::session::Session;
use crate::wire;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(session: &Session) {
    retransmit_loop(session);
}

/// The shared consume-one-resend-one loop. Polls the queue with a bounded
/// timeout so it notices `session.shutdown` promptly rather than
/// blocking forever on an empty channel.
pub fn retransmit_loop(session: &Session) {
    let mut file = match session.open_file() {
        Ok(f) => f,
        Err(e) => {
            error!("retransmit worker: cannot open source file: {e}");
            return;
        }
    };

    let mut payload = vec![0u8; session.config.chunk_size as usize];
    let mut datagram = Vec::with_capacity(wire::CHUNK_HEADER_LEN + session.config.chunk_size as usize);

    loop {
        if session.is_shutting_down() {
            return;
        }

        let item = {
            let rx = session.retransmit_rx.lock().unwrap();
            rx.recv_timeout(POLL_INTERVAL)
        };

        let (chunk_id, payload_size) = match item {
            Ok(item) => item,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return,
        };

        if let Err(e) = resend(session, &mut file, chunk_id, payload_size, &mut payload, &mut datagram) {
            error!("retransmit worker: failed to resend chunk {chunk_id}: {e}");
            continue;
        }
        trace!("resent chunk {chunk_id} ({payload_size} bytes)");
    }
}

fn resend(
    session: &Session,
    file: &mut std::fs::File,
    chunk_id: u64,
    payload_size: u32,
    payload: &mut [u8],
    datagram: &mut Vec<u8>,
) -> Result<(), crate::Error> {
    file.seek(SeekFrom::Start(chunk_id))?;
    let buf = &mut payload[..payload_size as usize];
    file.read_exact(buf)?;

    session
        .timer_table
        .install(chunk_id, session.clock.now(), payload_size);

    wire::encode_chunk(chunk_id, buf, datagram);
    session.data_socket.send_to(datagram, session.client_data_addr)?;
    session.counters.resent.fetch_add(1, Ordering::Relaxed);

    Ok(())
}
