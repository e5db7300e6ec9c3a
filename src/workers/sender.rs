//! Sender Pool worker: streams one thread's contiguous byte range as chunk
//! datagrams, installing a Timer Table entry before each dispatch. Once its
//! range is exhausted the worker does not exit — it joins the Retransmit
//! Pool's loop; a worker terminates only on global shutdown.

use std::io::{Read, Seek, SeekFrom};

use log::{debug, warn};

use crate::partition::{self, ThreadRange};
use crate::session::Session;
use crate::wire;

use super::retransmit;

pub fn run(range: ThreadRange, session: &Session) {
    if let Err(e) = send_range(&range, session) {
        warn!("sender-{}: aborting range after error: {e}", range.thread_id);
        return;
    }

    debug!("sender-{}: range exhausted, joining retransmit pool", range.thread_id);
    retransmit::retransmit_loop(session);
}

fn send_range(range: &ThreadRange, session: &Session) -> Result<(), crate::Error> {
    let mut file = session.open_file()?;
    file.seek(SeekFrom::Start(range.start_offset))?;

    let plan = partition::plan_chunks_for_range(range, session.config.chunk_size);
    let mut payload = vec![0u8; session.config.chunk_size as usize];
    let mut datagram = Vec::with_capacity(wire::CHUNK_HEADER_LEN + session.config.chunk_size as usize);

    for chunk in plan {
        if session.is_shutting_down() {
            return Ok(());
        }

        let buf = &mut payload[..chunk.payload_size as usize];
        file.read_exact(buf)?;

        // Install before dispatch: an ACK racing the send must always find a
        // record, never a gap.
        session
            .timer_table
            .install(chunk.chunk_id, session.clock.now(), chunk.payload_size);

        wire::encode_chunk(chunk.chunk_id, buf, &mut datagram);
        session.data_socket.send_to(&datagram, session.client_data_addr)?;
        session.counters.sent.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }

    Ok(())
}
