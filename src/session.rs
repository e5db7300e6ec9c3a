//! Ties the Timer Table, RTT Controller, Counters, and sockets together into
//! one `Session` shared by reference across every worker thread.

use std::fs::File;
use std::net::{SocketAddr, UdpSocket};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Mutex;

use log::info;
use socket2::{Domain, Socket, Type};

use crate::clock::Clock;
use crate::config::Config;
use crate::counters::{CounterSnapshot, Counters};
use crate::err::Error;
use crate::handshake;
use crate::partition::{self, ChunkPlan};
use crate::rtt::RttController;
use crate::timer_table::TimerTable;
use crate::workers;

pub type RetransmitItem = (u64, u32);

pub struct Session {
    pub config: Config,
    pub clock: Box<dyn Clock>,

    pub file_path: String,
    pub file_size: u64,
    pub client_data_addr: SocketAddr,

    pub control_socket: UdpSocket,
    pub data_socket: UdpSocket,

    pub timer_table: TimerTable,
    pub rtt: RttController,
    pub counters: Counters,

    pub retransmit_tx: Mutex<mpsc::Sender<RetransmitItem>>,
    pub retransmit_rx: Mutex<mpsc::Receiver<RetransmitItem>>,

    pub shutdown: AtomicBool,
}

/// Final counters snapshot returned once a transfer completes.
#[derive(Debug, Clone, Copy)]
pub struct Stats {
    pub planned: usize,
    pub counters: CounterSnapshot,
}

impl Session {
    /// Opens sockets, validates the source file, builds the partitioning
    /// plan, and seeds the Timer Table with EMPTY entries for every planned
    /// chunk. Does not yet perform the handshake or spawn any workers.
    pub fn new(config: Config, clock: Box<dyn Clock>) -> Result<Self, Error> {
        if config.enable_pre_zip {
            return Err(Error::PreZipUnsupported);
        }

        let path = Path::new(&config.file_path);
        if !path.exists() {
            return Err(Error::FileNotFound(config.file_path.clone()));
        }
        let file_size = std::fs::metadata(path)?.len();

        let control_socket = UdpSocket::bind(config.control_addr())?;
        info!("UDP control socket bound, listening on {}", config.control_addr());

        let data_socket = bind_data_socket(&config)?;
        info!("UDP data socket ready, will target {}", config.client_data_addr());

        let plan = partition::full_plan(file_size, config.send_thread_number, config.chunk_size)?;
        let timer_table = TimerTable::new(&plan);

        let (tx, rx) = mpsc::channel();

        Ok(Session {
            client_data_addr: config.client_data_addr(),
            file_path: config.file_path.clone(),
            file_size,
            config,
            clock,
            control_socket,
            data_socket,
            timer_table,
            rtt: RttController::new(1.0, 4, 3), // replaced once the handshake completes
            counters: Counters::default(),
            retransmit_tx: Mutex::new(tx),
            retransmit_rx: Mutex::new(rx),
            shutdown: AtomicBool::new(false),
        })
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn open_file(&self) -> Result<File, Error> {
        Ok(File::open(&self.file_path)?)
    }

    pub fn is_complete(&self) -> bool {
        self.counters.acked.load(Ordering::Relaxed) as usize >= self.timer_table.planned_count()
            && self.timer_table.is_drained()
    }
}

fn bind_data_socket(config: &Config) -> Result<UdpSocket, Error> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, None)?;
    socket.set_send_buffer_size(config.max_udp_buffer_size)?;
    socket.bind(&"0.0.0.0:0".parse::<SocketAddr>().unwrap().into())?;
    Ok(socket.into())
}

/// Runs a session end to end: handshake, then every worker pool, until the
/// whole plan is acknowledged. Returns the final counters.
pub fn run(config: Config) -> Result<Stats, Error> {
    run_with_clock(config, Box::new(crate::clock::SystemClock))
}

pub fn run_with_clock(config: Config, clock: Box<dyn Clock>) -> Result<Stats, Error> {
    let session = Session::new(config, clock)?;
    run_session(session)
}

/// The handshake-then-spawn-then-wait body of a session, factored out of
/// [`run_with_clock`] so callers (tests, in particular) can build a
/// `Session` themselves — e.g. to bind both peers' sockets and learn the
/// OS-assigned control port before the handshake begins — and then hand it
/// off here to run to completion.
pub fn run_session(mut session: Session) -> Result<Stats, Error> {
    let outcome = handshake::server_handshake(
        &session.control_socket,
        &session.data_socket,
        session.client_data_addr,
        session.file_size,
        &session.config,
        session.clock.as_ref(),
    )?;
    session.rtt = RttController::new(
        outcome.rtt,
        session.config.max_rtt_multiplier,
        session.config.adjust_rtt_threshold,
    );

    // Control-channel reads are non-blocking-with-timeout from here on so
    // every ACK receiver can observe shutdown.
    session.control_socket.set_read_timeout(Some(std::time::Duration::from_millis(200)))?;

    let session = std::sync::Arc::new(session);
    let planned = session.timer_table.planned_count();

    let handles = workers::spawn_all(&session)?;

    // The main thread polls for completion rather than joining the
    // never-exiting daemon pools directly, so shutdown can be requested once
    // every planned chunk is acknowledged.
    loop {
        if session.is_complete() {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(20));
    }

    session.request_shutdown();
    for handle in handles {
        let _ = handle.join();
    }

    Ok(Stats {
        planned,
        counters: session.counters.snapshot(),
    })
}
