//! A bulk-file transfer engine built on UDP: a three-way handshake, parallel
//! chunked transmission of a known-size file, per-chunk timers, selective
//! acknowledgment, adaptive retransmission, and RTT adaptation driven by
//! acknowledgment latency. This crate covers the server-side sender; the
//! client/receiver shipped under `src/bin/client.rs` is a minimal reference
//! implementation used to exercise the sender end to end, not a hardened
//! receiver.

pub mod clock;
pub mod config;
pub mod counters;
pub mod err;
pub mod handshake;
pub mod partition;
pub mod rtt;
pub mod session;
pub mod timer_table;
pub mod wire;
pub mod workers;

pub use config::Config;
pub use err::Error;
pub use session::{Session, Stats};
