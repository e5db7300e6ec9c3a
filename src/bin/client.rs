//! Minimal reference receiver: exercises the sender's observable protocol
//! end to end for demos and manual testing. Not a hardened client — no
//! retry policy beyond what the protocol itself provides, no MD5
//! verification, no pre-decompression.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use bulkxfer::clock::SystemClock;
use bulkxfer::config::Config;
use bulkxfer::{handshake, wire};

fn main() {
    let config = Config::from_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter())).init();

    let output_path = std::env::var("CLIENT_OUTPUT_PATH").unwrap_or_else(|_| "received.bin".to_string());

    let control_socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).expect("bind control socket");
    let data_socket = UdpSocket::bind(config.client_data_addr()).expect("bind data socket");
    let server_control_addr: SocketAddr = config.control_addr();

    let file_size = handshake::client_handshake(
        &control_socket,
        server_control_addr,
        &data_socket,
        &SystemClock,
    )
    .expect("handshake failed");

    log::info!("handshake established, expecting {file_size} bytes");

    let mut out = OpenOptions::new()
        .create(true)
        .write(true)
        .open(&output_path)
        .expect("open output file");
    out.set_len(file_size).expect("preallocate output file");

    let mut received: HashSet<u64> = HashSet::new();
    let mut received_bytes: u64 = 0;
    let mut buf = vec![0u8; config.chunk_size as usize + wire::CHUNK_HEADER_LEN];

    while received_bytes < file_size {
        let (n, _) = data_socket.recv_from(&mut buf).expect("recv chunk");
        let Some((chunk_id, payload)) = wire::decode_chunk(&buf[..n]) else {
            continue;
        };

        if received.insert(chunk_id) {
            out.seek(SeekFrom::Start(chunk_id)).expect("seek output file");
            out.write_all(payload).expect("write chunk");
            received_bytes += payload.len() as u64;
        }

        let ack = wire::encode_ack(chunk_id);
        let _ = control_socket.send_to(&ack, server_control_addr);
    }

    log::info!("transfer complete, wrote {received_bytes} bytes to {output_path}");
}
