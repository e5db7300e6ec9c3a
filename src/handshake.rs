//! The Handshake Engine: a three-way SYN / SYN-ACK / ACK exchange that
//! bootstraps the RTT estimate and announces the file size. Note the
//! asymmetry: the SYN-ACK goes out on the *data* socket, but the client's
//! return ACK is awaited on the *control* socket.

use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use log::{debug, info};

use crate::clock::Clock;
use crate::config::Config;
use crate::err::Error;
use crate::wire;

pub struct HandshakeOutcome {
    pub rtt: f64,
}

/// Runs the server side of the handshake to completion.
/// Blocks on `control_socket` for the initial SYN with no timeout (LISTEN is
/// a patient wait); once in SYN_RCVD, timeouts apply and exhausting
/// `config.tcp_syn_retries` is a fatal `Error::HandshakeFailed`.
pub fn server_handshake(
    control_socket: &UdpSocket,
    data_socket: &UdpSocket,
    client_data_addr: SocketAddr,
    file_size: u64,
    config: &Config,
    clock: &dyn Clock,
) -> Result<HandshakeOutcome, Error> {
    control_socket.set_read_timeout(None)?;

    let mut buf = [0u8; 1024];
    let (n, _) = control_socket.recv_from(&mut buf)?;
    let client_send_time =
        wire::parse_syn(&buf[..n]).ok_or_else(|| Error::MalformedSyn(buf[..n].to_vec()))?;

    info!("received SYN");
    let t0 = clock.now();
    let mut rtt = (t0 - client_send_time) * 2.0;
    debug!("initial rtt estimate = {rtt}");

    data_socket.send_to(&wire::format_synack(file_size), client_data_addr)?;
    info!("sent SYN ACK");

    let mut timeout = rtt * config.max_rtt_multiplier as f64;
    let mut retry = 0u32;

    while retry < config.tcp_syn_retries {
        control_socket.set_read_timeout(Some(duration_from_secs_f64(timeout)))?;

        match control_socket.recv_from(&mut buf) {
            Ok(_) => {
                info!("received ACK");
                rtt = clock.now() - t0;
                info!("connection established, rtt = {rtt}");
                return Ok(HandshakeOutcome { rtt });
            }
            Err(e) if is_timeout(&e) => {
                retry += 1;
                timeout *= 4.0;
                rtt *= 4.0;
                info!("ACK timeout, backing off (retry {retry})");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(Error::HandshakeFailed(config.tcp_syn_retries))
}

fn is_timeout(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

fn duration_from_secs_f64(secs: f64) -> Duration {
    Duration::from_secs_f64(secs.max(0.000_001))
}

/// Reference client-side handshake, used by the demo receiver binary and by
/// integration tests; not part of the sender engine itself, but needed to
/// drive it.
pub fn client_handshake(
    control_socket: &UdpSocket,
    server_control_addr: SocketAddr,
    data_socket: &UdpSocket,
    clock: &dyn Clock,
) -> Result<u64, Error> {
    let send_time = clock.now();
    control_socket.send_to(&wire::format_syn(send_time), server_control_addr)?;

    let mut buf = [0u8; 1024];
    let (n, _) = data_socket.recv_from(&mut buf)?;
    let file_size =
        wire::parse_synack(&buf[..n]).ok_or_else(|| Error::MalformedSyn(buf[..n].to_vec()))?;

    control_socket.send_to(b"ACK", server_control_addr)?;

    Ok(file_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_support::ManualClock;
    use std::net::Ipv4Addr;
    use std::thread;

    fn bound_socket() -> UdpSocket {
        UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap()
    }

    #[test]
    fn happy_path_establishes_on_first_ack() {
        let server_control = bound_socket();
        let server_data = bound_socket();
        let client_control = bound_socket();
        let client_data = bound_socket();

        let server_control_addr = server_control.local_addr().unwrap();
        let client_data_addr = client_data.local_addr().unwrap();

        let clock = ManualClock::new(1000.0);
        let config = Config {
            client_data_port: client_data_addr.port(),
            ..Config::default()
        };

        let client = thread::spawn(move || {
            client_handshake(&client_control, server_control_addr, &client_data, &ManualClock::new(999.0))
        });

        let outcome =
            server_handshake(&server_control, &server_data, client_data_addr, 1024, &config, &clock)
                .unwrap();

        assert!(outcome.rtt > 0.0);
        let file_size = client.join().unwrap().unwrap();
        assert_eq!(file_size, 1024);
    }

    #[test]
    fn exhausting_retries_is_fatal() {
        let server_control = bound_socket();
        let server_data = bound_socket();
        // No client ever answers the SYN beyond the first datagram.
        let sender = bound_socket();
        let sender_addr = server_control.local_addr().unwrap();
        sender
            .send_to(&wire::format_syn(0.0), sender_addr)
            .unwrap();

        let clock = ManualClock::new(0.001);
        let mut config = Config::default();
        config.tcp_syn_retries = 1;

        let err = server_handshake(
            &server_control,
            &server_data,
            "127.0.0.1:1".parse().unwrap(),
            1,
            &config,
            &clock,
        )
        .unwrap_err();

        assert!(matches!(err, Error::HandshakeFailed(1)));
    }
}
