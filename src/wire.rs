//! On-the-wire encodings for the control and data channels.

use once_cell::sync::Lazy;
use regex::Regex;

/// `8-byte big-endian Chunk ID || payload`, used for both data-channel chunk
/// datagrams and control-channel ACKs — an ACK is simply the header with no
/// payload.
pub const CHUNK_HEADER_LEN: usize = 8;

pub fn encode_chunk(chunk_id: u64, payload: &[u8], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(CHUNK_HEADER_LEN + payload.len());
    out.extend_from_slice(&chunk_id.to_be_bytes());
    out.extend_from_slice(payload);
}

pub fn encode_ack(chunk_id: u64) -> [u8; CHUNK_HEADER_LEN] {
    chunk_id.to_be_bytes()
}

/// Datagrams shorter than 8 bytes are spurious; anything at or past that
/// length yields a Chunk ID from its first 8 bytes.
pub fn decode_ack(datagram: &[u8]) -> Option<u64> {
    if datagram.len() < CHUNK_HEADER_LEN {
        return None;
    }
    let mut buf = [0u8; CHUNK_HEADER_LEN];
    buf.copy_from_slice(&datagram[..CHUNK_HEADER_LEN]);
    Some(u64::from_be_bytes(buf))
}

/// Splits a data-channel chunk datagram into (Chunk ID, payload).
pub fn decode_chunk(datagram: &[u8]) -> Option<(u64, &[u8])> {
    if datagram.len() < CHUNK_HEADER_LEN {
        return None;
    }
    let mut buf = [0u8; CHUNK_HEADER_LEN];
    buf.copy_from_slice(&datagram[..CHUNK_HEADER_LEN]);
    Some((u64::from_be_bytes(buf), &datagram[CHUNK_HEADER_LEN..]))
}

/// `SYN_PATTERN`: the client's connect preamble, an ASCII line carrying its
/// send timestamp under a named `time` capture.
static SYN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^SYN (?P<time>[0-9]+(?:\.[0-9]+)?)$").expect("valid regex"));

pub fn format_syn(send_time: f64) -> Vec<u8> {
    format!("SYN {send_time}").into_bytes()
}

pub fn parse_syn(datagram: &[u8]) -> Option<f64> {
    let text = std::str::from_utf8(datagram).ok()?;
    let caps = SYN_PATTERN.captures(text.trim())?;
    caps.name("time")?.as_str().parse().ok()
}

pub fn format_synack(file_size: u64) -> Vec<u8> {
    format!("SYN ACK {file_size}").into_bytes()
}

static SYNACK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^SYN ACK (?P<size>[0-9]+)$").expect("valid regex"));

pub fn parse_synack(datagram: &[u8]) -> Option<u64> {
    let text = std::str::from_utf8(datagram).ok()?;
    let caps = SYNACK_PATTERN.captures(text.trim())?;
    caps.name("size")?.as_str().parse().ok()
}
