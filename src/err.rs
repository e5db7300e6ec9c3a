use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("source file not found: {0}")]
    FileNotFound(String),

    #[error("handshake failed after {0} retries")]
    HandshakeFailed(u32),

    #[error("malformed SYN datagram: {0:?}")]
    MalformedSyn(Vec<u8>),

    #[error("pre-compression (ENABLE_PRE_ZIP) is not implemented by this engine")]
    PreZipUnsupported,

    #[error("file size {0} cannot be partitioned across {1} threads")]
    BadPartition(u64, usize),
}
