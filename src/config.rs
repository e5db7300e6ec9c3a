use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;

/// Process-wide tunables. Mirrors the constants module of the original tool;
/// loading these from a file or CLI is deliberately out of scope, so this is
/// just a plain value with a `Default` and an env-overridable builder for the
/// handful of knobs worth changing without a recompile.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_ip: Ipv4Addr,
    pub server_control_port: u16,

    pub client_ip: Ipv4Addr,
    pub client_data_port: u16,

    pub file_path: String,
    pub zip_file_path: Option<String>,
    pub enable_pre_zip: bool,

    pub chunk_size: u32,
    pub max_udp_buffer_size: usize,

    pub send_thread_number: usize,
    pub ack_handle_thread_number: usize,
    pub timeout_resend_thread_number: usize,

    pub max_rtt_multiplier: u32,
    pub adjust_rtt_threshold: u32,
    pub tcp_syn_retries: u32,

    pub statistic_interval: Duration,
    pub log_mode: LogMode,

    /// Not part of the original constant list: a floor under the timeout
    /// scanner's sleep so a collapsed RTT estimate cannot spin it.
    pub min_scan_interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Normal,
    Debug,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_ip: Ipv4Addr::UNSPECIFIED,
            server_control_port: 9000,

            client_ip: Ipv4Addr::LOCALHOST,
            client_data_port: 9001,

            file_path: String::from("transfer.bin"),
            zip_file_path: None,
            enable_pre_zip: false,

            chunk_size: 1400,
            max_udp_buffer_size: 4 * 1024 * 1024,

            send_thread_number: 4,
            ack_handle_thread_number: 2,
            timeout_resend_thread_number: 2,

            max_rtt_multiplier: 4,
            adjust_rtt_threshold: 3,
            tcp_syn_retries: 5,

            statistic_interval: Duration::from_secs(1),
            log_mode: LogMode::Normal,

            min_scan_interval: Duration::from_millis(5),
        }
    }
}

impl Config {
    /// Overrides the subset of fields commonly varied at deploy time from
    /// environment variables, leaving everything else at its default.
    pub fn from_env() -> Self {
        let mut cfg = Config::default();

        if let Ok(v) = std::env::var("SERVER_CONTROL_PORT") {
            if let Ok(p) = v.parse() {
                cfg.server_control_port = p;
            }
        }
        if let Ok(v) = std::env::var("CLIENT_IP") {
            if let Ok(ip) = Ipv4Addr::from_str(&v) {
                cfg.client_ip = ip;
            }
        }
        if let Ok(v) = std::env::var("CLIENT_DATA_PORT") {
            if let Ok(p) = v.parse() {
                cfg.client_data_port = p;
            }
        }
        if let Ok(v) = std::env::var("FILE_PATH") {
            cfg.file_path = v;
        }
        if let Ok(v) = std::env::var("CHUNK_SIZE") {
            if let Ok(n) = v.parse() {
                cfg.chunk_size = n;
            }
        }
        if let Ok(v) = std::env::var("SERVER_SEND_THREAD_NUMBER") {
            if let Ok(n) = v.parse() {
                cfg.send_thread_number = n;
            }
        }
        if let Ok(v) = std::env::var("SERVER_ACK_HANDLE_THREAD_NUMBER") {
            if let Ok(n) = v.parse() {
                cfg.ack_handle_thread_number = n;
            }
        }
        if let Ok(v) = std::env::var("SERVER_TIMEOUT_RESEND_THREAD_NUMBER") {
            if let Ok(n) = v.parse() {
                cfg.timeout_resend_thread_number = n;
            }
        }
        if std::env::var("LOG_MODE").as_deref() == Ok("DEBUG") {
            cfg.log_mode = LogMode::Debug;
        }

        cfg
    }

    pub fn control_addr(&self) -> std::net::SocketAddr {
        (self.server_ip, self.server_control_port).into()
    }

    pub fn client_data_addr(&self) -> std::net::SocketAddr {
        (self.client_ip, self.client_data_port).into()
    }

    /// The `env_logger` default filter implied by `log_mode`: the original
    /// tool's always-on `self.log` / gated `self.debug` split maps onto
    /// `info`/`debug` levels. `RUST_LOG`, if set, still wins.
    pub fn log_filter(&self) -> &'static str {
        match self.log_mode {
            LogMode::Normal => "info",
            LogMode::Debug => "debug",
        }
    }
}
