//! Server-side sender binary: loads `Config` from the environment, runs one
//! session to completion, and logs the final counters. Pre-compression and
//! config-file loading are boundary features and are not performed here.

use std::process::ExitCode;

use bulkxfer::config::Config;

fn main() -> ExitCode {
    let config = Config::from_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter())).init();

    match bulkxfer::session::run(config) {
        Ok(stats) => {
            log::info!(
                "transfer complete: sent={} resent={} acked={}/{} timeouts={}",
                stats.counters.sent,
                stats.counters.resent,
                stats.counters.acked,
                stats.planned,
                stats.counters.timeouts,
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(1)
        }
    }
}
