use std::time::{SystemTime, UNIX_EPOCH};

/// A source of "seconds since an epoch agreed by both peers". Both the
/// handshake bootstrap and every per-chunk `send_time` are drawn from the
/// same clock domain so that RTT arithmetic stays consistent; production
/// code uses wall-clock time (`SystemClock`), tests inject a `Clock` whose
/// readings they fully control.
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the unix epoch")
            .as_secs_f64()
    }
}

#[cfg(test)]
pub mod test_support {
    use super::Clock;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// A clock that starts at a fixed instant and only moves when told to.
    #[derive(Debug, Default)]
    pub struct ManualClock {
        micros: AtomicU64,
    }

    impl ManualClock {
        pub fn new(start_secs: f64) -> Self {
            ManualClock {
                micros: AtomicU64::new((start_secs * 1_000_000.0) as u64),
            }
        }

        pub fn advance(&self, secs: f64) {
            self.micros
                .fetch_add((secs * 1_000_000.0) as u64, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> f64 {
            self.micros.load(Ordering::SeqCst) as f64 / 1_000_000.0
        }
    }
}
