//! The RTT Controller: a hysteresis-smoothed RTT estimate, nudged up or down
//! only after `ADJUST_RTT_THRESHOLD` consecutive outlier samples in the same
//! direction.

use std::sync::Mutex;

use crate::counters::Counters;

struct State {
    rtt: f64,
    up_counter: u32,
    down_counter: u32,
}

pub struct RttController {
    max_rtt_multiplier: u32,
    adjust_rtt_threshold: u32,
    state: Mutex<State>,
}

impl RttController {
    pub fn new(initial_rtt: f64, max_rtt_multiplier: u32, adjust_rtt_threshold: u32) -> Self {
        assert!(initial_rtt > 0.0, "RTT estimate must be strictly positive");
        RttController {
            max_rtt_multiplier,
            adjust_rtt_threshold,
            state: Mutex::new(State {
                rtt: initial_rtt,
                up_counter: 0,
                down_counter: 0,
            }),
        }
    }

    pub fn current(&self) -> f64 {
        self.state.lock().unwrap().rtt
    }

    /// Feeds one observed sample RTT through the hysteresis logic,
    /// incrementing `counters.rtt_increase`/`rtt_decrease` whenever an
    /// adjustment commits.
    pub fn sample(&self, s: f64, counters: &Counters) {
        let mult = self.max_rtt_multiplier as f64;
        // `MAX_RTT_MULT // 2`: floor division, not float division — for
        // MULT=4 this is a multiplier of 2, not the non-truncated 2.0 some
        // other value of MULT would produce.
        let half_mult = (self.max_rtt_multiplier / 2).max(1) as f64;

        let mut state = self.state.lock().unwrap();

        if s > state.rtt * mult {
            state.up_counter += 1;
            state.down_counter = state.down_counter.saturating_sub(1);
            if state.up_counter >= self.adjust_rtt_threshold {
                state.up_counter = 0;
                state.rtt *= half_mult;
                counters.rtt_increase.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            }
        } else if s < state.rtt / mult {
            state.down_counter += 1;
            state.up_counter = state.up_counter.saturating_sub(1);
            if state.down_counter >= self.adjust_rtt_threshold {
                state.down_counter = 0;
                state.rtt /= half_mult;
                counters.rtt_decrease.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            }
        }

        state.down_counter = state.down_counter.max(0);
        state.up_counter = state.up_counter.max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rtt_never_adjusts_on_isolated_outliers() {
        let counters = Counters::default();
        let rtt = RttController::new(1.0, 4, 3);
        rtt.sample(10.0, &counters); // too slow, 1/3
        rtt.sample(0.1, &counters); // too fast, resets up but also counts down 1/3
        assert_eq!(rtt.current(), 1.0);
    }

    #[test]
    fn rtt_inflation_after_threshold_samples() {
        // Scenario 4: 3 consecutive samples > rtt*MULT with MULT=4,
        // THRESHOLD=3 -> rtt *= floor(4/2) = 2, up_counter resets to 0.
        let counters = Counters::default();
        let rtt = RttController::new(1.0, 4, 3);
        rtt.sample(10.0, &counters);
        rtt.sample(10.0, &counters);
        rtt.sample(10.0, &counters);
        assert_eq!(rtt.current(), 2.0);
        assert_eq!(
            counters.rtt_increase.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[test]
    fn rtt_deflation_after_threshold_samples() {
        let counters = Counters::default();
        let rtt = RttController::new(4.0, 4, 2);
        rtt.sample(0.5, &counters);
        rtt.sample(0.5, &counters);
        assert_eq!(rtt.current(), 2.0);
    }

    #[test]
    fn rtt_stays_strictly_positive_across_many_deflations() {
        let counters = Counters::default();
        let rtt = RttController::new(100.0, 4, 1);
        for _ in 0..20 {
            rtt.sample(0.0001, &counters);
        }
        assert!(rtt.current() > 0.0);
    }
}
