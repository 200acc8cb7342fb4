//! Time source capability
//!
//! The mint window and the deadlines handed to the router both read the
//! current time through this trait, so tests can pin it to a manual
//! clock (`testing::ManualClock`).

/// Current time in unix seconds
pub trait Clock {
    fn now(&self) -> u64;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // Pre-epoch wall clocks read as zero rather than wrapping
        chrono::Utc::now().timestamp().max(0) as u64
    }
}
