//! Time source for task ids.

#[cfg(test)]
use mockall::automock;

/// Supplies the millisecond timestamps task ids are made from.
#[cfg_attr(test, automock)]
pub trait IdClock: Send + Sync + 'static {
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl IdClock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
