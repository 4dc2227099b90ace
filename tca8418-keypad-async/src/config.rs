//! Driver configuration.

use embassy_time::Duration;

use crate::reg::TCA8418_I2C_ADDR;
use crate::timeout::Timeout;

/// Configuration for the keypad driver.
#[derive(Debug, Clone)]
pub struct KeypadConfig {
    /// I2C address of the TCA8418.
    pub address: u8,
    /// Delay between FIFO drains when no interrupt line is wired.
    pub poll_interval: Duration,
    /// Longest a waiter sleeps before re-checking the queue without being notified.
    pub idle_interval: Duration,
    /// Timeout of [`Keypad::wait_for_sequence_default`](crate::Keypad::wait_for_sequence_default).
    pub sequence_timeout: Timeout,
}

impl Default for KeypadConfig {
    fn default() -> Self {
        Self {
            address: TCA8418_I2C_ADDR,
            poll_interval: Duration::from_millis(10),
            idle_interval: Duration::from_millis(10),
            sequence_timeout: Timeout::After(Duration::from_secs(10)),
        }
    }
}
