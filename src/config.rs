use crate::constants::*;

/// Host-side protocol timings for the ZE29A driver.
///
/// These are properties of the exchange, not of the sensor: how long to
/// wait for a response, how long the sensor needs to process a command
/// before it starts replying, and how often to poll while waiting for a
/// target state. The blow duration lives on the device and is read and
/// written through the driver, never cached here.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on a single response read, in milliseconds.
    pub read_timeout_ms: u32,
    /// Pause between transmitting a command and reading its reply.
    pub settle_delay_ms: u32,
    /// Pause between state queries in [`wait_for_state`](crate::Ze29a::wait_for_state).
    pub poll_interval_ms: u32,
}

impl Config {
    /// Sets the response read timeout.
    ///
    /// # Arguments
    ///
    /// * `ms` - Upper bound on a single response read, in milliseconds.
    ///
    /// # Returns
    ///
    /// The updated `Config` instance.
    pub fn read_timeout_ms(mut self, ms: u32) -> Self {
        self.read_timeout_ms = ms;
        self
    }

    /// Sets the post-transmission settle delay.
    ///
    /// The sensor needs a moment to process a command before it starts
    /// replying; 500-800 ms covers the module's observed latency.
    pub fn settle_delay_ms(mut self, ms: u32) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    /// Sets the interval between state polls while waiting for a state.
    pub fn poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }
}

/// Provides default timings for the ZE29A driver.
impl Default for Config {
    /// Returns the default configuration: 3000 ms read timeout, 800 ms
    /// settle delay, 500 ms poll interval.
    fn default() -> Config {
        Config {
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}
