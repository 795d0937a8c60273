use std::time::Duration;
use crate::error::{S9Result, S9ChannelError};

// ============================================================================
// Configuration options
// ============================================================================

pub(crate) const DEFAULT_SEGMENT_SIZE: usize = 4096;
pub(crate) const DEFAULT_POOL_CAPACITY: usize = 64;

/// Configuration options for the WebSocket driver.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub(crate) segment_size: usize,
    pub(crate) pool_capacity: usize,
    pub(crate) spin_wait_duration: Option<Duration>,
    pub(crate) read_timeout: Option<Duration>,
    pub(crate) write_timeout: Option<Duration>,
    pub(crate) nodelay: Option<bool>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        DriverOptions {
            segment_size: DEFAULT_SEGMENT_SIZE,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            spin_wait_duration: None,
            read_timeout: None,
            write_timeout: None,
            nodelay: None,
        }
    }
}

impl DriverOptions {
    /// Creates a new `DriverOptions` builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the size of a single pooled segment for inbound binary payloads.
    /// Must be greater than zero
    pub fn segment_size(mut self, size: usize) -> S9Result<Self> {
        if size == 0 {
            return Err(S9ChannelError::InvalidConfiguration("Segment size cannot be zero".to_string()));
        }
        self.segment_size = size;
        Ok(self)
    }

    /// Sets how many freed segments the pool keeps for reuse.
    /// Must be greater than zero
    pub fn pool_capacity(mut self, capacity: usize) -> S9Result<Self> {
        if capacity == 0 {
            return Err(S9ChannelError::InvalidConfiguration("Pool capacity cannot be zero".to_string()));
        }
        self.pool_capacity = capacity;
        Ok(self)
    }

    /// Sets the duration to wait in the event loop after a read timed out.
    /// Must be None or greater than zero
    pub fn spin_wait_duration(mut self, duration: Option<Duration>) -> S9Result<Self> {
        if let Some(duration) = duration {
            if duration.is_zero() {
                return Err(S9ChannelError::InvalidConfiguration("Spin wait duration cannot be zero".to_string()));
            }
        }
        self.spin_wait_duration = duration;
        Ok(self)
    }

    /// Sets the read timeout for accepted sockets.
    /// Must be None for the indefinitely blocking of socket read or greater than zero
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> S9Result<Self> {
        if let Some(timeout) = timeout {
            if timeout.is_zero() {
                return Err(S9ChannelError::InvalidConfiguration("Read timeout duration cannot be zero".to_string()));
            }
        }
        self.read_timeout = timeout;
        Ok(self)
    }

    /// Sets the write timeout for accepted sockets.
    /// Must be None for the indefinitely blocking of socket write or greater than zero
    pub fn write_timeout(mut self, timeout: Option<Duration>) -> S9Result<Self> {
        if let Some(timeout) = timeout {
            if timeout.is_zero() {
                return Err(S9ChannelError::InvalidConfiguration("Write timeout duration cannot be zero".to_string()));
            }
        }
        self.write_timeout = timeout;
        Ok(self)
    }

    /// Enables or disables the `TCP_NODELAY` option for accepted sockets.
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = Some(nodelay);
        self
    }
}
