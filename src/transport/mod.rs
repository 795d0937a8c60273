// Public API modules
pub mod options;

// Transport building blocks
mod channel;
mod pool;
mod driver;

// Re-export public types
pub use options::DriverOptions;
pub use channel::{ChannelHandle, ControlMessage};
pub use pool::{PooledSegments, SegmentPool};
pub use driver::{DriverAdapter, DriverDefaults, DriverHandlerConfig, S9WebSocketDriver, NO_STATUS_CODE};
