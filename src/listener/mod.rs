// Public API modules
pub mod types;
pub mod handlers;

// Internal modules
mod buffer;
mod shared;

// Adapter implementation
mod adapter;

// Re-export public types
pub use types::{
    ChannelListener, CloseEvent, CloseMessage, ErrorEvent, EventKind, HandlerError, HandlerResult,
    MessageEvent, OpenEvent, Payload, PooledBuffer, TransportDefaults,
};
pub use handlers::{HandlerConfig, HandlerSet, HandlerSlot};

// Re-export adapter type
pub use adapter::S9ChannelEventAdapter;
