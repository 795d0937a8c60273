//! Error types for S9 channel listener operations.
//!
//! This module provides a unified error type [`S9ChannelError`] covering handler configuration,
//! the channel handle's outbound queue and the tungstenite-backed transport.
//!
//! # Examples
//!
//! ```
//! use s9_channel_listener::{HandlerConfig, HandlerSlot, S9ChannelError};
//!
//! let slots = vec![("on-connect", HandlerSlot::<(), (), ()>::Context(()))];
//! match HandlerConfig::from_slots(slots) {
//!     Err(S9ChannelError::InvalidConfiguration(msg)) => {
//!         eprintln!("Bad handler configuration: {}", msg);
//!     },
//!     _ => unreachable!(),
//! }
//! ```

use std::fmt;
use tungstenite::Error as TungsteniteError;
use crate::listener::HandlerError;

/// Error type for all S9 channel listener operations.
///
/// # Error Categories
///
/// - **Configuration errors**: [`InvalidConfiguration`](Self::InvalidConfiguration)
/// - **Handler failures**: [`Handler`](Self::Handler), a failure raised by an application handler
///   that escaped to the transport
/// - **Runtime errors**: [`ChannelClosed`](Self::ChannelClosed), [`Io`](Self::Io), [`Tungstenite`](Self::Tungstenite)
#[derive(Debug)]
pub enum S9ChannelError {
    /// Invalid configuration was provided.
    ///
    /// This error occurs when:
    /// - A keyed handler configuration names an unknown slot
    /// - A slot holds a value of the wrong kind for its key, or is given twice
    /// - Transport options contain zero sizes or zero durations
    InvalidConfiguration(String),

    /// The channel's outbound queue is gone because its transport loop has finished.
    ChannelClosed,

    /// A registered handler failed and the failure escaped to the transport.
    ///
    /// The adapter never rewraps handler failures; only the transport driver does,
    /// after it has requested the channel to close.
    Handler(HandlerError),

    /// An I/O operation failed.
    Io(std::io::Error),

    /// An error from the underlying tungstenite WebSocket library.
    Tungstenite(TungsteniteError),
}

impl fmt::Display for S9ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            S9ChannelError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            S9ChannelError::ChannelClosed => write!(f, "Channel closed"),
            S9ChannelError::Handler(err) => write!(f, "Handler failed: {}", err),
            S9ChannelError::Io(err) => write!(f, "IO error: {}", err),
            S9ChannelError::Tungstenite(err) => write!(f, "WebSocket error: {}", err),
        }
    }
}

impl std::error::Error for S9ChannelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            S9ChannelError::Handler(err) => Some(err.as_ref()),
            S9ChannelError::Io(err) => Some(err),
            S9ChannelError::Tungstenite(err) => Some(err),
            _ => None,
        }
    }
}

// Convert from tungstenite errors to S9ChannelError
impl From<TungsteniteError> for S9ChannelError {
    fn from(err: TungsteniteError) -> Self {
        match err {
            TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed => {
                S9ChannelError::ChannelClosed
            }
            TungsteniteError::Io(io_err) => S9ChannelError::Io(io_err),
            _ => S9ChannelError::Tungstenite(err),
        }
    }
}

// Convert from std::io::Error to S9ChannelError error
impl From<std::io::Error> for S9ChannelError {
    fn from(err: std::io::Error) -> Self {
        S9ChannelError::Io(err)
    }
}

impl From<HandlerError> for S9ChannelError {
    fn from(err: HandlerError) -> Self {
        S9ChannelError::Handler(err)
    }
}

/// Convenience type alias for `Result<T, S9ChannelError>`.
pub type S9Result<T> = Result<T, S9ChannelError>;
