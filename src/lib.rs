//! # Silver9 Channel Listener
//!
//! Turns the low-level events of a WebSocket transport (open, full text message, pooled binary
//! message, close, error) into a small set of normalized event records and dispatches them to
//! application handlers. Events without a registered handler fall back to the transport's
//! default handling.
//!
//! The [`listener`] module holds the transport-independent adapter. The [`transport`] module
//! drives it from a blocking tungstenite connection.
//!
//! ```no_run
//! use std::net::TcpListener;
//! use s9_channel_listener::{DriverAdapter, DriverDefaults, DriverHandlerConfig, DriverOptions, Payload, S9WebSocketDriver};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DriverHandlerConfig::new()
//!     .on_message(|event| {
//!         if let Payload::Text(text) = event.message {
//!             event.channel.send_text(text)?;
//!         }
//!         Ok(())
//!     })
//!     .context("echo");
//! let adapter = DriverAdapter::new(config, DriverDefaults)?;
//!
//! let server = TcpListener::bind("127.0.0.1:9001")?;
//! let (stream, _) = server.accept()?;
//! let mut driver = S9WebSocketDriver::accept(stream, DriverOptions::new())?;
//! driver.run(&adapter)?;
//! # Ok(())
//! # }
//! ```

pub mod listener;
pub mod transport;
mod error;

pub use listener::*;
pub use transport::*;
pub use error::{S9Result, S9ChannelError};
