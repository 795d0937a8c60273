use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use crossbeam_channel::Receiver;
use tungstenite::handshake::HandshakeError;
use tungstenite::protocol::frame::coding::CloseCode;
use tungstenite::protocol::CloseFrame;
use tungstenite::{Error, Message, WebSocket};
use crate::error::{S9Result, S9ChannelError};
use crate::listener::{
    ChannelListener, CloseMessage, HandlerConfig, HandlerError, HandlerResult, PooledBuffer,
    S9ChannelEventAdapter, TransportDefaults,
};
use super::channel::{ChannelHandle, ControlMessage};
use super::options::DriverOptions;
use super::pool::{PooledSegments, SegmentPool};

/// Handler configuration for channels driven by [`S9WebSocketDriver`].
pub type DriverHandlerConfig<Ctx> = HandlerConfig<ChannelHandle, Error, Ctx>;

/// Adapter for channels driven by [`S9WebSocketDriver`].
pub type DriverAdapter<Ctx> = S9ChannelEventAdapter<DriverDefaults, Ctx>;

/// Status reported when a close arrives without a close frame.
pub const NO_STATUS_CODE: u16 = 1005;

/// Control flow indicator for the event loop
enum ControlFlow {
    Continue,
    Break,
}

// ============================================================================
// S9WebSocketDriver - Blocking per-connection transport loop
// ============================================================================

/// Reads full messages from one WebSocket connection and delivers them to a [`ChannelListener`].
///
/// Binary payloads are handed over as [`PooledSegments`] borrowed from the driver's
/// [`SegmentPool`]. Outbound operations queued on the [`ChannelHandle`] are written
/// after each dispatched event.
pub struct S9WebSocketDriver<S: Read + Write> {
    socket: WebSocket<S>,
    channel: ChannelHandle,
    control_rx: Receiver<ControlMessage>,
    pool: SegmentPool,
    options: DriverOptions,
}

impl S9WebSocketDriver<TcpStream> {
    /// Performs the server handshake on `stream` and wraps the resulting WebSocket.
    pub fn accept(stream: TcpStream, options: DriverOptions) -> S9Result<Self> {
        let peer_addr = stream.peer_addr().ok();
        configure_stream(&stream, &options)?;

        let socket = tungstenite::accept(stream).map_err(|e| match e {
            HandshakeError::Failure(err) => {
                tracing::error!("WebSocket handshake failed: {}", err);
                S9ChannelError::from(err)
            },
            HandshakeError::Interrupted(_) => {
                tracing::error!("WebSocket handshake interrupted");
                S9ChannelError::Io(io::Error::from(io::ErrorKind::WouldBlock))
            }
        })?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!("Accepted WebSocket connection from {:?}", peer_addr);
        }
        Ok(Self::with_peer(socket, peer_addr, options))
    }
}

impl<S: Read + Write> S9WebSocketDriver<S> {
    /// Wraps a WebSocket whose handshake is already complete.
    pub fn from_socket(socket: WebSocket<S>, options: DriverOptions) -> Self {
        Self::with_peer(socket, None, options)
    }

    fn with_peer(socket: WebSocket<S>, peer_addr: Option<SocketAddr>, options: DriverOptions) -> Self {
        let (channel, control_rx) = ChannelHandle::new(peer_addr);
        let pool = SegmentPool::from_options(&options);
        S9WebSocketDriver {
            socket,
            channel,
            control_rx,
            pool,
            options,
        }
    }

    /// Replaces the driver's own pool, e.g. to share one pool between connections.
    pub fn with_pool(mut self, pool: SegmentPool) -> Self {
        self.pool = pool;
        self
    }

    #[inline]
    pub fn channel(&self) -> &ChannelHandle {
        &self.channel
    }

    #[inline]
    pub fn pool(&self) -> &SegmentPool {
        &self.pool
    }

    #[inline]
    pub fn get_ref(&self) -> &S {
        self.socket.get_ref()
    }

    /// Runs the event loop until the channel closes or fails.
    ///
    /// Returns [`S9ChannelError::Handler`] if a handler failure escaped the listener.
    /// The channel is closed with status 1011 before returning in that case.
    pub fn run<L>(&mut self, listener: &L) -> S9Result<()>
    where
        L: ChannelListener<Channel = ChannelHandle, Failure = Error, Buffer = PooledSegments>,
    {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!("Starting event loop for channel {}", self.channel.id());
        }
        let result = listener.on_open(&self.channel);
        self.event_loop(listener, result)
    }

    /// Like [`run`](Self::run), attaching `context` to the open event.
    pub fn run_with_context<L>(&mut self, listener: &L, context: &L::Context) -> S9Result<()>
    where
        L: ChannelListener<Channel = ChannelHandle, Failure = Error, Buffer = PooledSegments>,
    {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!("Starting event loop for channel {} with attached context", self.channel.id());
        }
        let result = listener.on_open_with_context(&self.channel, context);
        self.event_loop(listener, result)
    }

    fn event_loop<L>(&mut self, listener: &L, open_result: HandlerResult) -> S9Result<()>
    where
        L: ChannelListener<Channel = ChannelHandle, Failure = Error, Buffer = PooledSegments>,
    {
        if let ControlFlow::Break = self.settle(listener, open_result)? {
            return Ok(());
        }

        loop {
            let result = match self.socket.read() {
                Ok(Message::Text(text)) => {
                    listener.on_full_text_message(&self.channel, text.as_str().to_owned())
                },
                Ok(Message::Binary(bytes)) => {
                    let buffer = self.pool.fill(&bytes);
                    listener.on_full_binary_message(&self.channel, buffer)
                },
                Ok(Message::Ping(bytes)) => {
                    if tracing::enabled!(tracing::Level::TRACE) {
                        tracing::trace!("Received ping frame: {}", String::from_utf8_lossy(&bytes));
                    }
                    continue;
                },
                Ok(Message::Pong(bytes)) => {
                    if tracing::enabled!(tracing::Level::TRACE) {
                        tracing::trace!("Received pong frame: {}", String::from_utf8_lossy(&bytes));
                    }
                    continue;
                },
                Ok(Message::Frame(_)) => {
                    // Raw frames only appear on the write side
                    continue;
                },
                Ok(Message::Close(frame)) => {
                    let close = close_message_from_frame(frame);
                    if tracing::enabled!(tracing::Level::DEBUG) {
                        tracing::debug!("Channel {} closed by peer with code {}", self.channel.id(), close.code);
                    }
                    let result = listener.on_close_message(&self.channel, close);
                    return self.finish(result);
                },
                Err(Error::ConnectionClosed) | Err(Error::AlreadyClosed) => {
                    tracing::trace!("Channel {} connection closed", self.channel.id());
                    return Ok(());
                },
                Err(Error::Io(ref err))
                    if self.options.read_timeout.is_some()
                        && matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    // Nothing to read yet, still write what handlers queued meanwhile
                    if let ControlFlow::Break = self.settle(listener, Ok(()))? {
                        return Ok(());
                    }
                    if let Some(duration) = self.options.spin_wait_duration {
                        thread::sleep(duration);
                    }
                    continue;
                },
                Err(e) => {
                    tracing::error!("Failed to read from channel {}: {}", self.channel.id(), e);
                    let result = listener.on_error(&self.channel, e);
                    return self.finish(result);
                }
            };

            if let ControlFlow::Break = self.settle(listener, result)? {
                return Ok(());
            }
        }
    }

    /// Completes a dispatch: aborts on handler failure, otherwise writes queued control messages.
    fn settle<L>(&mut self, listener: &L, result: HandlerResult) -> S9Result<ControlFlow>
    where
        L: ChannelListener<Channel = ChannelHandle, Failure = Error, Buffer = PooledSegments>,
    {
        if let Err(err) = result {
            return Err(self.abort(err));
        }

        match self.drain_control() {
            Ok(()) => Ok(ControlFlow::Continue),
            Err(Error::ConnectionClosed) | Err(Error::AlreadyClosed) => Ok(ControlFlow::Break),
            Err(e) => {
                tracing::error!("Failed to write to channel {}: {}", self.channel.id(), e);
                let result = listener.on_error(&self.channel, e);
                self.finish(result)?;
                Ok(ControlFlow::Break)
            }
        }
    }

    /// Completes the last dispatch of the channel.
    fn finish(&mut self, result: HandlerResult) -> S9Result<()> {
        if let Err(err) = result {
            return Err(self.abort(err));
        }
        if let Err(e) = self.drain_control() {
            tracing::trace!("Ignoring write failure on finished channel {}: {}", self.channel.id(), e);
        }
        self.flush_pending();
        Ok(())
    }

    /// Writes frames tungstenite queued on its own, such as the reply to a peer close.
    fn flush_pending(&mut self) {
        match self.socket.flush() {
            Ok(()) | Err(Error::ConnectionClosed) | Err(Error::AlreadyClosed) => {},
            Err(e) => {
                tracing::trace!("Ignoring flush failure on finished channel {}: {}", self.channel.id(), e);
            }
        }
    }

    fn abort(&mut self, err: HandlerError) -> S9ChannelError {
        tracing::error!("Handler failed on channel {}: {}", self.channel.id(), err);
        let frame = CloseFrame {
            code: CloseCode::Error,
            reason: "".into(),
        };
        close_websocket_with_logging(&mut self.socket, Some(frame), "handler failure");
        // A close already started by the peer still needs its reply written
        self.flush_pending();
        S9ChannelError::Handler(err)
    }

    fn drain_control(&mut self) -> Result<(), Error> {
        while let Ok(control_msg) = self.control_rx.try_recv() {
            write_control_message(&mut self.socket, control_msg)?;
        }
        Ok(())
    }
}

impl<S: Read + Write> Drop for S9WebSocketDriver<S> {
    fn drop(&mut self) {
        close_websocket_with_logging(&mut self.socket, None, "on Drop");
    }
}

// ============================================================================
// DriverDefaults - Default handling when no handler is registered
// ============================================================================

/// Default event handling of the driver.
///
/// Text and binary messages are discarded, a close is echoed back with the
/// peer's status, and a failure closes the channel with status 1011.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverDefaults;

impl TransportDefaults for DriverDefaults {
    type Channel = ChannelHandle;
    type Failure = Error;
    type Buffer = PooledSegments;

    fn on_full_text_message(&self, channel: &ChannelHandle, text: String) -> HandlerResult {
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!("Discarding text message on channel {}: {}", channel.id(), text);
        }
        Ok(())
    }

    fn on_full_binary_message(&self, channel: &ChannelHandle, buffer: PooledSegments) -> HandlerResult {
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!("Discarding binary message of {} bytes on channel {}", buffer.total_len(), channel.id());
        }
        buffer.free();
        Ok(())
    }

    fn on_close_message(&self, channel: &ChannelHandle, close: CloseMessage) -> HandlerResult {
        tracing::trace!("Echoing close with code {} on channel {}", close.code, channel.id());
        channel.close(Some(close))?;
        Ok(())
    }

    fn on_error(&self, channel: &ChannelHandle, error: Error) -> HandlerResult {
        tracing::error!("Closing channel {} after transport failure: {}", channel.id(), error);
        channel.close(Some(CloseMessage::new(u16::from(CloseCode::Error), None)))?;
        Ok(())
    }
}

// ============================================================================
// Internal helpers
// ============================================================================

fn configure_stream(stream: &TcpStream, options: &DriverOptions) -> S9Result<()> {
    if let Some(nodelay) = options.nodelay {
        stream.set_nodelay(nodelay)?;
    }
    stream.set_read_timeout(options.read_timeout)?;
    stream.set_write_timeout(options.write_timeout)?;
    Ok(())
}

pub(crate) fn close_message_from_frame(frame: Option<CloseFrame>) -> CloseMessage {
    match frame {
        Some(frame) => {
            let reason = if frame.reason.is_empty() {
                None
            } else {
                Some(frame.reason.as_str().to_owned())
            };
            CloseMessage::new(u16::from(frame.code), reason)
        },
        None => CloseMessage::new(NO_STATUS_CODE, None),
    }
}

fn close_frame_from_message(close: CloseMessage) -> CloseFrame {
    CloseFrame {
        code: CloseCode::from(close.code),
        reason: close.reason.unwrap_or_default().into(),
    }
}

#[inline]
fn write_control_message<S: Read + Write>(socket: &mut WebSocket<S>, control_msg: ControlMessage) -> Result<(), Error> {
    match control_msg {
        ControlMessage::SendText(text) => {
            if tracing::enabled!(tracing::Level::TRACE) {
                tracing::trace!("Sending text message: {}", text);
            }
            socket.send(Message::text(text))
        },
        ControlMessage::SendBinary(data) => {
            tracing::trace!("Sending binary message");
            socket.send(Message::binary(data))
        },
        ControlMessage::SendPing(data) => {
            tracing::trace!("Sending ping");
            socket.send(Message::Ping(data.into()))
        },
        ControlMessage::Close(close) => {
            socket.close(close.map(close_frame_from_message))
        }
    }
}

/// Closes WebSocket connection with context logging
fn close_websocket_with_logging<S: Read + Write>(socket: &mut WebSocket<S>, frame: Option<CloseFrame>, context: &str) {
    if socket.can_write() {
        socket.close(frame)
            .map(|_| {
                tracing::trace!("Connection close successfully requested for context: {}", context);
            })
            .unwrap_or_else(|e| {
                tracing::trace!("Error on connection close request for context {}: {}", context, e);
            });
    }
}
