use std::fmt;

// ============================================================================
// Handler results
// ============================================================================

/// Failure raised by an application handler or a transport default path.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a single dispatch. The `Ok` value carries nothing; handler return values are ignored.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Event records
// ============================================================================

/// Names the handler slot an event record is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Open,
    Message,
    Close,
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Open => "on-open",
            EventKind::Message => "on-message",
            EventKind::Close => "on-close",
            EventKind::Error => "on-error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of a full message.
///
/// `Binary` always owns its bytes; it never aliases transport pooled storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Binary(data) => data,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Close status as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseMessage {
    pub code: u16,
    pub reason: Option<String>,
}

impl CloseMessage {
    pub fn new(code: u16, reason: Option<String>) -> Self {
        CloseMessage { code, reason }
    }
}

/// Delivered once per channel, before any other event of that channel.
#[derive(Debug)]
pub struct OpenEvent<'a, Ch, Ctx> {
    pub channel: &'a Ch,
    pub context: Option<&'a Ctx>,
}

/// A fully reassembled text or binary message.
#[derive(Debug)]
pub struct MessageEvent<'a, Ch, Ctx> {
    pub channel: &'a Ch,
    pub message: Payload,
    pub context: Option<&'a Ctx>,
}

/// Terminal event of a channel.
#[derive(Debug)]
pub struct CloseEvent<'a, Ch, Ctx> {
    pub channel: &'a Ch,
    pub code: u16,
    pub reason: Option<String>,
    pub context: Option<&'a Ctx>,
}

/// A transport failure, forwarded exactly as the transport reported it.
#[derive(Debug)]
pub struct ErrorEvent<'a, Ch, F, Ctx> {
    pub channel: &'a Ch,
    pub error: F,
    pub context: Option<&'a Ctx>,
}

impl<Ch, Ctx> OpenEvent<'_, Ch, Ctx> {
    pub fn kind(&self) -> EventKind {
        EventKind::Open
    }
}

impl<Ch, Ctx> MessageEvent<'_, Ch, Ctx> {
    pub fn kind(&self) -> EventKind {
        EventKind::Message
    }
}

impl<Ch, Ctx> CloseEvent<'_, Ch, Ctx> {
    pub fn kind(&self) -> EventKind {
        EventKind::Close
    }
}

impl<Ch, F, Ctx> ErrorEvent<'_, Ch, F, Ctx> {
    pub fn kind(&self) -> EventKind {
        EventKind::Error
    }
}

// ============================================================================
// Transport contract
// ============================================================================

/// An inbound binary payload backed by transport pooled storage.
///
/// `free` consumes the buffer, so a buffer can be returned to its pool at most once.
pub trait PooledBuffer {
    type Segment: AsRef<[u8]>;

    /// The payload segments in delivery order. Segments may be discontiguous.
    fn segments(&self) -> &[Self::Segment];

    /// Returns the storage to the pool.
    fn free(self);
}

/// The event-listener contract a transport calls into, once per channel event.
///
/// Every method runs synchronously on the transport's delivering thread.
pub trait ChannelListener {
    type Channel;
    type Failure;
    type Buffer: PooledBuffer;
    type Context;

    fn on_open(&self, channel: &Self::Channel) -> HandlerResult;

    /// Open hook for transports that attach per-connection context at connection open.
    fn on_open_with_context(&self, channel: &Self::Channel, context: &Self::Context) -> HandlerResult {
        let _ = context;
        self.on_open(channel)
    }

    fn on_full_text_message(&self, channel: &Self::Channel, text: String) -> HandlerResult;

    /// Takes ownership of the pooled buffer. The implementation must free it exactly once.
    fn on_full_binary_message(&self, channel: &Self::Channel, buffer: Self::Buffer) -> HandlerResult;

    fn on_close_message(&self, channel: &Self::Channel, close: CloseMessage) -> HandlerResult;

    fn on_error(&self, channel: &Self::Channel, error: Self::Failure) -> HandlerResult;
}

/// The transport's own handling of each event kind, used when no handler is registered.
pub trait TransportDefaults {
    type Channel;
    type Failure;
    type Buffer: PooledBuffer;

    fn on_open(&self, channel: &Self::Channel) -> HandlerResult {
        let _ = channel;
        Ok(())
    }

    fn on_full_text_message(&self, channel: &Self::Channel, text: String) -> HandlerResult;

    /// Responsible for freeing `buffer`.
    fn on_full_binary_message(&self, channel: &Self::Channel, buffer: Self::Buffer) -> HandlerResult;

    fn on_close_message(&self, channel: &Self::Channel, close: CloseMessage) -> HandlerResult;

    fn on_error(&self, channel: &Self::Channel, error: Self::Failure) -> HandlerResult;
}
