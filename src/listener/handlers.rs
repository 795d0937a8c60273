use std::fmt;
use crate::error::{S9Result, S9ChannelError};
use super::types::{CloseEvent, ErrorEvent, HandlerResult, MessageEvent, OpenEvent};

// ============================================================================
// Handler types
// ============================================================================

pub type OpenHandler<Ch, Ctx> = Box<dyn for<'a> Fn(OpenEvent<'a, Ch, Ctx>) -> HandlerResult + Send + Sync>;
pub type MessageHandler<Ch, Ctx> = Box<dyn for<'a> Fn(MessageEvent<'a, Ch, Ctx>) -> HandlerResult + Send + Sync>;
pub type CloseHandler<Ch, Ctx> = Box<dyn for<'a> Fn(CloseEvent<'a, Ch, Ctx>) -> HandlerResult + Send + Sync>;
pub type ErrorHandler<Ch, F, Ctx> = Box<dyn for<'a> Fn(ErrorEvent<'a, Ch, F, Ctx>) -> HandlerResult + Send + Sync>;

pub const ON_OPEN_KEY: &str = "on-open";
pub const ON_MESSAGE_KEY: &str = "on-message";
pub const ON_CLOSE_KEY: &str = "on-close";
pub const ON_ERROR_KEY: &str = "on-error";
pub const CONTEXT_KEY: &str = "context";

/// A single value of a keyed handler configuration.
pub enum HandlerSlot<Ch, F, Ctx> {
    Open(OpenHandler<Ch, Ctx>),
    Message(MessageHandler<Ch, Ctx>),
    Close(CloseHandler<Ch, Ctx>),
    Error(ErrorHandler<Ch, F, Ctx>),
    Context(Ctx),
}

impl<Ch, F, Ctx> HandlerSlot<Ch, F, Ctx> {
    fn key(&self) -> &'static str {
        match self {
            HandlerSlot::Open(_) => ON_OPEN_KEY,
            HandlerSlot::Message(_) => ON_MESSAGE_KEY,
            HandlerSlot::Close(_) => ON_CLOSE_KEY,
            HandlerSlot::Error(_) => ON_ERROR_KEY,
            HandlerSlot::Context(_) => CONTEXT_KEY,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Caller-supplied handler configuration, resolved once into a [`HandlerSet`].
///
/// Every slot is optional. An absent slot makes the adapter fall back to the
/// transport's default handling for that event kind.
pub struct HandlerConfig<Ch, F, Ctx> {
    on_open: Option<OpenHandler<Ch, Ctx>>,
    on_message: Option<MessageHandler<Ch, Ctx>>,
    on_close: Option<CloseHandler<Ch, Ctx>>,
    on_error: Option<ErrorHandler<Ch, F, Ctx>>,
    context: Option<Ctx>,
}

impl<Ch, F, Ctx> Default for HandlerConfig<Ch, F, Ctx> {
    fn default() -> Self {
        HandlerConfig {
            on_open: None,
            on_message: None,
            on_close: None,
            on_error: None,
            context: None,
        }
    }
}

impl<Ch, F, Ctx> HandlerConfig<Ch, F, Ctx> {
    /// Creates an empty `HandlerConfig` builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_open<H>(mut self, handler: H) -> Self
    where
        H: Fn(OpenEvent<'_, Ch, Ctx>) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_open = Some(Box::new(handler));
        self
    }

    /// Receives both text and binary full messages.
    pub fn on_message<H>(mut self, handler: H) -> Self
    where
        H: Fn(MessageEvent<'_, Ch, Ctx>) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_message = Some(Box::new(handler));
        self
    }

    pub fn on_close<H>(mut self, handler: H) -> Self
    where
        H: Fn(CloseEvent<'_, Ch, Ctx>) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_close = Some(Box::new(handler));
        self
    }

    pub fn on_error<H>(mut self, handler: H) -> Self
    where
        H: Fn(ErrorEvent<'_, Ch, F, Ctx>) -> HandlerResult + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// Sets the opaque value threaded through every event record.
    pub fn context(mut self, context: Ctx) -> Self {
        self.context = Some(context);
        self
    }

    /// Builds a configuration from keyed slots.
    ///
    /// Recognized keys are `on-open`, `on-message`, `on-close`, `on-error` and `context`.
    /// Missing keys leave their slot absent. Unknown keys, repeated keys and values
    /// of the wrong kind for their key are rejected.
    pub fn from_slots<K, I>(slots: I) -> S9Result<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, HandlerSlot<Ch, F, Ctx>)>,
    {
        let mut config = Self::new();
        for (key, slot) in slots {
            let key = key.as_ref();
            if !matches!(key, ON_OPEN_KEY | ON_MESSAGE_KEY | ON_CLOSE_KEY | ON_ERROR_KEY | CONTEXT_KEY) {
                tracing::error!("Unknown handler configuration key: {}", key);
                return Err(S9ChannelError::InvalidConfiguration(format!("Unknown handler key '{}'", key)));
            }
            if slot.key() != key {
                tracing::error!("Handler configuration key {} holds a {} value", key, slot.key());
                return Err(S9ChannelError::InvalidConfiguration(
                    format!("Key '{}' cannot hold a '{}' value", key, slot.key()),
                ));
            }
            if config.is_set(key) {
                return Err(S9ChannelError::InvalidConfiguration(format!("Key '{}' given more than once", key)));
            }
            match slot {
                HandlerSlot::Open(handler) => config.on_open = Some(handler),
                HandlerSlot::Message(handler) => config.on_message = Some(handler),
                HandlerSlot::Close(handler) => config.on_close = Some(handler),
                HandlerSlot::Error(handler) => config.on_error = Some(handler),
                HandlerSlot::Context(context) => config.context = Some(context),
            }
        }
        Ok(config)
    }

    fn is_set(&self, key: &str) -> bool {
        match key {
            ON_OPEN_KEY => self.on_open.is_some(),
            ON_MESSAGE_KEY => self.on_message.is_some(),
            ON_CLOSE_KEY => self.on_close.is_some(),
            ON_ERROR_KEY => self.on_error.is_some(),
            CONTEXT_KEY => self.context.is_some(),
            _ => false,
        }
    }
}

// ============================================================================
// HandlerSet
// ============================================================================

/// The immutable handlers and context of one adapter instance.
pub struct HandlerSet<Ch, F, Ctx> {
    on_open: Option<OpenHandler<Ch, Ctx>>,
    on_message: Option<MessageHandler<Ch, Ctx>>,
    on_close: Option<CloseHandler<Ch, Ctx>>,
    on_error: Option<ErrorHandler<Ch, F, Ctx>>,
    context: Option<Ctx>,
}

impl<Ch, F, Ctx> HandlerSet<Ch, F, Ctx> {
    /// Resolves every slot of `config` exactly once.
    pub fn resolve(config: HandlerConfig<Ch, F, Ctx>) -> S9Result<Self> {
        let set = HandlerSet {
            on_open: config.on_open,
            on_message: config.on_message,
            on_close: config.on_close,
            on_error: config.on_error,
            context: config.context,
        };
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!("Resolved handler set: {:?}", set);
        }
        Ok(set)
    }

    #[inline]
    pub fn on_open(&self) -> Option<&OpenHandler<Ch, Ctx>> {
        self.on_open.as_ref()
    }

    #[inline]
    pub fn on_message(&self) -> Option<&MessageHandler<Ch, Ctx>> {
        self.on_message.as_ref()
    }

    #[inline]
    pub fn on_close(&self) -> Option<&CloseHandler<Ch, Ctx>> {
        self.on_close.as_ref()
    }

    #[inline]
    pub fn on_error(&self) -> Option<&ErrorHandler<Ch, F, Ctx>> {
        self.on_error.as_ref()
    }

    #[inline]
    pub fn context(&self) -> Option<&Ctx> {
        self.context.as_ref()
    }
}

impl<Ch, F, Ctx> fmt::Debug for HandlerSet<Ch, F, Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSet")
            .field("on_open", &self.on_open.is_some())
            .field("on_message", &self.on_message.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("context", &self.context.is_some())
            .finish()
    }
}
