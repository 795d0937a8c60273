use crate::error::S9Result;
use super::buffer;
use super::handlers::{HandlerConfig, HandlerSet};
use super::shared;
use super::types::{
    ChannelListener, CloseEvent, CloseMessage, ErrorEvent, EventKind, HandlerResult, MessageEvent,
    OpenEvent, Payload, TransportDefaults,
};

// ============================================================================
// S9ChannelEventAdapter - Normalizes transport events into handler calls
// ============================================================================

/// Implements the transport's [`ChannelListener`] contract on top of a [`HandlerSet`].
///
/// For each event the adapter either calls the registered handler with a normalized
/// event record or, if that handler is absent, hands the event to the transport's
/// [`TransportDefaults`]. It holds no state besides the immutable handlers, so one
/// adapter can serve many channels from many threads at once.
pub struct S9ChannelEventAdapter<T, Ctx>
where
    T: TransportDefaults,
{
    handlers: HandlerSet<T::Channel, T::Failure, Ctx>,
    defaults: T,
}

impl<T, Ctx> S9ChannelEventAdapter<T, Ctx>
where
    T: TransportDefaults,
{
    pub fn new(config: HandlerConfig<T::Channel, T::Failure, Ctx>, defaults: T) -> S9Result<Self> {
        let handlers = HandlerSet::resolve(config)?;
        Ok(S9ChannelEventAdapter { handlers, defaults })
    }

    #[inline]
    pub fn handlers(&self) -> &HandlerSet<T::Channel, T::Failure, Ctx> {
        &self.handlers
    }

    #[inline]
    pub fn defaults(&self) -> &T {
        &self.defaults
    }

    fn dispatch_open(&self, channel: &T::Channel, context: Option<&Ctx>) -> HandlerResult {
        match self.handlers.on_open() {
            None => {
                shared::trace_default_path(EventKind::Open);
                self.defaults.on_open(channel)
            },
            Some(handler) => {
                shared::trace_dispatch(EventKind::Open);
                handler(OpenEvent { channel, context })
            }
        }
    }
}

impl<T, Ctx> ChannelListener for S9ChannelEventAdapter<T, Ctx>
where
    T: TransportDefaults,
{
    type Channel = T::Channel;
    type Failure = T::Failure;
    type Buffer = T::Buffer;
    type Context = Ctx;

    fn on_open(&self, channel: &T::Channel) -> HandlerResult {
        self.dispatch_open(channel, self.handlers.context())
    }

    /// The context attached at connection open replaces the configured context for this open event only.
    fn on_open_with_context(&self, channel: &T::Channel, context: &Ctx) -> HandlerResult {
        self.dispatch_open(channel, Some(context))
    }

    fn on_full_text_message(&self, channel: &T::Channel, text: String) -> HandlerResult {
        match self.handlers.on_message() {
            None => {
                shared::trace_default_path(EventKind::Message);
                self.defaults.on_full_text_message(channel, text)
            },
            Some(handler) => {
                shared::trace_on_text_message(&text);
                handler(MessageEvent {
                    channel,
                    message: Payload::Text(text),
                    context: self.handlers.context(),
                })
            }
        }
    }

    fn on_full_binary_message(&self, channel: &T::Channel, buffer: T::Buffer) -> HandlerResult {
        let handler = match self.handlers.on_message() {
            Some(handler) => handler,
            None => {
                shared::trace_default_path(EventKind::Message);
                return self.defaults.on_full_binary_message(channel, buffer);
            }
        };

        // The pooled buffer is freed before the handler runs
        let data = buffer::copy_and_release(buffer);
        shared::trace_on_binary_message(&data);
        handler(MessageEvent {
            channel,
            message: Payload::Binary(data),
            context: self.handlers.context(),
        })
    }

    fn on_close_message(&self, channel: &T::Channel, close: CloseMessage) -> HandlerResult {
        match self.handlers.on_close() {
            None => {
                shared::trace_default_path(EventKind::Close);
                self.defaults.on_close_message(channel, close)
            },
            Some(handler) => {
                shared::trace_on_close(&close);
                handler(CloseEvent {
                    channel,
                    code: close.code,
                    reason: close.reason,
                    context: self.handlers.context(),
                })
            }
        }
    }

    fn on_error(&self, channel: &T::Channel, error: T::Failure) -> HandlerResult {
        match self.handlers.on_error() {
            None => {
                shared::trace_default_path(EventKind::Error);
                self.defaults.on_error(channel, error)
            },
            Some(handler) => {
                shared::trace_dispatch(EventKind::Error);
                handler(ErrorEvent {
                    channel,
                    error,
                    context: self.handlers.context(),
                })
            }
        }
    }
}
