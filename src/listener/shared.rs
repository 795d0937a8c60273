use super::types::{CloseMessage, EventKind};

// ============================================================================
// Shared trace helpers
// ============================================================================

/// Traces a dispatch to a registered handler
#[inline]
pub(crate) fn trace_dispatch(kind: EventKind) {
    if tracing::enabled!(tracing::Level::TRACE) {
        tracing::trace!("Dispatching {} to handler", kind);
    }
}

/// Traces a fallback to transport default handling
#[inline]
pub(crate) fn trace_default_path(kind: EventKind) {
    if tracing::enabled!(tracing::Level::TRACE) {
        tracing::trace!("No {} handler registered, using transport default", kind);
    }
}

#[inline]
pub(crate) fn trace_on_text_message(text: &str) {
    if tracing::enabled!(tracing::Level::TRACE) {
        tracing::trace!("Dispatching text message: {}", text);
    }
}

#[inline]
pub(crate) fn trace_on_binary_message(data: &[u8]) {
    if tracing::enabled!(tracing::Level::TRACE) {
        tracing::trace!("Dispatching binary message: {:?}", data);
    }
}

pub(crate) fn trace_on_close(close: &CloseMessage) {
    if tracing::enabled!(tracing::Level::TRACE) {
        match &close.reason {
            Some(reason) => {
                tracing::trace!("Dispatching close with code {} and reason: {}", close.code, reason)
            },
            None => {
                tracing::trace!("Dispatching close with code {} without reason", close.code)
            },
        }
    }
}
