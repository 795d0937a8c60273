use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use crossbeam_channel::{Receiver, Sender, unbounded};
use crate::error::{S9Result, S9ChannelError};
use crate::listener::CloseMessage;

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Outbound operations requested through a [`ChannelHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    SendText(String),
    SendBinary(Vec<u8>),
    SendPing(Vec<u8>),
    Close(Option<CloseMessage>),
}

// ============================================================================
// ChannelHandle - Non-owning handle passed to handlers
// ============================================================================

/// Identifies one WebSocket connection.
///
/// Outbound operations are queued and written by the driver after the current
/// event has been dispatched; the handle never touches the socket itself.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    id: u64,
    peer_addr: Option<SocketAddr>,
    control_tx: Sender<ControlMessage>,
}

impl ChannelHandle {
    pub(crate) fn new(peer_addr: Option<SocketAddr>) -> (ChannelHandle, Receiver<ControlMessage>) {
        let (control_tx, control_rx) = unbounded();
        let handle = ChannelHandle {
            id: NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed),
            peer_addr,
            control_tx,
        };
        (handle, control_rx)
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    #[inline]
    pub fn send_text(&self, text: impl Into<String>) -> S9Result<()> {
        self.send(ControlMessage::SendText(text.into()))
    }

    #[inline]
    pub fn send_binary(&self, data: Vec<u8>) -> S9Result<()> {
        self.send(ControlMessage::SendBinary(data))
    }

    #[inline]
    pub fn send_ping(&self, data: Vec<u8>) -> S9Result<()> {
        self.send(ControlMessage::SendPing(data))
    }

    pub fn close(&self, close: Option<CloseMessage>) -> S9Result<()> {
        self.send(ControlMessage::Close(close))
    }

    fn send(&self, message: ControlMessage) -> S9Result<()> {
        self.control_tx.send(message).map_err(|e| {
            tracing::error!("Failed to queue control message on channel {}: {:?}", self.id, e.into_inner());
            S9ChannelError::ChannelClosed
        })
    }
}
