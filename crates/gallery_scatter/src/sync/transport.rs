//! Outbound transport seam and single-consumer inbound delivery.
//!
//! The network collaborator implements [`Transport`] for outbound traffic
//! and pushes inbound messages through an [`InboundSender`]. Delivery never
//! touches session or pool state directly: messages queue up and the owning
//! [`crate::sync::SessionSync`] drains them on its own tick, so in-progress
//! draws never race with delivery.
use std::fmt;
use std::sync::mpsc;

use crate::sync::message::SwapMessage;

/// Opaque identifier of a remote peer, assigned by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerId(pub u32);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// One delivered message, tagged with its sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub from: PeerId,
    pub message: SwapMessage,
}

/// Outbound message sink implemented by the network transport collaborator.
///
/// `broadcast_cached` must retain the message for replay to peers who join
/// after it was sent; the unicast sends have no such requirement.
pub trait Transport {
    fn broadcast_cached(&mut self, message: SwapMessage);
    fn send_to_host(&mut self, message: SwapMessage);
    fn send_to_peer(&mut self, peer: PeerId, message: SwapMessage);
}

/// Cloneable handle the delivery context uses to enqueue inbound messages.
#[derive(Debug, Clone)]
pub struct InboundSender {
    tx: mpsc::Sender<Inbound>,
}

impl InboundSender {
    /// Enqueue a message for the session to drain on its next tick.
    /// Deliveries after session teardown are silently dropped.
    pub fn deliver(&self, from: PeerId, message: SwapMessage) {
        let _ = self.tx.send(Inbound { from, message });
    }
}

pub(crate) fn inbound_channel() -> (InboundSender, mpsc::Receiver<Inbound>) {
    let (tx, rx) = mpsc::channel();
    (InboundSender { tx }, rx)
}
