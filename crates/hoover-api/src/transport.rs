//! Transport backed by a bounded tokio channel.
//!
//! The request handler owns the receiving end and turns replies into a JSON
//! array or an SSE stream. Dropping the receiver (client gone) closes the
//! transport, which cancels any search still in flight.

use async_trait::async_trait;
use tokio::sync::mpsc;

use hoover_chat::{Transport, TransportError};
use hoover_core::OutboundReply;

/// Replies buffered before the sender waits on the reader.
pub const REPLY_BUFFER: usize = 32;

pub struct ChannelTransport {
    tx: mpsc::Sender<OutboundReply>,
}

impl ChannelTransport {
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<OutboundReply>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send_reply(&self, reply: &OutboundReply) -> Result<(), TransportError> {
        self.tx
            .send(reply.clone())
            .await
            .map_err(|_| TransportError::Closed)
    }

    async fn closed(&self) {
        self.tx.closed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_reach_receiver() {
        let (transport, mut rx) = ChannelTransport::channel(4);
        transport
            .send_reply(&OutboundReply::message("hi"))
            .await
            .unwrap();
        transport.send_typing().await.unwrap();

        assert_eq!(rx.recv().await.unwrap().text.as_deref(), Some("hi"));
        assert!(rx.recv().await.unwrap().is_typing());
    }

    #[tokio::test]
    async fn test_dropped_receiver_closes_transport() {
        let (transport, rx) = ChannelTransport::channel(4);
        drop(rx);

        transport.closed().await;
        assert_eq!(
            transport.send_reply(&OutboundReply::message("late")).await,
            Err(TransportError::Closed)
        );
    }
}
