//! Outbound side of a turn.

use async_trait::async_trait;

use hoover_core::OutboundReply;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,
    #[error("send failed: {0}")]
    Send(String),
}

/// Delivers replies for one turn back to the user.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_reply(&self, reply: &OutboundReply) -> Result<(), TransportError>;

    async fn send_typing(&self) -> Result<(), TransportError> {
        self.send_reply(&OutboundReply::typing()).await
    }

    /// Resolves once the client has gone away. Transports that cannot tell
    /// never resolve.
    async fn closed(&self) {
        std::future::pending::<()>().await
    }
}
