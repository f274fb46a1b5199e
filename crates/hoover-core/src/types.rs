//! Data types exchanged between the transport, the turn handler, and the
//! search backends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Inbound
// =============================================================================

/// A participant in a conversation (user or bot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChannelAccount {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// Kind of inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TurnKind {
    /// A user utterance.
    Message,
    /// Membership change: participants joined or left.
    ConversationUpdate,
    /// Anything else (typing, events, end-of-conversation). Ignored.
    #[serde(other)]
    Other,
}

/// One inbound event delivered by the transport.
///
/// Field names follow the activity schema used by chat channels, so a channel
/// payload can be deserialized directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundTurn {
    #[serde(default = "new_activity_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TurnKind,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub members_added: Vec<ChannelAccount>,
    pub from: ChannelAccount,
    #[serde(default)]
    pub recipient: Option<ChannelAccount>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

fn new_activity_id() -> String {
    Uuid::new_v4().to_string()
}

impl InboundTurn {
    /// Build a message turn.
    pub fn message(from: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: new_activity_id(),
            kind: TurnKind::Message,
            text: Some(text.into()),
            members_added: vec![],
            from: ChannelAccount::new(from),
            recipient: None,
            conversation_id: None,
        }
    }

    /// Build a membership-change turn announcing the given participant ids.
    pub fn members_added<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: new_activity_id(),
            kind: TurnKind::ConversationUpdate,
            text: None,
            members_added: ids.into_iter().map(ChannelAccount::new).collect(),
            from: ChannelAccount::new("channel"),
            recipient: None,
            conversation_id: None,
        }
    }

    /// Set the bot account the turn is addressed to.
    pub fn with_recipient(mut self, id: impl Into<String>) -> Self {
        self.recipient = Some(ChannelAccount::new(id));
        self
    }

    /// Message text, or the empty string for non-message turns.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

// =============================================================================
// Search
// =============================================================================

/// A raw hit returned by a search backend.
///
/// `enriched` carries the enrichment payload (a JSON document serialized as a
/// string) exactly as stored in the index. It is parsed lazily and
/// defensively by the result projector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub enriched: Option<String>,
}

impl SearchHit {
    pub fn new(score: f64, enriched: impl Into<String>) -> Self {
        Self {
            score,
            enriched: Some(enriched.into()),
        }
    }
}

// =============================================================================
// Outbound
// =============================================================================

/// A rendered search result: thumbnail, excerpt, and link to the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCard {
    pub image_url: String,
    pub excerpt: String,
    pub action_url: String,
}

/// Outbound activity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReplyKind {
    Message,
    Typing,
}

/// How multiple cards are presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttachmentLayout {
    #[default]
    List,
    Carousel,
}

/// A button attached below the reply that opens a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub title: String,
    pub url: String,
}

/// A reply produced by the turn handler. Sent at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundReply {
    pub id: Uuid,
    pub kind: ReplyKind,
    pub text: Option<String>,
    pub speak: Option<String>,
    pub cards: Vec<ResultCard>,
    pub layout: AttachmentLayout,
    pub suggested_action: Option<SuggestedAction>,
    pub timestamp: DateTime<Utc>,
}

impl OutboundReply {
    /// A message whose spoken form equals its text.
    pub fn message(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::speech(text.clone(), text)
    }

    /// A message with separate display and spoken text.
    pub fn speech(text: impl Into<String>, speak: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ReplyKind::Message,
            text: Some(text.into()),
            speak: Some(speak.into()),
            cards: vec![],
            layout: AttachmentLayout::List,
            suggested_action: None,
            timestamp: Utc::now(),
        }
    }

    /// A typing indicator.
    pub fn typing() -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ReplyKind::Typing,
            text: None,
            speak: None,
            cards: vec![],
            layout: AttachmentLayout::List,
            suggested_action: None,
            timestamp: Utc::now(),
        }
    }

    pub fn is_typing(&self) -> bool {
        self.kind == ReplyKind::Typing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_message_activity() {
        let json = r#"{
            "type": "message",
            "id": "abc",
            "text": "hello there",
            "from": {"id": "user-1", "name": "Agent Smith"},
            "recipient": {"id": "bot"}
        }"#;
        let turn: InboundTurn = serde_json::from_str(json).unwrap();
        assert_eq!(turn.kind, TurnKind::Message);
        assert_eq!(turn.id, "abc");
        assert_eq!(turn.text(), "hello there");
        assert_eq!(turn.from.name.as_deref(), Some("Agent Smith"));
        assert_eq!(turn.recipient.unwrap().id, "bot");
        assert!(turn.members_added.is_empty());
    }

    #[test]
    fn test_deserialize_conversation_update() {
        let json = r#"{
            "type": "conversationUpdate",
            "from": {"id": "channel"},
            "membersAdded": [{"id": "bot"}, {"id": "user-2"}]
        }"#;
        let turn: InboundTurn = serde_json::from_str(json).unwrap();
        assert_eq!(turn.kind, TurnKind::ConversationUpdate);
        assert_eq!(turn.members_added.len(), 2);
        assert!(!turn.id.is_empty());
        assert_eq!(turn.text(), "");
    }

    #[test]
    fn test_unknown_kind_maps_to_other() {
        let json = r#"{"type": "typing", "from": {"id": "u"}}"#;
        let turn: InboundTurn = serde_json::from_str(json).unwrap();
        assert_eq!(turn.kind, TurnKind::Other);
    }

    #[test]
    fn test_message_constructor() {
        let turn = InboundTurn::message("u1", "find files").with_recipient("bot");
        assert_eq!(turn.kind, TurnKind::Message);
        assert_eq!(turn.from.id, "u1");
        assert_eq!(turn.recipient.unwrap().id, "bot");
    }

    #[test]
    fn test_members_added_constructor() {
        let turn = InboundTurn::members_added(["a", "b"]);
        let ids: Vec<&str> = turn.members_added.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_reply_message_speaks_text() {
        let reply = OutboundReply::message("hi");
        assert_eq!(reply.text.as_deref(), Some("hi"));
        assert_eq!(reply.speak.as_deref(), Some("hi"));
        assert!(!reply.is_typing());
    }

    #[test]
    fn test_typing_reply() {
        let reply = OutboundReply::typing();
        assert!(reply.is_typing());
        assert!(reply.text.is_none());
    }

    #[test]
    fn test_search_hit_deserialize_without_payload() {
        let hit: SearchHit = serde_json::from_str(r#"{"score": 1.5}"#).unwrap();
        assert!(hit.enriched.is_none());
        assert!((hit.score - 1.5).abs() < f64::EPSILON);
    }
}
