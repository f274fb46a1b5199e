//! Adaptive Card rendering for result cards and outbound activities.

use serde_json::{json, Value};

use hoover_core::{AttachmentLayout, OutboundReply, ReplyKind, ResultCard};

pub const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";

const ADAPTIVE_CARD_VERSION: &str = "1.0";

/// Card body: a large centred thumbnail that opens the document, followed by
/// the excerpt.
pub fn render_card(card: &ResultCard) -> Value {
    json!({
        "type": "AdaptiveCard",
        "version": ADAPTIVE_CARD_VERSION,
        "body": [
            {
                "type": "Image",
                "url": card.image_url,
                "altText": card.excerpt,
                "size": "large",
                "horizontalAlignment": "center",
                "selectAction": {
                    "type": "Action.OpenUrl",
                    "url": card.action_url,
                },
            },
            {
                "type": "TextBlock",
                "text": card.excerpt,
                "wrap": true,
                "maxLines": 5,
                "separator": true,
                "spacing": "large",
            },
        ],
    })
}

/// Card wrapped as a message attachment.
pub fn render_attachment(card: &ResultCard) -> Value {
    json!({
        "contentType": ADAPTIVE_CARD_CONTENT_TYPE,
        "content": render_card(card),
    })
}

/// Outbound reply as a channel activity.
pub fn render_activity(reply: &OutboundReply) -> Value {
    let kind = match reply.kind {
        ReplyKind::Message => "message",
        ReplyKind::Typing => "typing",
    };

    let mut activity = json!({
        "type": kind,
        "id": reply.id.to_string(),
        "timestamp": reply.timestamp.to_rfc3339(),
    });

    if let Some(text) = &reply.text {
        activity["text"] = json!(text);
    }
    if let Some(speak) = &reply.speak {
        activity["speak"] = json!(speak);
    }
    if !reply.cards.is_empty() {
        activity["attachments"] = reply.cards.iter().map(render_attachment).collect();
        activity["attachmentLayout"] = json!(match reply.layout {
            AttachmentLayout::List => "list",
            AttachmentLayout::Carousel => "carousel",
        });
    }
    if let Some(action) = &reply.suggested_action {
        activity["suggestedActions"] = json!({
            "actions": [{
                "type": "openUrl",
                "title": action.title,
                "value": action.url,
            }],
        });
    }

    activity
}
