//! Reply wording.

use hoover_core::{AttachmentLayout, OutboundReply, ResultCard, SuggestedAction};

use crate::annotator::TermHit;
use crate::intent::SmallTalk;

pub const GREETING: &str =
    "Welcome, investigator! I'm FBI director J. Edgar Hoover. What can I help you find?";

pub const SEARCH_FAILED: &str =
    "I'm sorry, I couldn't search the archives right now. Please try again in a moment.";

pub const SEE_MORE_TITLE: &str = "Dig Deeper";

/// Builds the outbound replies for a turn.
#[derive(Debug, Clone)]
pub struct ReplyComposer {
    see_more_url: String,
}

impl ReplyComposer {
    /// `see_more_url` is the prefix the URL-encoded query is appended to.
    pub fn new(see_more_url: impl Into<String>) -> Self {
        Self {
            see_more_url: see_more_url.into(),
        }
    }

    pub fn greeting(&self) -> OutboundReply {
        OutboundReply::message(GREETING)
    }

    pub fn small_talk(&self, talk: SmallTalk) -> OutboundReply {
        OutboundReply::message(talk.response())
    }

    /// Definition of a term. Only the definition is spoken.
    pub fn definition(&self, hit: &TermHit) -> OutboundReply {
        OutboundReply::speech(hit.display(), hit.definition.clone())
    }

    /// Reply carrying the result cards, or the not-found message.
    ///
    /// `term_found` prefixes the spoken text with "Also, " since a definition
    /// has already been read out.
    pub fn search_results(
        &self,
        query: &str,
        cards: Vec<ResultCard>,
        term_found: bool,
    ) -> OutboundReply {
        if cards.is_empty() {
            return OutboundReply::message(format!(
                "I'm sorry, I can't find any documents matching \"{}\"",
                query
            ));
        }

        let documents = if cards.len() > 1 {
            "some documents"
        } else {
            "a document"
        };
        let text = format!(
            "I found {} about \"{}\" you may be interested in.",
            documents, query
        );
        let mut speak = format!("I found {} you may be interested in.", documents);
        if term_found {
            speak.insert_str(0, "Also, ");
        }

        let mut reply = OutboundReply::speech(text, speak);
        reply.cards = cards;
        reply.layout = AttachmentLayout::Carousel;
        reply.suggested_action = Some(SuggestedAction {
            title: SEE_MORE_TITLE.to_string(),
            url: self.see_more_link(query),
        });
        reply
    }

    pub fn search_failed(&self) -> OutboundReply {
        OutboundReply::message(SEARCH_FAILED)
    }

    pub fn see_more_link(&self, query: &str) -> String {
        format!("{}{}", self.see_more_url, urlencoding::encode(query))
    }
}
