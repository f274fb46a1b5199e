//! Turn handler: drives one inbound turn from classification to reply.
//!
//! A message turn is either answered with canned small talk or turned into a
//! search. Cryptonym definitions go out first, then the search runs on a
//! spawned task while typing indicators keep the channel alive. Membership
//! turns greet every participant not seen before.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use hoover_core::{HooverConfig, InboundTurn, SearchHit, TurnKind};
use hoover_search::{SearchBackend, SearchError};

use crate::annotator::TermAnnotator;
use crate::error::ChatError;
use crate::greeting::GreetedSet;
use crate::intent::{SmallTalk, TurnIntent};
use crate::normalizer::QueryNormalizer;
use crate::projector::ResultProjector;
use crate::reply::ReplyComposer;
use crate::state::{PhaseTracker, TurnPhase};
use crate::transport::{Transport, TransportError};
use crate::vocabulary::VocabularyIndex;

/// Tunables for turn handling.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub max_results: usize,
    pub heartbeat_interval: Duration,
    pub search_timeout: Duration,
    pub max_message_length: usize,
    pub see_more_url: String,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self::from_config(&HooverConfig::default())
    }
}

impl TurnSettings {
    pub fn from_config(config: &HooverConfig) -> Self {
        Self {
            max_results: config.search.max_results,
            heartbeat_interval: Duration::from_millis(config.chat.heartbeat_interval_ms),
            search_timeout: Duration::from_secs(config.chat.search_timeout_secs),
            max_message_length: config.chat.max_message_length,
            see_more_url: config.chat.see_more_url.clone(),
        }
    }
}

/// What a turn did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Participants greeted on a membership turn (may be empty).
    Greeted(Vec<String>),
    SmallTalk(SmallTalk),
    Searched {
        query: String,
        terms: Vec<String>,
        cards: usize,
        /// The result reply was withheld: a single card next to a definition.
        suppressed: bool,
    },
    SearchFailed {
        query: String,
        error: String,
    },
    /// The client went away before the turn finished.
    Cancelled,
    Ignored,
}

enum SearchStatus {
    Completed(Vec<SearchHit>),
    Failed(String),
    Cancelled,
}

/// Handles inbound turns. Shared across requests behind an `Arc`.
pub struct TurnHandler {
    annotator: TermAnnotator,
    normalizer: QueryNormalizer,
    projector: ResultProjector,
    composer: ReplyComposer,
    backend: Arc<dyn SearchBackend>,
    greeted: Arc<GreetedSet>,
    settings: TurnSettings,
}

impl TurnHandler {
    pub fn new(
        vocabulary: Arc<VocabularyIndex>,
        backend: Arc<dyn SearchBackend>,
        greeted: Arc<GreetedSet>,
        settings: TurnSettings,
    ) -> Self {
        Self {
            annotator: TermAnnotator::new(vocabulary),
            normalizer: QueryNormalizer,
            projector: ResultProjector,
            composer: ReplyComposer::new(settings.see_more_url.clone()),
            backend,
            greeted,
            settings,
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.annotator.vocabulary().len()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn greeted(&self) -> &GreetedSet {
        &self.greeted
    }

    /// Reject message turns that are empty or too long. Other kinds pass.
    pub fn validate(&self, turn: &InboundTurn) -> Result<(), ChatError> {
        if turn.kind != TurnKind::Message {
            return Ok(());
        }
        let text = turn.text().trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > self.settings.max_message_length {
            return Err(ChatError::MessageTooLong(self.settings.max_message_length));
        }
        Ok(())
    }

    /// Handle one inbound turn, sending replies through `transport`.
    ///
    /// A transport that reports [`TransportError::Closed`] ends the turn as
    /// [`TurnOutcome::Cancelled`]; other transport failures are returned.
    pub async fn handle(
        &self,
        turn: &InboundTurn,
        transport: &dyn Transport,
    ) -> Result<TurnOutcome, ChatError> {
        // The bot is a member of every conversation it sees; never greet it.
        if let Some(bot) = &turn.recipient {
            self.greeted.insert(&bot.id);
        }

        let mut tracker = PhaseTracker::new(turn.id.as_str());
        let result = match turn.kind {
            TurnKind::Message => self.handle_message(turn, transport, &mut tracker).await,
            TurnKind::ConversationUpdate => {
                self.handle_members_added(turn, transport, &mut tracker)
                    .await
            }
            TurnKind::Other => Ok(TurnOutcome::Ignored),
        };

        match result {
            Err(ChatError::Transport(TransportError::Closed)) => {
                tracing::info!(turn = %turn.id, "Client disconnected, turn cancelled");
                Ok(TurnOutcome::Cancelled)
            }
            Ok(outcome) => {
                tracing::debug!(turn = %turn.id, ?outcome, "Turn handled");
                Ok(outcome)
            }
            Err(e) => Err(e),
        }
    }

    async fn handle_members_added(
        &self,
        turn: &InboundTurn,
        transport: &dyn Transport,
        tracker: &mut PhaseTracker,
    ) -> Result<TurnOutcome, ChatError> {
        tracker.advance(TurnPhase::Greeting)?;

        let mut greeted = Vec::new();
        for member in &turn.members_added {
            if !self.greeted.insert(&member.id) {
                continue;
            }
            tracing::info!(member = %member.id, "Greeting new participant");
            if let Err(e) = transport.send_reply(&self.composer.greeting()).await {
                // Undelivered, so the next membership turn tries again.
                self.greeted.remove(&member.id);
                return Err(e.into());
            }
            greeted.push(member.id.clone());
        }

        tracker.advance(TurnPhase::Idle)?;
        Ok(TurnOutcome::Greeted(greeted))
    }

    async fn handle_message(
        &self,
        turn: &InboundTurn,
        transport: &dyn Transport,
        tracker: &mut PhaseTracker,
    ) -> Result<TurnOutcome, ChatError> {
        self.validate(turn)?;
        let text = turn.text().trim();

        tracker.advance(TurnPhase::Classifying)?;

        if let TurnIntent::SmallTalk(talk) = TurnIntent::classify(text) {
            tracker.advance(TurnPhase::SmallTalk)?;
            tracker.advance(TurnPhase::Replying)?;
            transport.send_reply(&self.composer.small_talk(talk)).await?;
            tracker.advance(TurnPhase::Idle)?;
            return Ok(TurnOutcome::SmallTalk(talk));
        }

        tracker.advance(TurnPhase::Searching)?;

        let annotation = self.annotator.annotate(text);
        for hit in &annotation.hits {
            transport.send_reply(&self.composer.definition(hit)).await?;
        }
        let terms: Vec<String> = annotation.hits.iter().map(|h| h.term.clone()).collect();

        let query = self.normalizer.normalize(&annotation.text);
        tracing::info!(
            turn = %turn.id,
            query = %query,
            terms = terms.len(),
            backend = self.backend.name(),
            "Searching"
        );

        let hits = match self.run_search(&query, transport).await? {
            SearchStatus::Completed(hits) => hits,
            SearchStatus::Failed(error) => {
                tracing::warn!(turn = %turn.id, query = %query, %error, "Search failed");
                tracker.advance(TurnPhase::Replying)?;
                transport.send_reply(&self.composer.search_failed()).await?;
                tracker.advance(TurnPhase::Idle)?;
                return Ok(TurnOutcome::SearchFailed { query, error });
            }
            SearchStatus::Cancelled => {
                tracker.advance(TurnPhase::Idle)?;
                return Ok(TurnOutcome::Cancelled);
            }
        };

        let cards = self.projector.project_all(&hits);
        let card_count = cards.len();
        let suppressed = card_count == 1 && annotation.found();

        tracker.advance(TurnPhase::Replying)?;
        if suppressed {
            tracing::debug!(turn = %turn.id, "Single result next to a definition, reply withheld");
        } else {
            let reply = self
                .composer
                .search_results(&query, cards, annotation.found());
            transport.send_reply(&reply).await?;
        }
        tracker.advance(TurnPhase::Idle)?;

        Ok(TurnOutcome::Searched {
            query,
            terms,
            cards: card_count,
            suppressed,
        })
    }

    /// Run the backend query on its own task, sending a typing indicator every
    /// heartbeat until it finishes, times out, or the client goes away.
    async fn run_search(
        &self,
        query: &str,
        transport: &dyn Transport,
    ) -> Result<SearchStatus, ChatError> {
        if query.is_empty() {
            tracing::debug!("Nothing left to search for after normalization");
            return Ok(SearchStatus::Completed(Vec::new()));
        }

        let backend = Arc::clone(&self.backend);
        let owned_query = query.to_string();
        let top = self.settings.max_results;
        let limit = self.settings.search_timeout;
        let mut task = tokio::spawn(async move {
            match tokio::time::timeout(limit, backend.search(&owned_query, top)).await {
                Ok(result) => result,
                Err(_) => Err(SearchError::Timeout(limit.as_secs())),
            }
        });

        let mut heartbeat = tokio::time::interval(self.settings.heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let status = loop {
            tokio::select! {
                biased;

                _ = transport.closed() => {
                    task.abort();
                    return Ok(SearchStatus::Cancelled);
                }
                joined = &mut task => {
                    break match joined {
                        Ok(Ok(hits)) => SearchStatus::Completed(hits),
                        Ok(Err(e)) => SearchStatus::Failed(e.to_string()),
                        Err(e) => SearchStatus::Failed(format!("search task failed: {}", e)),
                    };
                }
                _ = heartbeat.tick() => {
                    if let Err(e) = transport.send_typing().await {
                        task.abort();
                        return Err(e.into());
                    }
                }
            }
        };

        transport.send_typing().await?;
        Ok(status)
    }
}
