//! Conversational core of the Hoover document-search bot.
//!
//! Turns free-text messages into search queries, answers cryptonym lookups
//! inline, and renders search hits as reply cards. The [`TurnHandler`]
//! drives one inbound turn end to end against a [`Transport`] and a
//! [`hoover_search::SearchBackend`].

pub mod annotator;
pub mod card;
pub mod error;
pub mod greeting;
pub mod handler;
pub mod intent;
pub mod normalizer;
pub mod projector;
pub mod reply;
pub mod state;
pub mod transport;
pub mod vocabulary;

pub use annotator::{Annotation, TermAnnotator, TermHit};
pub use error::ChatError;
pub use greeting::GreetedSet;
pub use handler::{TurnHandler, TurnOutcome, TurnSettings};
pub use intent::{SmallTalk, TurnIntent};
pub use normalizer::QueryNormalizer;
pub use projector::{ResultProjector, SkipReason};
pub use reply::ReplyComposer;
pub use state::{PhaseTracker, TurnPhase};
pub use transport::{Transport, TransportError};
pub use vocabulary::{JsonFileLoader, VocabularyIndex, VocabularyLoader};
