//! Spots known cryptonyms in an utterance and looks up their definitions.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

use crate::vocabulary::VocabularyIndex;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"));

/// A vocabulary term found in the utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermHit {
    /// Uppercase form of the term.
    pub term: String,
    pub definition: String,
}

impl TermHit {
    /// Display text of the definition reply.
    pub fn display(&self) -> String {
        format!("{}: {}", self.term, self.definition)
    }
}

/// Result of annotating one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Distinct hits in first-occurrence order.
    pub hits: Vec<TermHit>,
    /// The utterance with every matched token uppercased.
    pub text: String,
}

impl Annotation {
    /// Whether any term was found.
    pub fn found(&self) -> bool {
        !self.hits.is_empty()
    }
}

/// Looks up each word of an utterance in the vocabulary.
#[derive(Debug, Clone)]
pub struct TermAnnotator {
    vocabulary: Arc<VocabularyIndex>,
}

impl TermAnnotator {
    pub fn new(vocabulary: Arc<VocabularyIndex>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &VocabularyIndex {
        &self.vocabulary
    }

    pub fn annotate(&self, text: &str) -> Annotation {
        let mut hits = Vec::new();
        let mut seen = HashSet::new();

        let annotated = WORD_RE.replace_all(text, |caps: &Captures| {
            let word = &caps[0];
            let upper = word.to_uppercase();
            match self.vocabulary.get(&upper) {
                Some(definition) => {
                    if seen.insert(upper.clone()) {
                        hits.push(TermHit {
                            term: upper.clone(),
                            definition: definition.to_string(),
                        });
                    }
                    upper
                }
                None => word.to_string(),
            }
        });
        let text = annotated.into_owned();

        if !hits.is_empty() {
            tracing::debug!(terms = hits.len(), "Vocabulary terms found");
        }

        Annotation { hits, text }
    }
}
