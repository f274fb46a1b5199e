//! Projects raw search hits into result cards.
//!
//! The enrichment payload is a JSON document whose keys are enrichment-tree
//! paths. Multi-page scans lead with an administrative cover sheet, so when a
//! hit has two or more page thumbnails the second page is shown instead.

use serde::Deserialize;

use hoover_core::{ResultCard, SearchHit};

/// Separator between pages in the extracted document text.
pub const PAGE_BREAK_MARKER: &str = "[image: image1.tif]";

/// Maximum excerpt length in characters, ellipsis included.
pub const MAX_EXCERPT_CHARS: usize = 500;

const ELLIPSIS: char = '…';

#[derive(Debug, Default, Deserialize)]
struct EnrichmentPayload {
    #[serde(rename = "/document/normalized_images/*/imageStoreUri", default)]
    thumbnails: Option<Vec<String>>,
    #[serde(rename = "/document", default)]
    document: Option<DocumentMetadata>,
    #[serde(rename = "/document/finalText", default)]
    final_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentMetadata {
    #[serde(default)]
    metadata_storage_path: Option<String>,
    #[serde(default)]
    metadata_storage_sas_token: Option<String>,
}

/// Why a hit produced no card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingPayload,
    MalformedPayload(String),
    NoThumbnails,
    MissingStoragePath,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingPayload => write!(f, "hit has no enrichment payload"),
            SkipReason::MalformedPayload(e) => write!(f, "malformed enrichment payload: {}", e),
            SkipReason::NoThumbnails => write!(f, "hit has no page thumbnails"),
            SkipReason::MissingStoragePath => write!(f, "hit has no storage path"),
        }
    }
}

/// Stateless projector from [`SearchHit`] to [`ResultCard`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultProjector;

impl ResultProjector {
    pub fn new() -> Self {
        Self
    }

    /// Project one hit.
    pub fn project(&self, hit: &SearchHit) -> Result<ResultCard, SkipReason> {
        let raw = hit.enriched.as_deref().ok_or(SkipReason::MissingPayload)?;
        let payload: EnrichmentPayload = serde_json::from_str(raw)
            .map_err(|e| SkipReason::MalformedPayload(e.to_string()))?;

        let thumbnails = payload
            .thumbnails
            .filter(|t| !t.is_empty())
            .ok_or(SkipReason::NoThumbnails)?;
        let document = payload.document.unwrap_or_default();
        let path = document
            .metadata_storage_path
            .filter(|p| !p.is_empty())
            .ok_or(SkipReason::MissingStoragePath)?;

        let multi_page = thumbnails.len() > 1;
        let image_url = thumbnails[usize::from(multi_page)].clone();

        let action_url = match document.metadata_storage_sas_token.as_deref() {
            Some(token) if !token.is_empty() => format!("{}?{}", path, token),
            _ => path,
        };

        let text = payload.final_text.unwrap_or_default();
        let body = if multi_page {
            skip_cover_page(&text)
        } else {
            text.as_str()
        };

        Ok(ResultCard {
            image_url,
            excerpt: truncate_excerpt(body),
            action_url,
        })
    }

    /// Project every hit, skipping (and logging) the ones that cannot be shown.
    pub fn project_all(&self, hits: &[SearchHit]) -> Vec<ResultCard> {
        hits.iter()
            .enumerate()
            .filter_map(|(rank, hit)| match self.project(hit) {
                Ok(card) => Some(card),
                Err(reason @ SkipReason::MalformedPayload(_)) => {
                    tracing::warn!(rank, %reason, "Skipping search hit");
                    None
                }
                Err(reason) => {
                    tracing::debug!(rank, %reason, "Skipping search hit");
                    None
                }
            })
            .collect()
    }
}

/// Text after the first page break. The whole text is kept when there is no
/// break or the text opens with one.
fn skip_cover_page(text: &str) -> &str {
    match text.split_once(PAGE_BREAK_MARKER) {
        Some((cover, rest)) if !cover.is_empty() => rest,
        _ => text,
    }
}

/// Cap `text` at [`MAX_EXCERPT_CHARS`] characters, ending in an ellipsis
/// when shortened.
pub fn truncate_excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_EXCERPT_CHARS) {
        None => text.to_string(),
        Some(_) => {
            let cut = text
                .char_indices()
                .nth(MAX_EXCERPT_CHARS - 1)
                .map_or(text.len(), |(i, _)| i);
            let mut excerpt = text[..cut].to_string();
            excerpt.push(ELLIPSIS);
            excerpt
        }
    }
}
