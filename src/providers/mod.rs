//! External provider boundaries
//!
//! This module defines the seams to optional external services: a text model
//! for classification, a content-search backend, and a search-query generator.
//! Every boundary has a deterministic local fallback, so the engine works
//! identically (with reduced diversity) when no provider is wired in.
//!
//! Implementations must apply their own bounded timeout; the engine treats
//! any `Err` as "provider unavailable" and degrades to the fallback.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::types::{Category, Platform, TitleIndicators};

/// Structured prompt payload handed to a classifier provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationPrompt {
    pub title: String,
    pub description: String,
    pub channel: String,
    pub duration_sec: u32,
    pub platform: Platform,
    pub indicators: TitleIndicators,
}

/// One candidate item returned by a search provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub description: String,
    /// Duration in seconds when the backend reports one
    #[serde(default)]
    pub duration_sec: Option<u32>,
}

/// Text-model boundary for content classification.
///
/// Returns free text expected to contain a JSON object with the five
/// Classification fields. The consumer tolerates extraneous text around the
/// JSON (fenced code blocks, prose) and validates the decoded object before
/// trusting it.
pub trait ClassifierProvider: Send + Sync {
    fn classify(&self, prompt: &ClassificationPrompt) -> Result<String, ProviderError>;
}

/// Content-search boundary used by the recommendation selector.
pub trait SearchProvider: Send + Sync {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ProviderError>;
}

/// Search-query generation boundary (typically the same text model as the
/// classifier, prompted differently).
pub trait QueryGenerator: Send + Sync {
    fn queries(&self, title: &str, category: Category) -> Result<Vec<String>, ProviderError>;
}
