//! Content normalization
//!
//! This module validates and canonicalizes raw content items and derives the
//! cheap lexical/structural context used by later stages:
//! - Required-field validation (title)
//! - Optional-field defaulting and id derivation
//! - Duration bucketing and content length classification
//! - Title keyword indicators

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::EngineError;
use crate::types::{
    ContentContext, ContentItem, ContentLengthClass, ContentMetadata, DurationBucket, Platform,
    TitleIndicators,
};

/// Title keywords suggesting addictive short-form patterns
const ADDICTIVE_KEYWORDS: &[&str] = &[
    "try not to laugh",
    "compilation",
    "meme",
    "funny",
    "best of",
    "fails",
    "reaction",
    "tiktok",
    "viral",
];

/// Title keywords suggesting educational content
const EDUCATIONAL_KEYWORDS: &[&str] = &[
    "tutorial",
    "learn",
    "study",
    "lecture",
    "course",
    "guide",
    "how to",
    "explained",
    "documentary",
];

/// Title keywords suggesting clickbait framing
const CLICKBAIT_KEYWORDS: &[&str] = &[
    "you won't believe",
    "shocking",
    "must see",
    "gone wrong",
    "insane",
    "crazy",
    "unbelievable",
];

/// A raw content item as received from a client surface.
///
/// Everything except the title is optional and defaults during normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawContentItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub duration_sec: Option<u32>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

/// Normalizer for validating raw items and deriving context
pub struct ContentNormalizer;

impl ContentNormalizer {
    /// Validate and canonicalize a raw item, deriving its context.
    ///
    /// Pure function of the input: repeated ingestion of the same item
    /// (without an externally supplied id) yields an identical result.
    pub fn normalize(raw: &RawContentItem) -> Result<(ContentItem, ContentContext), EngineError> {
        let title = raw
            .title
            .as_deref()
            .ok_or_else(|| EngineError::MissingField("title".to_string()))?
            .trim()
            .to_string();

        let url = raw.url.clone().unwrap_or_default();
        let platform = Platform::parse_lenient(raw.platform.as_deref().unwrap_or("youtube"));

        let item = ContentItem {
            id: raw
                .id
                .clone()
                .unwrap_or_else(|| derive_id(&title, &url)),
            url,
            duration_sec: raw.duration_sec.unwrap_or(0),
            channel: raw.channel.clone().unwrap_or_else(|| "Unknown".to_string()),
            thumbnail: raw.thumbnail.clone().unwrap_or_default(),
            description: raw.description.clone().unwrap_or_default(),
            platform,
            metadata: ContentMetadata {
                has_duration: raw.duration_sec.is_some(),
                has_thumbnail: raw.thumbnail.as_deref().is_some_and(|t| !t.is_empty()),
                title_length: title.chars().count(),
                has_description: raw.description.as_deref().is_some_and(|d| !d.is_empty()),
            },
            title,
        };

        let context = derive_context(&item);
        Ok((item, context))
    }
}

/// Derive a short stable identifier from title and url
fn derive_id(title: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())[..12].to_string()
}

/// Derive read-only context from a normalized item
fn derive_context(item: &ContentItem) -> ContentContext {
    ContentContext {
        platform: item.platform,
        length_class: classify_length(item.duration_sec),
        duration_bucket: bucket_duration(item.duration_sec),
        title_indicators: extract_title_indicators(&item.title),
    }
}

fn classify_length(duration_sec: u32) -> ContentLengthClass {
    if duration_sec < 60 {
        ContentLengthClass::ShortForm
    } else if duration_sec < 600 {
        ContentLengthClass::MediumForm
    } else {
        ContentLengthClass::LongForm
    }
}

fn bucket_duration(duration_sec: u32) -> DurationBucket {
    match duration_sec {
        0..=59 => DurationBucket::Under1Min,
        60..=299 => DurationBucket::OneToFiveMin,
        300..=899 => DurationBucket::FiveToFifteenMin,
        900..=3599 => DurationBucket::FifteenMinToOneHour,
        _ => DurationBucket::OverOneHour,
    }
}

fn extract_title_indicators(title: &str) -> TitleIndicators {
    let lower = title.to_lowercase();

    TitleIndicators {
        has_addictive_keywords: ADDICTIVE_KEYWORDS.iter().any(|kw| lower.contains(kw)),
        has_educational_keywords: EDUCATIONAL_KEYWORDS.iter().any(|kw| lower.contains(kw)),
        has_clickbait_keywords: CLICKBAIT_KEYWORDS.iter().any(|kw| lower.contains(kw)),
        has_digits: title.chars().any(|c| c.is_ascii_digit()),
        has_caps_word: title
            .split_whitespace()
            .any(|w| w.len() > 2 && w.chars().all(|c| !c.is_lowercase()) && w.chars().any(|c| c.is_uppercase())),
        has_non_ascii: title.chars().any(|c| !c.is_ascii()),
    }
}
