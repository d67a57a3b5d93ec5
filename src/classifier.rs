//! Content classification
//!
//! This module assigns a content category and trigger labels, either through
//! an external text-model provider or through a deterministic keyword
//! heuristic. The strategy is fixed at construction time; call sites never
//! branch on provider presence. A provider reply that is missing, unparsable,
//! or fails schema validation degrades to the heuristic, never to an error.

use crate::providers::{ClassificationPrompt, ClassifierProvider};
use crate::types::{
    Category, Classification, ContentContext, ContentItem, ThumbnailSentiment, Trigger,
};

enum Strategy {
    Provider(Box<dyn ClassifierProvider>),
    Heuristic,
}

/// Classifier with a provider-backed or heuristic strategy
pub struct Classifier {
    strategy: Strategy,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::heuristic()
    }
}

impl Classifier {
    /// Deterministic keyword-rule classifier, no external dependencies
    pub fn heuristic() -> Self {
        Self {
            strategy: Strategy::Heuristic,
        }
    }

    /// Provider-backed classifier; degrades to the heuristic on any failure
    pub fn with_provider(provider: Box<dyn ClassifierProvider>) -> Self {
        Self {
            strategy: Strategy::Provider(provider),
        }
    }

    /// Classify a normalized item. Total: always returns a valid result.
    pub fn classify(&self, item: &ContentItem, context: &ContentContext) -> Classification {
        if let Strategy::Provider(provider) = &self.strategy {
            match self.classify_with_provider(provider.as_ref(), item, context) {
                Some(classification) => {
                    tracing::debug!(
                        category = classification.category.as_str(),
                        confidence = classification.confidence,
                        "provider classification accepted"
                    );
                    return classification;
                }
                None => {
                    tracing::warn!(item_id = %item.id, "classifier provider degraded, using heuristic fallback");
                }
            }
        }

        classify_heuristic(item, context)
    }

    fn classify_with_provider(
        &self,
        provider: &dyn ClassifierProvider,
        item: &ContentItem,
        context: &ContentContext,
    ) -> Option<Classification> {
        let prompt = ClassificationPrompt {
            title: item.title.clone(),
            description: item.description.clone(),
            channel: item.channel.clone(),
            duration_sec: item.duration_sec,
            platform: item.platform,
            indicators: context.title_indicators,
        };

        let reply = match provider.classify(&prompt) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "classifier provider call failed");
                return None;
            }
        };

        let value = extract_json(&reply)?;
        let classification: Classification = serde_json::from_value(value).ok()?;
        if !classification.is_valid() {
            tracing::warn!("provider classification failed schema validation");
            return None;
        }
        Some(classification)
    }
}

/// Extract a JSON object from free text, tolerating fenced code blocks and
/// surrounding prose.
fn extract_json(text: &str) -> Option<serde_json::Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }

    // Markdown code fence
    if let Some(start) = text.find("```json") {
        let body = &text[start + 7..];
        if let Some(end) = body.find("```") {
            if let Ok(value) = serde_json::from_str(body[..end].trim()) {
                return Some(value);
            }
        }
    }

    // First-to-last brace span
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Deterministic rule-based fallback classification
fn classify_heuristic(item: &ContentItem, context: &ContentContext) -> Classification {
    let indicators = &context.title_indicators;
    let title = item.title.to_lowercase();

    let (category, confidence) = if indicators.has_educational_keywords {
        (Category::Educational, 0.75)
    } else if indicators.has_addictive_keywords {
        (Category::Addictive, 0.80)
    } else if indicators.has_clickbait_keywords {
        (Category::Entertainment, 0.70)
    } else {
        (Category::Neutral, 0.60)
    };

    let mut triggers = Vec::new();
    if item.duration_sec < 60 {
        triggers.push(Trigger::ShortDuration);
    }
    if title.contains("compilation") || title.contains("best of") {
        triggers.push(Trigger::Compilation);
    }
    if ["funny", "meme", "laugh"].iter().any(|kw| title.contains(kw)) {
        triggers.push(Trigger::Humor);
    }
    if ["shocking", "insane", "crazy"].iter().any(|kw| title.contains(kw)) {
        triggers.push(Trigger::Shock);
    }
    if ["viral", "trending", "must see"].iter().any(|kw| title.contains(kw)) {
        triggers.push(Trigger::Fomo);
    }
    if indicators.has_clickbait_keywords {
        triggers.push(Trigger::Clickbait);
    }

    let thumbnail_sentiment = if indicators.has_clickbait_keywords {
        ThumbnailSentiment::Clickbait
    } else {
        match category {
            Category::Educational => ThumbnailSentiment::Positive,
            Category::Addictive => ThumbnailSentiment::Negative,
            _ => ThumbnailSentiment::Neutral,
        }
    };

    Classification {
        reason: heuristic_reason(category, &triggers),
        category,
        triggers,
        thumbnail_sentiment,
        confidence,
    }
}

fn heuristic_reason(category: Category, triggers: &[Trigger]) -> String {
    let has = |t: &Trigger| triggers.contains(t);

    match category {
        Category::Addictive => {
            if has(&Trigger::ShortDuration) && has(&Trigger::Compilation) {
                "Short compilation triggers dopamine loops".to_string()
            } else if has(&Trigger::ShortDuration) {
                "Short-form content encourages binge-watching".to_string()
            } else if has(&Trigger::Compilation) {
                "Compilation format promotes extended viewing".to_string()
            } else {
                "Content patterns suggest addictive potential".to_string()
            }
        }
        Category::Educational => "Educational content for skill development".to_string(),
        Category::Productive => "Productive content aligned with goals".to_string(),
        Category::Harmful => "Content may have negative impact".to_string(),
        _ => "General content without strong indicators".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::normalizer::{ContentNormalizer, RawContentItem};
    use pretty_assertions::assert_eq;

    fn normalized(title: &str, duration_sec: u32) -> (ContentItem, ContentContext) {
        let raw = RawContentItem {
            title: Some(title.to_string()),
            duration_sec: Some(duration_sec),
            ..Default::default()
        };
        ContentNormalizer::normalize(&raw).unwrap()
    }

    #[test]
    fn test_heuristic_addictive_compilation() {
        let (item, context) = normalized("Try Not To Laugh - Funny Memes Compilation 2024", 45);
        let classification = Classifier::heuristic().classify(&item, &context);

        assert_eq!(classification.category, Category::Addictive);
        assert_eq!(classification.confidence, 0.80);
        assert_eq!(
            classification.triggers,
            vec![Trigger::ShortDuration, Trigger::Compilation, Trigger::Humor]
        );
        assert_eq!(classification.thumbnail_sentiment, ThumbnailSentiment::Negative);
        assert_eq!(classification.reason, "Short compilation triggers dopamine loops");
    }

    #[test]
    fn test_heuristic_educational_takes_priority() {
        // "tutorial" (educational) outranks "viral" (addictive) in the priority order
        let (item, context) = normalized("Viral Marketing Tutorial", 1200);
        let classification = Classifier::heuristic().classify(&item, &context);

        assert_eq!(classification.category, Category::Educational);
        assert_eq!(classification.confidence, 0.75);
        assert_eq!(classification.thumbnail_sentiment, ThumbnailSentiment::Positive);
        assert_eq!(classification.triggers, vec![Trigger::Fomo]);
    }

    #[test]
    fn test_heuristic_clickbait_is_entertainment() {
        let (item, context) = normalized("You Won't Believe What Happened Next", 240);
        let classification = Classifier::heuristic().classify(&item, &context);

        assert_eq!(classification.category, Category::Entertainment);
        assert_eq!(classification.confidence, 0.70);
        assert!(classification.triggers.contains(&Trigger::Clickbait));
        assert_eq!(classification.thumbnail_sentiment, ThumbnailSentiment::Clickbait);
    }

    #[test]
    fn test_heuristic_neutral_default() {
        let (item, context) = normalized("Morning news roundup", 600);
        let classification = Classifier::heuristic().classify(&item, &context);

        assert_eq!(classification.category, Category::Neutral);
        assert_eq!(classification.confidence, 0.60);
        assert!(classification.triggers.is_empty());
        assert_eq!(classification.reason, "General content without strong indicators");
    }

    #[test]
    fn test_heuristic_is_deterministic() {
        let (item, context) = normalized("Crazy fails compilation", 30);
        let classifier = Classifier::heuristic();
        let first = classifier.classify(&item, &context);
        let second = classifier.classify(&item, &context);
        assert_eq!(first, second);
    }

    struct CannedProvider(String);

    impl ClassifierProvider for CannedProvider {
        fn classify(&self, _prompt: &ClassificationPrompt) -> Result<String, ProviderError> {
            Ok(self.0.clone())
        }
    }

    struct FailingProvider;

    impl ClassifierProvider for FailingProvider {
        fn classify(&self, _prompt: &ClassificationPrompt) -> Result<String, ProviderError> {
            Err(ProviderError("timeout after 5s".to_string()))
        }
    }

    #[test]
    fn test_provider_json_in_code_fence() {
        let reply = "Sure, here is the classification:\n```json\n{\"category\": \"harmful\", \"reason\": \"toxic framing\", \"triggers\": [\"shock\"], \"thumbnail_sentiment\": \"negative\", \"confidence\": 0.91}\n```\nLet me know if you need more.";
        let (item, context) = normalized("Some upsetting clip", 120);
        let classification =
            Classifier::with_provider(Box::new(CannedProvider(reply.to_string())))
                .classify(&item, &context);

        assert_eq!(classification.category, Category::Harmful);
        assert_eq!(classification.triggers, vec![Trigger::Shock]);
        assert_eq!(classification.confidence, 0.91);
    }

    #[test]
    fn test_provider_invalid_confidence_falls_back() {
        let reply = r#"{"category": "addictive", "reason": "x", "triggers": [], "thumbnail_sentiment": "neutral", "confidence": 1.7}"#;
        let (item, context) = normalized("Morning news roundup", 600);
        let classification =
            Classifier::with_provider(Box::new(CannedProvider(reply.to_string())))
                .classify(&item, &context);

        // Falls back to the heuristic verdict, not the invalid provider one
        assert_eq!(classification.category, Category::Neutral);
        assert_eq!(classification.confidence, 0.60);
    }

    #[test]
    fn test_provider_unknown_category_falls_back() {
        let reply = r#"{"category": "brainrot", "reason": "x", "triggers": [], "thumbnail_sentiment": "neutral", "confidence": 0.9}"#;
        let (item, context) = normalized("Morning news roundup", 600);
        let classification =
            Classifier::with_provider(Box::new(CannedProvider(reply.to_string())))
                .classify(&item, &context);

        assert_eq!(classification.category, Category::Neutral);
    }

    #[test]
    fn test_provider_garbage_falls_back() {
        let (item, context) = normalized("Morning news roundup", 600);
        let classification =
            Classifier::with_provider(Box::new(CannedProvider("no json here".to_string())))
                .classify(&item, &context);
        assert_eq!(classification.category, Category::Neutral);
    }

    #[test]
    fn test_provider_error_falls_back() {
        let (item, context) = normalized("Crazy fails compilation", 30);
        let classification =
            Classifier::with_provider(Box::new(FailingProvider)).classify(&item, &context);
        assert_eq!(classification.category, Category::Addictive);
    }

    #[test]
    fn test_extract_json_variants() {
        assert!(extract_json(r#"{"a": 1}"#).is_some());
        assert!(extract_json("prefix {\"a\": 1} suffix").is_some());
        assert!(extract_json("```json\n{\"a\": 1}\n```").is_some());
        assert!(extract_json("nothing structured").is_none());
    }
}
