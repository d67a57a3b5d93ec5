//! Core types for the Unhook pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: normalized content items, derived context, classifications, risk
//! scores, behavior insights, alternatives, and intervention decisions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Source platform of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Instagram,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
        }
    }

    /// Lenient parse: unrecognized values normalize to YouTube.
    pub fn parse_lenient(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "instagram" => Platform::Instagram,
            "youtube" => Platform::Youtube,
            other => {
                tracing::warn!(platform = other, "unsupported platform, defaulting to youtube");
                Platform::Youtube
            }
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Youtube
    }
}

/// Inferred content length class (Shorts/Reels vs regular vs long-form)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentLengthClass {
    ShortForm,
    MediumForm,
    LongForm,
}

/// Ordered duration buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DurationBucket {
    #[serde(rename = "under_1min")]
    Under1Min,
    #[serde(rename = "1_to_5min")]
    OneToFiveMin,
    #[serde(rename = "5_to_15min")]
    FiveToFifteenMin,
    #[serde(rename = "15min_to_1hr")]
    FifteenMinToOneHour,
    #[serde(rename = "over_1hr")]
    OverOneHour,
}

/// Boolean indicators extracted from a content title
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleIndicators {
    pub has_addictive_keywords: bool,
    pub has_educational_keywords: bool,
    pub has_clickbait_keywords: bool,
    pub has_digits: bool,
    pub has_caps_word: bool,
    pub has_non_ascii: bool,
}

/// Structural metadata derived during normalization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Whether the raw input carried an explicit duration
    pub has_duration: bool,
    pub has_thumbnail: bool,
    pub title_length: usize,
    pub has_description: bool,
}

/// A validated, canonical content item. Immutable once normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Stable identifier (derived from title+url when not supplied)
    pub id: String,
    pub title: String,
    pub url: String,
    /// Duration in seconds (0 when unknown)
    pub duration_sec: u32,
    pub channel: String,
    pub thumbnail: String,
    pub description: String,
    pub platform: Platform,
    pub metadata: ContentMetadata,
}

/// Cheap lexical/structural context derived once from a ContentItem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentContext {
    pub platform: Platform,
    pub length_class: ContentLengthClass,
    pub duration_bucket: DurationBucket,
    pub title_indicators: TitleIndicators,
}

/// Content category assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Educational,
    Productive,
    Neutral,
    Entertainment,
    Addictive,
    Harmful,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Educational => "educational",
            Category::Productive => "productive",
            Category::Neutral => "neutral",
            Category::Entertainment => "entertainment",
            Category::Addictive => "addictive",
            Category::Harmful => "harmful",
        }
    }
}

/// Thumbnail sentiment assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailSentiment {
    Positive,
    Neutral,
    Negative,
    Clickbait,
}

/// A detected addictive-pattern label.
///
/// The fixed vocabulary covers the patterns the scorer weights explicitly;
/// labels outside it (e.g. from a provider-backed classifier) are preserved
/// and score with the default weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    ShortDuration,
    Compilation,
    Humor,
    Shock,
    Fomo,
    Clickbait,
    Repetition,
    Other(String),
}

impl Trigger {
    pub fn as_str(&self) -> &str {
        match self {
            Trigger::ShortDuration => "short_duration",
            Trigger::Compilation => "compilation",
            Trigger::Humor => "humor",
            Trigger::Shock => "shock",
            Trigger::Fomo => "FOMO",
            Trigger::Clickbait => "clickbait",
            Trigger::Repetition => "repetition",
            Trigger::Other(label) => label,
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "short_duration" => Trigger::ShortDuration,
            "compilation" => Trigger::Compilation,
            "humor" => Trigger::Humor,
            "shock" => Trigger::Shock,
            "FOMO" => Trigger::Fomo,
            "clickbait" => Trigger::Clickbait,
            "repetition" => Trigger::Repetition,
            other => Trigger::Other(other.to_string()),
        }
    }
}

impl Serialize for Trigger {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Trigger {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Trigger::from_label(&label))
    }
}

/// Classification result for one content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    /// One-sentence explanation
    pub reason: String,
    pub triggers: Vec<Trigger>,
    pub thumbnail_sentiment: ThumbnailSentiment,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl Classification {
    /// Schema invariants beyond what the type system enforces.
    ///
    /// A classification failing this check is discarded and the heuristic
    /// fallback is used instead.
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence)
    }
}

/// Behavioral signals accompanying one content view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehavioralContext {
    /// Minutes spent in the current session
    #[serde(default)]
    pub session_minutes: u32,
    /// How many times similar content was viewed recently
    #[serde(default)]
    pub repeat_count: u32,
    /// Local time of day as "HH:MM" (leniently parsed)
    #[serde(default)]
    pub time_of_day: String,
    /// Whether the user explicitly searched for this content
    #[serde(default)]
    pub user_searched: bool,
}

impl BehavioralContext {
    /// Parse the hour out of `time_of_day`. Unparsable values yield None
    /// and contribute nothing to the score.
    pub fn hour(&self) -> Option<u32> {
        let head = self.time_of_day.split(':').next()?;
        match head.trim().parse::<u32>() {
            Ok(h) if h < 24 => Some(h),
            _ => None,
        }
    }

    /// Late night / early morning window: [23, 24) ∪ [0, 6)
    pub fn is_late_night(&self) -> bool {
        matches!(self.hour(), Some(h) if h >= 23 || h < 6)
    }
}

/// Coarse risk bucket derived from the addiction index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    Critical,
}

/// Intervention a client surface should apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterventionAction {
    None,
    Nudge,
    Blur,
    Replace,
    Lockout,
}

impl InterventionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionAction::None => "none",
            InterventionAction::Nudge => "nudge",
            InterventionAction::Blur => "blur",
            InterventionAction::Replace => "replace",
            InterventionAction::Lockout => "lockout",
        }
    }

    /// Lenient parse for API boundaries: unknown values fall back to None.
    pub fn parse_lenient(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "nudge" => InterventionAction::Nudge,
            "blur" => InterventionAction::Blur,
            "replace" => InterventionAction::Replace,
            "lockout" => InterventionAction::Lockout,
            _ => InterventionAction::None,
        }
    }
}

/// Sub-score breakdown of an addiction index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_score: u32,
    pub trigger_score: u32,
    pub behavioral_score: u32,
}

/// Composite risk assessment for one content item. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    /// Addiction index in [0, 100]
    pub index: u32,
    pub tier: RiskTier,
    pub action: InterventionAction,
    /// Human-readable contributing factors
    pub major_factors: Vec<String>,
    pub breakdown: ScoreBreakdown,
}

/// One recorded content view, as appended to a user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub observed_at: DateTime<Utc>,
    pub risk_index: u32,
    pub category: Category,
    /// Estimated minutes of watch time (item duration / 60)
    pub minutes: f64,
}

/// One calendar day's accumulated watch minutes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub minutes: f64,
}

/// Append-only per-user behavior history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub timestamps: Vec<DateTime<Utc>>,
    pub risk_scores: Vec<u32>,
    pub category_counts: HashMap<Category, u32>,
    pub late_night_count: u32,
    pub daily_minutes: Vec<DailyBucket>,
}

/// Longitudinal trend classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Aggregate usage summary over a user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub avg_daily_minutes: f64,
    pub avg_risk_score: f64,
    /// Number of daily buckets observed so far
    pub streak_days: usize,
    pub total_items: usize,
    pub trend: Trend,
}

/// Derived, read-only snapshot over a user profile. Recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorInsight {
    pub summary: UserSummary,
    pub early_warning: bool,
    pub suggested_schedule: String,
    pub insights: Vec<String>,
}

/// Kind of alternative content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternativeKind {
    Video,
    GuidedExercise,
}

/// A healthier alternative to an addictive content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub title: String,
    pub url: String,
    pub reason: String,
    pub search_query: String,
    #[serde(rename = "type")]
    pub kind: AlternativeKind,
    pub estimated_duration_sec: u32,
}

/// A call-to-action button on an intervention overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtaButton {
    pub label: String,
    pub action_key: String,
}

/// Presentation payload for the client surface. Purely derived, stateless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionDecision {
    pub action: InterventionAction,
    pub overlay_text: String,
    pub cta_buttons: Vec<CtaButton>,
    /// CSS snippet the surface may apply to the intervened element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styling_hint: Option<String>,
    /// Countdown in seconds (lockout only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown_sec: Option<u32>,
    pub alternatives_count: usize,
    pub risk_index: u32,
}

/// User feedback on a delivered intervention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Helpful,
    NotHelpful,
    AlternativeClicked,
}

/// One feedback submission, stored append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub decision_id: String,
    pub kind: FeedbackKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub received_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_platform_lenient_parse() {
        assert_eq!(Platform::parse_lenient("Instagram"), Platform::Instagram);
        assert_eq!(Platform::parse_lenient("youtube"), Platform::Youtube);
        assert_eq!(Platform::parse_lenient("tiktok"), Platform::Youtube);
    }

    #[test]
    fn test_trigger_roundtrip() {
        let json = r#"["short_duration","FOMO","doom_scroll"]"#;
        let triggers: Vec<Trigger> = serde_json::from_str(json).unwrap();
        assert_eq!(
            triggers,
            vec![
                Trigger::ShortDuration,
                Trigger::Fomo,
                Trigger::Other("doom_scroll".to_string()),
            ]
        );
        assert_eq!(serde_json::to_string(&triggers).unwrap(), json);
    }

    #[test]
    fn test_behavioral_hour_parsing() {
        let ctx = BehavioralContext {
            time_of_day: "23:45".to_string(),
            ..Default::default()
        };
        assert_eq!(ctx.hour(), Some(23));
        assert!(ctx.is_late_night());

        let ctx = BehavioralContext {
            time_of_day: "9:05".to_string(),
            ..Default::default()
        };
        assert_eq!(ctx.hour(), Some(9));
        assert!(!ctx.is_late_night());

        // Unparsable and out-of-range values contribute nothing
        for bogus in ["", "late", "25:00", ":30"] {
            let ctx = BehavioralContext {
                time_of_day: bogus.to_string(),
                ..Default::default()
            };
            assert_eq!(ctx.hour(), None, "input {:?}", bogus);
            assert!(!ctx.is_late_night());
        }
    }

    #[test]
    fn test_action_lenient_parse() {
        assert_eq!(InterventionAction::parse_lenient("blur"), InterventionAction::Blur);
        assert_eq!(InterventionAction::parse_lenient("LOCKOUT"), InterventionAction::Lockout);
        assert_eq!(InterventionAction::parse_lenient("banish"), InterventionAction::None);
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(serde_json::to_string(&Category::Addictive).unwrap(), "\"addictive\"");
        let parsed: Category = serde_json::from_str("\"educational\"").unwrap();
        assert_eq!(parsed, Category::Educational);
    }
}
