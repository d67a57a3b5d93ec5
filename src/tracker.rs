//! Longitudinal behavior tracking
//!
//! This module maintains per-user rolling history (risk scores, timestamps,
//! category tallies, late-night counts, daily watch minutes) and derives
//! trend classification, early-warning flags, and an intervention-schedule
//! suggestion.
//!
//! Storage sits behind the `ProfileStore` trait so the analysis logic is
//! storage-agnostic. The default store is an in-memory concurrent map:
//! mutations for the same user are mutually exclusive, different users
//! proceed independently.

use chrono::Timelike;
use dashmap::DashMap;
use std::sync::Arc;

use crate::error::EngineError;
use crate::types::{
    BehaviorInsight, Category, DailyBucket, Observation, Trend, UserProfile, UserSummary,
};

/// Observations required before a trend can depart from "stable"
const MIN_TREND_OBSERVATIONS: usize = 3;

/// Storage seam for user profiles.
///
/// Implementations must serialize mutations per user id and preserve the
/// append-only contract; reads may observe any consistent snapshot.
pub trait ProfileStore: Send + Sync {
    /// Append one observation, creating the profile on first use
    fn append(&self, user_id: &str, observation: Observation);

    /// Clone the current profile state, if any
    fn snapshot(&self, user_id: &str) -> Option<UserProfile>;

    /// Remove all state for a user; returns whether anything existed
    fn remove(&self, user_id: &str) -> bool;

    /// Number of users with recorded state
    fn user_count(&self) -> usize;

    /// Serialize all profiles to JSON (for the CLI's persistence)
    fn export_json(&self) -> Result<String, EngineError>;

    /// Replace all profiles from JSON
    fn import_json(&self, json: &str) -> Result<(), EngineError>;
}

/// Default in-memory store backed by a concurrent map
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: DashMap<String, UserProfile>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn append(&self, user_id: &str, observation: Observation) {
        // The entry guard holds the shard write lock for the whole mutation,
        // so same-user appends cannot interleave.
        let mut profile = self.profiles.entry(user_id.to_string()).or_default();
        profile.value_mut().record(observation);
    }

    fn snapshot(&self, user_id: &str) -> Option<UserProfile> {
        self.profiles.get(user_id).map(|p| p.value().clone())
    }

    fn remove(&self, user_id: &str) -> bool {
        self.profiles.remove(user_id).is_some()
    }

    fn user_count(&self) -> usize {
        self.profiles.len()
    }

    fn export_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(&self.profiles)?)
    }

    fn import_json(&self, json: &str) -> Result<(), EngineError> {
        let loaded: DashMap<String, UserProfile> = serde_json::from_str(json)?;
        self.profiles.clear();
        for (user_id, profile) in loaded {
            self.profiles.insert(user_id, profile);
        }
        Ok(())
    }
}

impl UserProfile {
    /// Append one observation: timestamp, risk score, category tally,
    /// late-night counter, and daily-minutes accumulation.
    ///
    /// Day boundary: a new daily bucket starts when the observation's
    /// calendar date differs from the current bucket's date. The date comes
    /// from the caller-supplied timestamp, never from the wall clock.
    pub fn record(&mut self, observation: Observation) {
        self.timestamps.push(observation.observed_at);
        self.risk_scores.push(observation.risk_index);
        *self.category_counts.entry(observation.category).or_insert(0) += 1;

        let hour = observation.observed_at.hour();
        if hour >= 23 || hour < 6 {
            self.late_night_count += 1;
        }

        let date = observation.observed_at.date_naive();
        match self.daily_minutes.last_mut() {
            Some(bucket) if bucket.date == date => bucket.minutes += observation.minutes,
            _ => self.daily_minutes.push(DailyBucket {
                date,
                minutes: observation.minutes,
            }),
        }
    }
}

/// Tracker combining a profile store with pattern analysis
pub struct BehaviorTracker {
    store: Arc<dyn ProfileStore>,
}

impl Default for BehaviorTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorTracker {
    /// Tracker over the default in-memory store
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryProfileStore::new()),
        }
    }

    /// Tracker over an injected store (e.g. a durable backend)
    pub fn with_store(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    /// Record one observation for a user
    pub fn record(&self, user_id: &str, observation: Observation) {
        tracing::debug!(
            user_id,
            risk_index = observation.risk_index,
            category = observation.category.as_str(),
            "recording observation"
        );
        self.store.append(user_id, observation);
    }

    /// Analyze a user's longitudinal patterns.
    ///
    /// Unknown users get a neutral zero-state insight with no warning.
    pub fn analyze(&self, user_id: &str) -> BehaviorInsight {
        match self.store.snapshot(user_id) {
            Some(profile) => analyze_profile(&profile),
            None => zero_state_insight(),
        }
    }

    /// Drop all state for a user; returns whether anything existed
    pub fn forget(&self, user_id: &str) -> bool {
        self.store.remove(user_id)
    }
}

/// Neutral insight for users with no recorded history
fn zero_state_insight() -> BehaviorInsight {
    BehaviorInsight {
        summary: UserSummary {
            avg_daily_minutes: 0.0,
            avg_risk_score: 0.0,
            streak_days: 0,
            total_items: 0,
            trend: Trend::Stable,
        },
        early_warning: false,
        suggested_schedule: "No intervention needed".to_string(),
        insights: Vec::new(),
    }
}

/// Derive a read-only insight snapshot from a profile
fn analyze_profile(profile: &UserProfile) -> BehaviorInsight {
    let avg_score = mean_u32(&profile.risk_scores);
    let avg_minutes = if profile.daily_minutes.is_empty() {
        0.0
    } else {
        profile.daily_minutes.iter().map(|b| b.minutes).sum::<f64>()
            / profile.daily_minutes.len() as f64
    };

    let trend = detect_trend(&profile.risk_scores);

    let early_warning = avg_score > 60.0
        || avg_minutes > 60.0
        || profile.late_night_count > 3
        || trend == Trend::Increasing;

    BehaviorInsight {
        summary: UserSummary {
            avg_daily_minutes: round1(avg_minutes),
            avg_risk_score: round1(avg_score),
            streak_days: profile.daily_minutes.len(),
            total_items: profile.risk_scores.len(),
            trend,
        },
        early_warning,
        suggested_schedule: suggest_schedule(profile, early_warning, avg_score),
        insights: generate_insights(profile, avg_score, avg_minutes),
    }
}

/// Compare the mean of the most recent window against the mean of all
/// strictly older observations.
fn detect_trend(scores: &[u32]) -> Trend {
    if scores.len() < MIN_TREND_OBSERVATIONS {
        return Trend::Stable;
    }

    let window = if scores.len() >= 5 { 5 } else { 3 };
    let split = scores.len() - window;
    let (older, recent) = scores.split_at(split);

    if older.is_empty() {
        return Trend::Stable;
    }

    let recent_avg = mean_u32(recent);
    let older_avg = mean_u32(older);

    if recent_avg > older_avg * 1.25 {
        Trend::Increasing
    } else if recent_avg < older_avg * 0.75 {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn generate_insights(profile: &UserProfile, avg_score: f64, avg_minutes: f64) -> Vec<String> {
    let mut insights = Vec::new();

    if profile.late_night_count > 3 {
        insights.push("Late-night usage pattern detected (>3 sessions after 11 PM)".to_string());
    }

    if avg_score > 70.0 {
        insights.push(format!("Average risk score is high ({:.1}/100)", avg_score));
    }

    if avg_minutes > 60.0 {
        insights.push(format!(
            "Daily watch time exceeds 1 hour ({:.1} min)",
            avg_minutes
        ));
    }

    let addictive = category_count(profile, Category::Addictive);
    if addictive > 5 {
        insights.push(format!(
            "High consumption of addictive content ({} items)",
            addictive
        ));
    }

    if category_count(profile, Category::Educational) < 2 {
        insights.push("Low engagement with educational content".to_string());
    }

    if avg_score < 40.0 {
        insights.push("Maintaining healthy content consumption patterns".to_string());
    }

    if insights.is_empty() {
        insights.push("No concerning patterns detected".to_string());
    }
    insights
}

fn suggest_schedule(profile: &UserProfile, early_warning: bool, avg_score: f64) -> String {
    if !early_warning {
        return "Continue current monitoring. No additional interventions needed.".to_string();
    }

    let mut suggestions = Vec::new();

    if profile.late_night_count > 3 {
        suggestions
            .push("Increase intervention strength during evening hours (9 PM - 12 AM)".to_string());
    }

    if avg_score > 70.0 {
        suggestions.push("Apply blur interventions more aggressively".to_string());
    }

    if category_count(profile, Category::Addictive) > 5 {
        suggestions.push("Proactively suggest alternatives for short-form content".to_string());
    }

    if suggestions.is_empty() {
        "Monitor closely and adjust interventions as needed".to_string()
    } else {
        suggestions.join("; ")
    }
}

fn category_count(profile: &UserProfile, category: Category) -> u32 {
    profile.category_counts.get(&category).copied().unwrap_or(0)
}

fn mean_u32(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
