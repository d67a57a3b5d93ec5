//! Pipeline orchestration
//!
//! This module provides the public API of the Unhook engine. It runs the six
//! analysis stages in strict order for one content item:
//!
//! normalize → classify → score → track → recommend → render
//!
//! Each stage's output threads into the next; the coordinator owns no scoring
//! logic itself. A stage failure is reported as that stage's error while the
//! outputs already computed are preserved on the result (partial-result
//! semantics, not all-or-nothing).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Instant;
use uuid::Uuid;

use crate::classifier::Classifier;
use crate::error::EngineError;
use crate::normalizer::{ContentNormalizer, RawContentItem};
use crate::recommender::{RecommendationSelector, DEFAULT_MAX_ALTERNATIVES};
use crate::renderer::DecisionRenderer;
use crate::scorer::RiskScorer;
use crate::tracker::BehaviorTracker;
use crate::types::{
    Alternative, BehavioralContext, BehaviorInsight, Category, Classification, ContentContext,
    ContentItem, FeedbackRecord, InterventionDecision, Observation, RiskScore,
};

/// Pipeline stage names, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Normalize,
    Classify,
    Score,
    Track,
    Recommend,
    Render,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Normalize => "normalize",
            Stage::Classify => "classify",
            Stage::Score => "score",
            Stage::Track => "track",
            Stage::Recommend => "recommend",
            Stage::Render => "render",
        }
    }
}

/// Error attributed to a specific pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageError {
    pub stage: Stage,
    pub message: String,
}

impl StageError {
    pub fn into_error(self) -> EngineError {
        EngineError::StageFailure {
            stage: self.stage.as_str().to_string(),
            message: self.message,
        }
    }
}

/// One analyze request: the raw item plus its behavioral context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub item: RawContentItem,
    #[serde(default)]
    pub behavior: BehavioralContext,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_user_id() -> String {
    "default".to_string()
}

fn default_locale() -> String {
    "en-US".to_string()
}

impl AnalyzeRequest {
    pub fn new(item: RawContentItem, user_id: impl Into<String>) -> Self {
        Self {
            item,
            behavior: BehavioralContext::default(),
            user_id: user_id.into(),
            locale: default_locale(),
        }
    }
}

/// Aggregated result of one pipeline run.
///
/// Stage outputs are present when their stage ran; on failure, `error` names
/// the failing stage and everything computed before it survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub run_id: String,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ContentItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContentContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<BehaviorInsight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<Alternative>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<InterventionDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StageError>,
}

impl PipelineResult {
    fn started(run_id: String) -> Self {
        Self {
            run_id,
            elapsed_ms: 0,
            item: None,
            context: None,
            classification: None,
            risk: None,
            insight: None,
            alternatives: None,
            decision: None,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// The Unhook engine: all pipeline components behind one `Send + Sync` surface
pub struct Engine {
    classifier: Classifier,
    recommender: RecommendationSelector,
    tracker: BehaviorTracker,
    feedback: Mutex<Vec<FeedbackRecord>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with heuristic classification, offline recommendations, and an
    /// in-memory profile store
    pub fn new() -> Self {
        Self::with_components(
            Classifier::heuristic(),
            RecommendationSelector::offline(),
            BehaviorTracker::new(),
        )
    }

    /// Engine over explicitly constructed components (provider-backed
    /// classifier/selector, injected profile store)
    pub fn with_components(
        classifier: Classifier,
        recommender: RecommendationSelector,
        tracker: BehaviorTracker,
    ) -> Self {
        Self {
            classifier,
            recommender,
            tracker,
            feedback: Mutex::new(Vec::new()),
        }
    }

    pub fn tracker(&self) -> &BehaviorTracker {
        &self.tracker
    }

    /// Run the full pipeline for one content item.
    pub fn analyze(&self, request: &AnalyzeRequest) -> PipelineResult {
        let run_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        let mut result = PipelineResult::started(run_id.clone());

        tracing::info!(run_id = %run_id, user_id = %request.user_id, "pipeline start");

        // Stage 1: normalize
        let (item, context) = match ContentNormalizer::normalize(&request.item) {
            Ok(output) => output,
            Err(e) => {
                return self.fail(result, start, Stage::Normalize, e);
            }
        };
        result.item = Some(item.clone());
        result.context = Some(context.clone());

        // Stage 2: classify (total; provider errors degrade internally)
        let classification = self.classifier.classify(&item, &context);
        result.classification = Some(classification.clone());

        // Stage 3: score
        let risk = RiskScorer::score(&classification, &request.behavior);
        result.risk = Some(risk.clone());

        // Stage 4: track and analyze longitudinal patterns
        self.tracker.record(
            &request.user_id,
            Observation {
                observed_at: Utc::now(),
                risk_index: risk.index,
                category: classification.category,
                minutes: f64::from(item.duration_sec) / 60.0,
            },
        );
        result.insight = Some(self.tracker.analyze(&request.user_id));

        // Stage 5: recommend alternatives
        let alternatives = self.recommender.recommend(
            &item.title,
            classification.category,
            DEFAULT_MAX_ALTERNATIVES,
        );
        result.alternatives = Some(alternatives.clone());

        // Stage 6: render the intervention decision
        result.decision = Some(DecisionRenderer::render(
            risk.action,
            &alternatives,
            risk.index,
            &request.locale,
        ));

        result.elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            run_id = %run_id,
            index = risk.index,
            action = risk.action.as_str(),
            elapsed_ms = result.elapsed_ms,
            "pipeline complete"
        );
        result
    }

    fn fail(
        &self,
        mut result: PipelineResult,
        start: Instant,
        stage: Stage,
        error: EngineError,
    ) -> PipelineResult {
        result.elapsed_ms = start.elapsed().as_millis() as u64;
        result.error = Some(StageError {
            stage,
            message: error.to_string(),
        });
        tracing::warn!(
            run_id = %result.run_id,
            stage = stage.as_str(),
            error = %error,
            "pipeline stage failed"
        );
        result
    }

    /// Fetch alternative recommendations for a free-text query
    pub fn recommend(&self, query: &str, max_results: usize) -> Vec<Alternative> {
        self.recommender
            .recommend(query, Category::Neutral, max_results)
    }

    /// Per-user behavior statistics
    pub fn stats(&self, user_id: &str) -> BehaviorInsight {
        self.tracker.analyze(user_id)
    }

    /// Record user feedback on a delivered intervention
    pub fn submit_feedback(&self, record: FeedbackRecord) {
        tracing::info!(
            decision_id = %record.decision_id,
            kind = ?record.kind,
            "feedback received"
        );
        self.feedback
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }

    /// Number of feedback records received so far
    pub fn feedback_count(&self) -> usize {
        self.feedback.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Delete all state for a user; returns whether anything existed
    pub fn delete_user(&self, user_id: &str) -> bool {
        tracing::info!(user_id, "deleting user data");
        self.tracker.forget(user_id)
    }
}
