//! Unhook - deterministic addiction-risk scoring and intervention engine
//!
//! Unhook analyzes social-media content items through a fixed sequential
//! pipeline: normalization → classification → risk scoring → behavior
//! tracking → recommendation → decision rendering. Each item gets a bounded
//! 0-100 addiction index, a risk tier, and an intervention action
//! (none/nudge/blur/replace/lockout) with healthier alternatives attached.
//!
//! ## Modules
//!
//! - **Normalizer**: validate raw items, derive lexical/structural context
//! - **Classifier**: category + trigger labels (provider-backed or heuristic)
//! - **Scorer**: weighted composite risk index with tier/action thresholds
//! - **Tracker**: per-user longitudinal history and early-warning analysis
//! - **Recommender**: ranked alternative content with caching
//! - **Renderer**: presentation payloads for the client surface
//! - **Pipeline**: the engine tying the stages together

pub mod classifier;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod providers;
pub mod recommender;
pub mod renderer;
pub mod scorer;
pub mod tracker;
pub mod types;

pub use classifier::Classifier;
pub use error::{EngineError, ProviderError};
pub use normalizer::{ContentNormalizer, RawContentItem};
pub use pipeline::{AnalyzeRequest, Engine, PipelineResult, Stage, StageError};
pub use recommender::{RecommendationSelector, DEFAULT_MAX_ALTERNATIVES};
pub use renderer::DecisionRenderer;
pub use scorer::RiskScorer;
pub use tracker::{BehaviorTracker, InMemoryProfileStore, ProfileStore};

// Core data model exports
pub use types::{
    Alternative, BehavioralContext, BehaviorInsight, Category, Classification, ContentContext,
    ContentItem, InterventionAction, InterventionDecision, RiskScore, RiskTier, Trend, Trigger,
    UserProfile,
};

/// Engine version embedded in reports and CLI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports and CLI output
pub const PRODUCER_NAME: &str = "unhook";
