//! Risk scoring
//!
//! This module computes the bounded 0-100 addiction index from a
//! classification and behavioral context, then derives the risk tier and the
//! recommended intervention action from fixed thresholds. A pure, total
//! function: malformed input defaults safely, nothing here can fail.
//!
//! Tier thresholds (31/61/81) and action thresholds (30/61/81/91) are two
//! intentionally independent scales. An index of 85 is "critical" tier but
//! "replace" action, not "lockout".

use crate::types::{
    BehavioralContext, Category, Classification, InterventionAction, RiskScore, RiskTier,
    ScoreBreakdown, Trigger,
};

/// Default weight for trigger labels outside the fixed vocabulary
const DEFAULT_TRIGGER_WEIGHT: u32 = 5;

/// Scorer combining category, trigger, and behavioral signals
pub struct RiskScorer;

impl RiskScorer {
    /// Compute a fresh RiskScore for one item
    pub fn score(classification: &Classification, context: &BehavioralContext) -> RiskScore {
        let base_score = category_base_score(classification.category);
        let trigger_score: u32 = classification
            .triggers
            .iter()
            .map(|t| trigger_weight(t))
            .sum();
        let behavioral_score = behavioral_score(context);

        let index = (base_score + trigger_score + behavioral_score).min(100);

        RiskScore {
            index,
            tier: risk_tier(index),
            action: recommended_action(index),
            major_factors: major_factors(classification, context, behavioral_score),
            breakdown: ScoreBreakdown {
                base_score,
                trigger_score,
                behavioral_score,
            },
        }
    }
}

/// Fixed per-category base scores
fn category_base_score(category: Category) -> u32 {
    match category {
        Category::Harmful => 90,
        Category::Addictive => 70,
        Category::Entertainment => 40,
        Category::Neutral => 20,
        Category::Productive => 10,
        Category::Educational => 5,
    }
}

/// Fixed per-trigger weights, one term per occurrence
fn trigger_weight(trigger: &Trigger) -> u32 {
    match trigger {
        Trigger::ShortDuration => 10,
        Trigger::Compilation => 10,
        Trigger::Humor => 5,
        Trigger::Shock => 8,
        Trigger::Fomo => 12,
        Trigger::Clickbait => 7,
        Trigger::Repetition => 15,
        Trigger::Other(_) => DEFAULT_TRIGGER_WEIGHT,
    }
}

/// Score contribution from behavioral signals, clamped to >= 0 after the
/// explicit-search discount.
fn behavioral_score(context: &BehavioralContext) -> u32 {
    let mut score: i32 = 0;

    // Session duration tiers are mutually exclusive; highest match wins
    score += match context.session_minutes {
        m if m > 60 => 20,
        m if m > 30 => 15,
        m if m > 15 => 10,
        m if m > 5 => 5,
        _ => 0,
    };

    score += match context.repeat_count {
        r if r > 5 => 20,
        r if r > 2 => 15,
        r if r > 0 => 10,
        _ => 0,
    };

    if context.is_late_night() {
        score += 10;
    }

    if context.user_searched {
        score -= 5;
    }

    score.max(0) as u32
}

fn risk_tier(index: u32) -> RiskTier {
    match index {
        0..=30 => RiskTier::Low,
        31..=60 => RiskTier::Moderate,
        61..=80 => RiskTier::High,
        _ => RiskTier::Critical,
    }
}

fn recommended_action(index: u32) -> InterventionAction {
    match index {
        i if i >= 91 => InterventionAction::Lockout,
        i if i >= 81 => InterventionAction::Replace,
        i if i >= 61 => InterventionAction::Blur,
        i if i >= 30 => InterventionAction::Nudge,
        _ => InterventionAction::None,
    }
}

/// Human-readable factors that drove the score
fn major_factors(
    classification: &Classification,
    context: &BehavioralContext,
    behavioral_score: u32,
) -> Vec<String> {
    let mut factors = Vec::new();

    if matches!(
        classification.category,
        Category::Addictive | Category::Harmful
    ) {
        factors.push(format!(
            "Content category: {}",
            classification.category.as_str()
        ));
    }

    let high_weight: Vec<&str> = classification
        .triggers
        .iter()
        .filter(|t| trigger_weight(t) >= 10)
        .map(|t| t.as_str())
        .collect();
    if !high_weight.is_empty() {
        factors.push(format!("High-risk triggers: {}", high_weight.join(", ")));
    }

    if behavioral_score >= 15 {
        if context.session_minutes > 30 {
            factors.push("Extended session duration".to_string());
        }
        if context.repeat_count > 2 {
            factors.push("Repeated viewing pattern".to_string());
        }
        if context.is_late_night() {
            factors.push("Late-night usage".to_string());
        }
    }

    if factors.is_empty() {
        factors.push("Low-risk content".to_string());
    }
    factors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ThumbnailSentiment;
    use pretty_assertions::assert_eq;

    fn classification(category: Category, triggers: Vec<Trigger>) -> Classification {
        Classification {
            category,
            reason: "test".to_string(),
            triggers,
            thumbnail_sentiment: ThumbnailSentiment::Neutral,
            confidence: 0.8,
        }
    }

    #[test]
    fn test_addictive_short_compilation_scenario() {
        let classification = classification(
            Category::Addictive,
            vec![Trigger::ShortDuration, Trigger::Compilation, Trigger::Humor],
        );
        let context = BehavioralContext {
            session_minutes: 35,
            repeat_count: 3,
            time_of_day: "23:45".to_string(),
            user_searched: false,
        };

        let score = RiskScorer::score(&classification, &context);

        assert_eq!(score.breakdown.base_score, 70);
        assert_eq!(score.breakdown.trigger_score, 25);
        assert_eq!(score.breakdown.behavioral_score, 40);
        assert_eq!(score.index, 100);
        assert_eq!(score.tier, RiskTier::Critical);
        assert_eq!(score.action, InterventionAction::Lockout);
    }

    #[test]
    fn test_educational_long_tutorial_scenario() {
        let classification = classification(Category::Educational, vec![]);
        let context = BehavioralContext::default();

        let score = RiskScorer::score(&classification, &context);

        assert_eq!(score.index, 5);
        assert_eq!(score.tier, RiskTier::Low);
        assert_eq!(score.action, InterventionAction::None);
        assert_eq!(score.major_factors, vec!["Low-risk content".to_string()]);
    }

    #[test]
    fn test_index_clamped_at_100() {
        let classification = classification(
            Category::Harmful,
            vec![
                Trigger::ShortDuration,
                Trigger::Compilation,
                Trigger::Repetition,
                Trigger::Fomo,
                Trigger::Shock,
            ],
        );
        let context = BehavioralContext {
            session_minutes: 120,
            repeat_count: 10,
            time_of_day: "02:00".to_string(),
            user_searched: false,
        };

        let score = RiskScorer::score(&classification, &context);
        assert_eq!(score.index, 100);
    }

    #[test]
    fn test_behavioral_floor_is_zero() {
        // Explicit search discount cannot drive the behavioral sum negative
        let context = BehavioralContext {
            session_minutes: 0,
            repeat_count: 0,
            time_of_day: "12:00".to_string(),
            user_searched: true,
        };
        assert_eq!(behavioral_score(&context), 0);

        // Discount applies before clamping when there is something to discount
        let context = BehavioralContext {
            session_minutes: 10,
            user_searched: true,
            ..Default::default()
        };
        assert_eq!(behavioral_score(&context), 0);
    }

    #[test]
    fn test_session_tiers_mutually_exclusive() {
        let cases = [(0, 0), (5, 0), (6, 5), (16, 10), (31, 15), (61, 20)];
        for (minutes, expected) in cases {
            let context = BehavioralContext {
                session_minutes: minutes,
                ..Default::default()
            };
            assert_eq!(behavioral_score(&context), expected, "minutes {}", minutes);
        }
    }

    #[test]
    fn test_tier_boundaries() {
        let cases = [
            (0, RiskTier::Low),
            (30, RiskTier::Low),
            (31, RiskTier::Moderate),
            (60, RiskTier::Moderate),
            (61, RiskTier::High),
            (80, RiskTier::High),
            (81, RiskTier::Critical),
            (100, RiskTier::Critical),
        ];
        for (index, expected) in cases {
            assert_eq!(risk_tier(index), expected, "index {}", index);
        }
    }

    #[test]
    fn test_action_boundaries_independent_of_tiers() {
        let cases = [
            (29, InterventionAction::None),
            (30, InterventionAction::Nudge),
            (60, InterventionAction::Nudge),
            (61, InterventionAction::Blur),
            (80, InterventionAction::Blur),
            (81, InterventionAction::Replace),
            (90, InterventionAction::Replace),
            (91, InterventionAction::Lockout),
            (100, InterventionAction::Lockout),
        ];
        for (index, expected) in cases {
            assert_eq!(recommended_action(index), expected, "index {}", index);
        }

        // 85 is critical tier but replace action; the scales do not collapse
        assert_eq!(risk_tier(85), RiskTier::Critical);
        assert_eq!(recommended_action(85), InterventionAction::Replace);
    }

    #[test]
    fn test_action_monotonic_in_index() {
        let mut last = recommended_action(0);
        for index in 1..=100 {
            let action = recommended_action(index);
            assert!(action >= last, "action regressed at index {}", index);
            last = action;
        }
    }

    #[test]
    fn test_unknown_trigger_default_weight() {
        let classification = classification(
            Category::Neutral,
            vec![Trigger::Other("doom_scroll".to_string())],
        );
        let score = RiskScorer::score(&classification, &BehavioralContext::default());
        assert_eq!(score.breakdown.trigger_score, 5);
        assert_eq!(score.index, 25);
    }

    #[test]
    fn test_duplicate_triggers_count_per_occurrence() {
        let classification = classification(
            Category::Neutral,
            vec![Trigger::Humor, Trigger::Humor],
        );
        let score = RiskScorer::score(&classification, &BehavioralContext::default());
        assert_eq!(score.breakdown.trigger_score, 10);
    }

    #[test]
    fn test_major_factors_composition() {
        let classification = classification(
            Category::Addictive,
            vec![Trigger::ShortDuration, Trigger::Humor],
        );
        let context = BehavioralContext {
            session_minutes: 45,
            repeat_count: 4,
            time_of_day: "23:30".to_string(),
            user_searched: false,
        };

        let score = RiskScorer::score(&classification, &context);

        assert_eq!(
            score.major_factors,
            vec![
                "Content category: addictive".to_string(),
                "High-risk triggers: short_duration".to_string(),
                "Extended session duration".to_string(),
                "Repeated viewing pattern".to_string(),
                "Late-night usage".to_string(),
            ]
        );
    }

    #[test]
    fn test_behavioral_descriptors_gated_on_subscore() {
        // Session of 10 min alone gives behavioral score 5, below the gate
        let classification = classification(Category::Addictive, vec![]);
        let context = BehavioralContext {
            session_minutes: 10,
            ..Default::default()
        };
        let score = RiskScorer::score(&classification, &context);
        assert_eq!(
            score.major_factors,
            vec!["Content category: addictive".to_string()]
        );
    }
}
