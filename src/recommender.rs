//! Alternative-content recommendation
//!
//! This module produces a fixed-size ranked list of healthier alternatives
//! for a content item. Search queries come from an optional query-generation
//! provider (fixed default triple otherwise); each query goes to an optional
//! search provider, degrading to a deterministic built-in generator keyed by
//! query substring. Results are cached by (title, category).
//!
//! The list length is max(3, max_results): three alternatives is a hard
//! floor, even when no query yields a real provider hit.

use dashmap::DashMap;

use crate::providers::{QueryGenerator, SearchHit, SearchProvider};
use crate::types::{Alternative, AlternativeKind, Category};

/// Default (and minimum) number of alternatives returned
pub const DEFAULT_MAX_ALTERNATIVES: usize = 3;

/// Fallback search queries used when no query generator is available
const DEFAULT_QUERIES: &[&str] = &[
    "python programming tutorial for beginners",
    "productivity tips for students",
    "5 minute meditation for focus",
];

enum SearchStrategy {
    Provider(Box<dyn SearchProvider>),
    Offline,
}

enum QueryStrategy {
    Provider(Box<dyn QueryGenerator>),
    Fixed,
}

/// Selector for ranked alternative content
pub struct RecommendationSelector {
    search: SearchStrategy,
    queries: QueryStrategy,
    cache: DashMap<(String, Category), Vec<Alternative>>,
}

impl Default for RecommendationSelector {
    fn default() -> Self {
        Self::offline()
    }
}

impl RecommendationSelector {
    /// Fully offline selector: fixed queries, deterministic alternatives
    pub fn offline() -> Self {
        Self {
            search: SearchStrategy::Offline,
            queries: QueryStrategy::Fixed,
            cache: DashMap::new(),
        }
    }

    /// Use an external search provider for candidate lookup
    pub fn with_search_provider(mut self, provider: Box<dyn SearchProvider>) -> Self {
        self.search = SearchStrategy::Provider(provider);
        self
    }

    /// Use an external query generator instead of the fixed default queries
    pub fn with_query_generator(mut self, generator: Box<dyn QueryGenerator>) -> Self {
        self.queries = QueryStrategy::Provider(generator);
        self
    }

    /// Produce exactly max(3, max_results) alternatives for an item.
    ///
    /// Provider failures are invisible to the caller beyond reduced result
    /// diversity; this function is total.
    pub fn recommend(&self, title: &str, category: Category, max_results: usize) -> Vec<Alternative> {
        let target = max_results.max(DEFAULT_MAX_ALTERNATIVES);
        let cache_key = (title.to_string(), category);

        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!(title, "recommendation cache hit");
            return cached.value().clone();
        }

        let queries = self.generate_queries(title, category);

        let mut alternatives: Vec<Alternative> = queries
            .iter()
            .take(target)
            .map(|query| self.lookup(query))
            .collect();

        // Hard floor: pad with generated fallback entries
        while alternatives.len() < target {
            let query = format!("productive content {}", alternatives.len() + 1);
            alternatives.push(generated_alternative(&query));
        }
        alternatives.truncate(target);

        // Entries are derived deterministically from the key, so a concurrent
        // insert for the same key is idempotent (last write wins).
        self.cache.insert(cache_key, alternatives.clone());
        alternatives
    }

    fn generate_queries(&self, title: &str, category: Category) -> Vec<String> {
        match &self.queries {
            QueryStrategy::Provider(generator) => match generator.queries(title, category) {
                Ok(queries) if !queries.is_empty() => queries,
                Ok(_) => default_queries(),
                Err(e) => {
                    tracing::warn!(error = %e, "query generator degraded, using default queries");
                    default_queries()
                }
            },
            QueryStrategy::Fixed => default_queries(),
        }
    }

    fn lookup(&self, query: &str) -> Alternative {
        if let SearchStrategy::Provider(provider) = &self.search {
            match provider.search(query, 1) {
                Ok(hits) => {
                    if let Some(hit) = hits.into_iter().next() {
                        return from_search_hit(hit, query);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, query, "search provider degraded, using built-in alternative");
                }
            }
        }
        generated_alternative(query)
    }
}

fn default_queries() -> Vec<String> {
    DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect()
}

fn from_search_hit(hit: SearchHit, query: &str) -> Alternative {
    Alternative {
        title: hit.title,
        url: hit.url,
        reason: format!("Productive alternative matching: {}", query),
        search_query: query.to_string(),
        kind: AlternativeKind::Video,
        estimated_duration_sec: hit.duration_sec.unwrap_or(600),
    }
}

/// Deterministic built-in alternative generator keyed by query substring
fn generated_alternative(query: &str) -> Alternative {
    let lower = query.to_lowercase();

    let (title, url_slug, reason, kind, duration) = if lower.contains("study") || lower.contains("pomodoro") {
        (
            "Study With Me - 30 min Pomodoro Focus Session",
            "demo_study",
            "Structured study time with proven productivity technique",
            AlternativeKind::Video,
            1800,
        )
    } else if lower.contains("meditation") || lower.contains("mindful") {
        (
            "5-Minute Meditation Break for Focus",
            "demo_meditation",
            "Quick mental reset to improve concentration",
            AlternativeKind::GuidedExercise,
            300,
        )
    } else if lower.contains("tutorial") || lower.contains("learn") {
        (
            "Python Basics - 10 Minute Tutorial",
            "demo_python",
            "Learn a valuable skill in short time",
            AlternativeKind::Video,
            600,
        )
    } else if lower.contains("exercise") || lower.contains("workout") {
        (
            "Quick Desk Exercises - 5 Minutes",
            "demo_exercise",
            "Physical activity to boost energy and focus",
            AlternativeKind::GuidedExercise,
            300,
        )
    } else if lower.contains("productivity") {
        (
            "3 Productivity Hacks That Actually Work",
            "demo_productivity",
            "Practical tips to improve daily efficiency",
            AlternativeKind::Video,
            480,
        )
    } else {
        return Alternative {
            title: format!("Productive Content: {}", query),
            url: format!("https://youtube.com/search?q={}", query.replace(' ', "+")),
            reason: "Healthy alternative to addictive content".to_string(),
            search_query: query.to_string(),
            kind: AlternativeKind::Video,
            estimated_duration_sec: 600,
        };
    };

    Alternative {
        title: title.to_string(),
        url: format!("https://youtube.com/watch?v={}", url_slug),
        reason: reason.to_string(),
        search_query: query.to_string(),
        kind,
        estimated_duration_sec: duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_offline_returns_exactly_three() {
        let selector = RecommendationSelector::offline();
        let alternatives = selector.recommend("Funny Memes Compilation", Category::Addictive, 3);

        assert_eq!(alternatives.len(), 3);
        // Default queries map to tutorial / productivity / meditation entries
        assert_eq!(alternatives[0].title, "Python Basics - 10 Minute Tutorial");
        assert_eq!(alternatives[1].title, "3 Productivity Hacks That Actually Work");
        assert_eq!(alternatives[2].title, "5-Minute Meditation Break for Focus");
    }

    #[test]
    fn test_hard_floor_of_three() {
        let selector = RecommendationSelector::offline();
        let alternatives = selector.recommend("clip", Category::Neutral, 1);
        assert_eq!(alternatives.len(), 3);

        let alternatives = selector.recommend("clip2", Category::Neutral, 0);
        assert_eq!(alternatives.len(), 3);
    }

    #[test]
    fn test_requested_above_three_is_padded() {
        let selector = RecommendationSelector::offline();
        let alternatives = selector.recommend("clip", Category::Neutral, 5);

        assert_eq!(alternatives.len(), 5);
        // Only three default queries exist; the rest are generated padding
        assert_eq!(alternatives[3].search_query, "productive content 4");
        assert_eq!(alternatives[4].search_query, "productive content 5");
    }

    #[test]
    fn test_cache_hit_returns_identical_list() {
        let selector = RecommendationSelector::offline();
        let first = selector.recommend("Memes", Category::Addictive, 3);
        let second = selector.recommend("Memes", Category::Addictive, 3);
        assert_eq!(first, second);

        // Different category is a different key
        let third = selector.recommend("Memes", Category::Neutral, 3);
        assert_eq!(first, third); // same offline content, but independently cached
    }

    struct CountingSearch(Arc<AtomicUsize>);

    impl SearchProvider for CountingSearch {
        fn search(&self, query: &str, _max_results: usize) -> Result<Vec<SearchHit>, ProviderError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![SearchHit {
                title: format!("Provider hit for {}", query),
                url: "https://youtube.com/watch?v=real".to_string(),
                duration_sec: Some(420),
                ..Default::default()
            }])
        }
    }

    #[test]
    fn test_provider_hits_are_used_and_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let selector = RecommendationSelector::offline()
            .with_search_provider(Box::new(CountingSearch(Arc::clone(&calls))));

        let alternatives = selector.recommend("Memes", Category::Addictive, 3);
        assert_eq!(alternatives.len(), 3);
        assert!(alternatives[0].title.starts_with("Provider hit for"));
        assert_eq!(alternatives[0].estimated_duration_sec, 420);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        // Second call served from cache, no provider traffic
        selector.recommend("Memes", Category::Addictive, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    struct BrokenSearch;

    impl SearchProvider for BrokenSearch {
        fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>, ProviderError> {
            Err(ProviderError("connection refused".to_string()))
        }
    }

    #[test]
    fn test_search_failure_degrades_silently() {
        let selector =
            RecommendationSelector::offline().with_search_provider(Box::new(BrokenSearch));
        let alternatives = selector.recommend("Memes", Category::Addictive, 3);

        assert_eq!(alternatives.len(), 3);
        assert_eq!(alternatives[0].title, "Python Basics - 10 Minute Tutorial");
    }

    struct TopicQueries;

    impl QueryGenerator for TopicQueries {
        fn queries(&self, _title: &str, _category: Category) -> Result<Vec<String>, ProviderError> {
            Ok(vec![
                "study with me session".to_string(),
                "desk exercise break".to_string(),
            ])
        }
    }

    #[test]
    fn test_query_generator_drives_lookup() {
        let selector =
            RecommendationSelector::offline().with_query_generator(Box::new(TopicQueries));
        let alternatives = selector.recommend("Memes", Category::Addictive, 3);

        assert_eq!(alternatives.len(), 3);
        assert_eq!(alternatives[0].title, "Study With Me - 30 min Pomodoro Focus Session");
        assert_eq!(alternatives[1].title, "Quick Desk Exercises - 5 Minutes");
        // Two generated queries, one padding entry
        assert_eq!(alternatives[2].search_query, "productive content 3");
    }

    #[test]
    fn test_generated_alternative_substring_table() {
        assert_eq!(
            generated_alternative("5 minute meditation for focus").kind,
            AlternativeKind::GuidedExercise
        );
        let generic = generated_alternative("birdwatching basics");
        assert_eq!(generic.title, "Productive Content: birdwatching basics");
        assert_eq!(generic.url, "https://youtube.com/search?q=birdwatching+basics");
    }
}
