use crate::models::{MatchResult, UserId, UserProfile};
use crate::core::scoring::calculate_match;
use crate::services::{StoreError, UserStore};

/// Default number of matches returned
pub const DEFAULT_MATCH_LIMIT: usize = 10;
/// Upper bound on matches per request
pub const MAX_MATCH_LIMIT: usize = 100;

/// Main matching orchestrator
///
/// # Pipeline
/// 1. Gender preference gate
/// 2. Age scoring (preference bounds and zero score exclude)
/// 3. Interest similarity
/// 4. Distance scoring (skipped when distance carries no weight)
/// 5. Weighted aggregation, ranking and truncation
///
/// The matcher holds no per-call state; every call works on a snapshot
/// read from the store before scoring starts.
#[derive(Debug, Clone)]
pub struct Matcher {
    default_limit: usize,
    max_limit: usize,
}

impl Matcher {
    pub fn new(default_limit: usize, max_limit: usize) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    pub fn with_default_limits() -> Self {
        Self::new(DEFAULT_MATCH_LIMIT, MAX_MATCH_LIMIT)
    }

    /// Resolve a caller-supplied limit into [1, max_limit]
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }

    /// Rank candidates for a requester
    ///
    /// Results are ordered by compatibility score descending, ties broken by
    /// candidate id ascending, and truncated to `limit`. The requester is
    /// never matched with itself.
    pub fn rank(
        &self,
        requester: &UserProfile,
        candidates: &[UserProfile],
        limit: usize,
    ) -> Vec<MatchResult> {
        let mut matches: Vec<MatchResult> = candidates
            .iter()
            .filter(|candidate| candidate.id != requester.id)
            .filter_map(|candidate| calculate_match(requester, candidate))
            .collect();

        matches.sort_by(|a, b| {
            b.compatibility_score
                .total_cmp(&a.compatibility_score)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        matches.truncate(limit);
        matches
    }

    /// Find the best matches for a stored user
    ///
    /// Loads the requester and the rest of the population from `store`,
    /// then ranks them. An unknown requester yields an empty list.
    pub async fn find_matches<S>(
        &self,
        store: &S,
        requester_id: UserId,
        limit: usize,
    ) -> Result<Vec<MatchResult>, StoreError>
    where
        S: UserStore + ?Sized,
    {
        let Some(requester) = store.get_user(requester_id).await? else {
            tracing::debug!("Requester {} not found, returning no matches", requester_id);
            return Ok(Vec::new());
        };

        let candidates = store.list_other_users(requester_id).await?;
        tracing::debug!("Scoring {} candidates for user {}", candidates.len(), requester_id);

        let matches = self.rank(&requester, &candidates, limit);

        tracing::debug!(
            "Ranked {} matches for user {} (from {} candidates)",
            matches.len(),
            requester_id,
            candidates.len()
        );

        Ok(matches)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_limits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, ScoringWeights, DEFAULT_MAX_DISTANCE_KM};
    use crate::services::InMemoryStore;

    fn create_candidate(id: i64, age: u8, gender: &str, lon: f64, interests: &[&str]) -> UserProfile {
        UserProfile {
            id,
            name: format!("User {}", id),
            email: format!("user{}@example.com", id),
            age,
            gender: gender.to_string(),
            city: "Nairobi".to_string(),
            location: Some(GeoPoint::new(0.0, lon)),
            interests: interests.iter().map(|s| s.to_string()).collect(),
            min_age_pref: None,
            max_age_pref: None,
            gender_pref: None,
            max_distance_pref: DEFAULT_MAX_DISTANCE_KM,
            weights: ScoringWeights::default(),
        }
    }

    fn create_requester() -> UserProfile {
        let mut requester = create_candidate(1, 30, "M", 0.0, &["hiking", "music"]);
        requester.gender_pref = Some("F".to_string());
        requester.min_age_pref = Some(25);
        requester.max_age_pref = Some(35);
        requester
    }

    #[test]
    fn test_find_matches_basic() {
        let matcher = Matcher::with_default_limits();
        let requester = create_requester();

        let candidates = vec![
            create_candidate(2, 28, "F", 0.01, &["hiking"]), // Close match
            create_candidate(3, 40, "F", 0.01, &["hiking"]), // Too old
            create_candidate(4, 28, "M", 0.01, &["hiking"]), // Wrong gender
            create_candidate(5, 28, "F", 2.0, &["hiking"]),  // Too far
        ];

        let matches = matcher.rank(&requester, &candidates, 10);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user_id, 2);
    }

    #[test]
    fn test_matches_sorted_by_score() {
        let matcher = Matcher::with_default_limits();
        let requester = create_requester();

        let candidates = vec![
            create_candidate(2, 33, "F", 0.3, &[]),
            create_candidate(3, 30, "F", 0.01, &["hiking", "music"]),
            create_candidate(4, 29, "F", 0.1, &["music"]),
        ];

        let matches = matcher.rank(&requester, &candidates, 10);

        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].user_id, 3);
        for pair in matches.windows(2) {
            assert!(pair[0].compatibility_score >= pair[1].compatibility_score);
        }
    }

    #[test]
    fn test_ties_broken_by_id() {
        let matcher = Matcher::with_default_limits();
        let requester = create_requester();

        let candidates = vec![
            create_candidate(9, 30, "F", 0.01, &["hiking"]),
            create_candidate(4, 30, "F", 0.01, &["hiking"]),
            create_candidate(6, 30, "F", 0.01, &["hiking"]),
        ];

        let ids: Vec<_> = matcher
            .rank(&requester, &candidates, 10)
            .into_iter()
            .map(|m| m.user_id)
            .collect();

        assert_eq!(ids, vec![4, 6, 9]);
    }

    #[test]
    fn test_respects_limit() {
        let matcher = Matcher::with_default_limits();
        let requester = create_requester();

        let candidates: Vec<UserProfile> = (0..20)
            .map(|i| create_candidate(i + 2, 25 + (i % 10) as u8, "F", i as f64 * 0.001, &["music"]))
            .collect();

        assert_eq!(matcher.rank(&requester, &candidates, 5).len(), 5);
        assert!(matcher.rank(&requester, &candidates, 0).is_empty());
    }

    #[test]
    fn test_requester_excluded_from_own_matches() {
        let matcher = Matcher::with_default_limits();
        let mut requester = create_requester();
        requester.gender_pref = None;

        let candidates = vec![requester.clone()];
        assert!(matcher.rank(&requester, &candidates, 10).is_empty());
    }

    #[test]
    fn test_resolve_limit() {
        let matcher = Matcher::with_default_limits();
        assert_eq!(matcher.resolve_limit(None), 10);
        assert_eq!(matcher.resolve_limit(Some(0)), 1);
        assert_eq!(matcher.resolve_limit(Some(25)), 25);
        assert_eq!(matcher.resolve_limit(Some(1000)), 100);

        let tight = Matcher::new(50, 20);
        assert_eq!(tight.resolve_limit(None), 20);
    }

    #[tokio::test]
    async fn test_find_matches_missing_requester() {
        let matcher = Matcher::with_default_limits();
        let store = InMemoryStore::new();

        let matches = matcher.find_matches(&store, 404, 10).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_find_matches_reads_from_store() {
        let matcher = Matcher::with_default_limits();
        let requester = create_requester();
        let store = InMemoryStore::with_profiles(vec![
            requester.clone(),
            create_candidate(2, 28, "F", 0.01, &["hiking"]),
            create_candidate(3, 28, "M", 0.01, &["hiking"]),
        ]);

        let matches = matcher.find_matches(&store, requester.id, 10).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user_id, 2);
        assert_eq!(matches[0].common_interests, vec!["hiking"]);
    }
}
