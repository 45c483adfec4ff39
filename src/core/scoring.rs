use std::collections::BTreeSet;
use crate::models::{GeoPoint, MatchResult, ScoringWeights, UserProfile};
use crate::core::{distance::distance_between, filters::matches_gender_preference};

/// Age difference at which the age score reaches zero
pub const AGE_DECAY_YEARS: f64 = 20.0;

/// Outcome of age scoring
///
/// A preference-bound rejection and a difference that decayed to zero are
/// kept apart so callers can tell them apart; the match pipeline excludes
/// both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgeScore {
    /// Candidate age lies outside the requester's min/max preference
    GateFailed,
    Scored(f64),
}

impl AgeScore {
    pub fn value(&self) -> f64 {
        match self {
            AgeScore::GateFailed => 0.0,
            AgeScore::Scored(score) => *score,
        }
    }

    #[inline]
    pub fn excludes(&self) -> bool {
        self.value() <= 0.0
    }
}

/// Calculate age compatibility (0-1)
///
/// Linear decay over the absolute age difference: 0 years scores 1.0,
/// 20 or more years scores 0.0. Bounds are inclusive.
#[inline]
pub fn calculate_age_score(
    requester_age: u8,
    candidate_age: u8,
    min_age_pref: Option<u8>,
    max_age_pref: Option<u8>,
) -> AgeScore {
    if min_age_pref.is_some_and(|min| candidate_age < min) {
        return AgeScore::GateFailed;
    }
    if max_age_pref.is_some_and(|max| candidate_age > max) {
        return AgeScore::GateFailed;
    }

    let diff = f64::from(requester_age.abs_diff(candidate_age));
    if diff >= AGE_DECAY_YEARS {
        return AgeScore::Scored(0.0);
    }

    AgeScore::Scored(1.0 - diff / AGE_DECAY_YEARS)
}

/// Interest overlap between two users
#[derive(Debug, Clone, PartialEq)]
pub struct InterestSimilarity {
    /// Jaccard similarity in [0, 1]
    pub score: f64,
    /// Shared interest names, sorted
    pub common: Vec<String>,
}

/// Calculate interest similarity using the Jaccard index
///
/// Either side being empty scores 0.0 with nothing in common, so two users
/// without declared interests are not rewarded.
pub fn calculate_interest_similarity(
    ours: &BTreeSet<String>,
    theirs: &BTreeSet<String>,
) -> InterestSimilarity {
    if ours.is_empty() || theirs.is_empty() {
        return InterestSimilarity { score: 0.0, common: Vec::new() };
    }

    let common: Vec<String> = ours.intersection(theirs).cloned().collect();
    let union = ours.len() + theirs.len() - common.len();

    InterestSimilarity {
        score: common.len() as f64 / union as f64,
        common,
    }
}

/// Outcome of distance scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceScore {
    /// Requester gave distance no weight; neutral score, distance reported as 0
    Indifferent,
    /// A coordinate pair is missing
    Unknown,
    /// Farther than the requester's maximum
    OutOfRange { distance_km: f64 },
    Within { distance_km: f64, score: f64 },
}

impl DistanceScore {
    pub fn value(&self) -> f64 {
        match self {
            DistanceScore::Indifferent => 1.0,
            DistanceScore::Unknown | DistanceScore::OutOfRange { .. } => 0.0,
            DistanceScore::Within { score, .. } => *score,
        }
    }

    pub fn distance_km(&self) -> Option<f64> {
        match self {
            DistanceScore::Indifferent => Some(0.0),
            DistanceScore::Unknown => None,
            DistanceScore::OutOfRange { distance_km } | DistanceScore::Within { distance_km, .. } => {
                Some(*distance_km)
            }
        }
    }

    #[inline]
    pub fn excludes(&self) -> bool {
        self.value() <= 0.0
    }
}

/// Calculate distance compatibility (0-1)
///
/// Closer is better: 1.0 at distance 0, falling linearly to 0.0 at
/// `max_distance_km`. A zero `distance_weight` bypasses the computation.
pub fn calculate_distance_score(
    requester: Option<GeoPoint>,
    candidate: Option<GeoPoint>,
    max_distance_km: u32,
    distance_weight: f64,
) -> DistanceScore {
    if distance_weight == 0.0 {
        return DistanceScore::Indifferent;
    }

    let Some(distance_km) = distance_between(requester, candidate) else {
        return DistanceScore::Unknown;
    };

    let max = f64::from(max_distance_km);
    if distance_km > max {
        return DistanceScore::OutOfRange { distance_km };
    }

    // max == 0 admits only distance 0, which still scores nothing
    let score = if max > 0.0 { 1.0 - distance_km / max } else { 0.0 };

    DistanceScore::Within { distance_km, score }
}

/// Per-factor scores for one candidate pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorScores {
    pub interest: f64,
    pub age: f64,
    pub distance: f64,
}

/// Weighted sum of the factor scores
///
/// Bounded by `weights.total()`, not by 1.0.
#[inline]
pub fn compatibility_score(weights: &ScoringWeights, factors: &FactorScores) -> f64 {
    weights.interest * factors.interest
        + weights.age * factors.age
        + weights.distance * factors.distance
}

/// Score one candidate for a requester
///
/// Gates run cheapest first: gender, then age, then distance. Returns
/// `None` when any gate excludes the candidate.
pub fn calculate_match(requester: &UserProfile, candidate: &UserProfile) -> Option<MatchResult> {
    if !matches_gender_preference(&candidate.gender, requester.gender_pref.as_deref()) {
        tracing::trace!(candidate = candidate.id, "excluded by gender preference");
        return None;
    }

    let age = calculate_age_score(
        requester.age,
        candidate.age,
        requester.min_age_pref,
        requester.max_age_pref,
    );
    if age.excludes() {
        tracing::trace!(candidate = candidate.id, ?age, "excluded by age");
        return None;
    }

    let interests = calculate_interest_similarity(&requester.interests, &candidate.interests);

    let distance = calculate_distance_score(
        requester.location,
        candidate.location,
        requester.max_distance_pref,
        requester.weights.distance,
    );
    if distance.excludes() {
        tracing::trace!(candidate = candidate.id, ?distance, "excluded by distance");
        return None;
    }

    let factors = FactorScores {
        interest: interests.score,
        age: age.value(),
        distance: distance.value(),
    };

    Some(MatchResult {
        user_id: candidate.id,
        name: candidate.name.clone(),
        age: candidate.age,
        gender: candidate.gender.clone(),
        city: candidate.city.clone(),
        distance_km: distance.distance_km(),
        common_interests: interests.common,
        compatibility_score: compatibility_score(&requester.weights, &factors),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_MAX_DISTANCE_KM;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_profile(id: i64, age: u8, gender: &str, location: Option<GeoPoint>) -> UserProfile {
        UserProfile {
            id,
            name: format!("User {}", id),
            email: format!("user{}@example.com", id),
            age,
            gender: gender.to_string(),
            city: "Lagos".to_string(),
            location,
            interests: set(&["hiking", "music"]),
            min_age_pref: None,
            max_age_pref: None,
            gender_pref: None,
            max_distance_pref: DEFAULT_MAX_DISTANCE_KM,
            weights: ScoringWeights::default(),
        }
    }

    #[test]
    fn test_age_score_identical_ages() {
        for age in [0, 18, 30, 99, 255] {
            assert_eq!(calculate_age_score(age, age, None, None), AgeScore::Scored(1.0));
        }
    }

    #[test]
    fn test_age_score_linear_decay() {
        assert_eq!(calculate_age_score(30, 28, None, None).value(), 0.9);
        assert_eq!(calculate_age_score(30, 40, None, None).value(), 0.5);
        assert_eq!(calculate_age_score(30, 50, None, None), AgeScore::Scored(0.0));
        assert_eq!(calculate_age_score(50, 20, None, None), AgeScore::Scored(0.0));
    }

    #[test]
    fn test_age_score_monotonic() {
        let mut previous = f64::INFINITY;
        for other in 30..=60 {
            let score = calculate_age_score(30, other, None, None).value();
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn test_age_preference_gate() {
        assert_eq!(calculate_age_score(30, 24, Some(25), Some(35)), AgeScore::GateFailed);
        assert_eq!(calculate_age_score(30, 36, Some(25), Some(35)), AgeScore::GateFailed);
        // Bounds are inclusive
        assert_eq!(calculate_age_score(30, 25, Some(25), Some(35)).value(), 0.75);
        assert_eq!(calculate_age_score(30, 35, Some(25), Some(35)).value(), 0.75);
        assert!(AgeScore::GateFailed.excludes());
        assert!(AgeScore::Scored(0.0).excludes());
        assert!(!AgeScore::Scored(0.05).excludes());
    }

    #[test]
    fn test_interest_similarity() {
        let result = calculate_interest_similarity(&set(&["hiking", "music"]), &set(&["hiking", "reading"]));
        assert!((result.score - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.common, vec!["hiking"]);
    }

    #[test]
    fn test_interest_similarity_identical_and_empty() {
        let s = set(&["a", "b", "c"]);
        assert_eq!(calculate_interest_similarity(&s, &s).score, 1.0);

        let empty = BTreeSet::new();
        let result = calculate_interest_similarity(&empty, &s);
        assert_eq!(result.score, 0.0);
        assert!(result.common.is_empty());
        assert_eq!(calculate_interest_similarity(&empty, &empty).score, 0.0);
    }

    #[test]
    fn test_interest_similarity_symmetric_and_case_sensitive() {
        let a = set(&["Music", "chess", "yoga"]);
        let b = set(&["music", "chess"]);
        let ab = calculate_interest_similarity(&a, &b);
        let ba = calculate_interest_similarity(&b, &a);

        assert_eq!(ab.score, ba.score);
        assert_eq!(ab.common, vec!["chess"]);
        assert_eq!(ab.score, 0.25);
    }

    #[test]
    fn test_common_interests_sorted() {
        let result = calculate_interest_similarity(&set(&["zumba", "art", "music"]), &set(&["music", "zumba", "art"]));
        assert_eq!(result.common, vec!["art", "music", "zumba"]);
    }

    #[test]
    fn test_distance_score_bounds() {
        let origin = Some(GeoPoint::new(0.0, 0.0));

        let same = calculate_distance_score(origin, origin, 50, 0.3);
        assert_eq!(same.value(), 1.0);
        assert_eq!(same.distance_km(), Some(0.0));

        // ~25km east on the equator
        let half = calculate_distance_score(origin, Some(GeoPoint::new(0.0, 0.2248)), 50, 0.3);
        assert!((half.value() - 0.5).abs() < 0.01, "got {:?}", half);
        assert!(!half.excludes());
    }

    #[test]
    fn test_distance_score_at_and_past_boundary() {
        let origin = GeoPoint::new(0.0, 0.0);
        let east = GeoPoint::new(0.0, 0.45);
        let exact = crate::core::distance::haversine_distance(0.0, 0.0, 0.0, 0.45);

        let at_boundary = calculate_distance_score(Some(origin), Some(east), exact.ceil() as u32, 0.3);
        assert!(at_boundary.value() < 0.02, "got {:?}", at_boundary);

        let past = calculate_distance_score(Some(origin), Some(east), 50, 0.3);
        assert!(matches!(past, DistanceScore::OutOfRange { .. }));
        assert_eq!(past.value(), 0.0);
        assert!(past.excludes());
        assert!(past.distance_km().unwrap() > 50.0);
    }

    #[test]
    fn test_distance_score_missing_coordinates() {
        let origin = Some(GeoPoint::new(0.0, 0.0));

        let unknown = calculate_distance_score(origin, None, 50, 0.3);
        assert_eq!(unknown, DistanceScore::Unknown);
        assert_eq!(unknown.value(), 0.0);
        assert_eq!(unknown.distance_km(), None);
        assert!(unknown.excludes());
    }

    #[test]
    fn test_distance_score_indifferent() {
        let result = calculate_distance_score(None, None, 50, 0.0);
        assert_eq!(result.value(), 1.0);
        assert_eq!(result.distance_km(), Some(0.0));

        let far = calculate_distance_score(Some(GeoPoint::new(0.0, 0.0)), Some(GeoPoint::new(45.0, 90.0)), 1, 0.0);
        assert_eq!(far, DistanceScore::Indifferent);
    }

    #[test]
    fn test_zero_max_distance_admits_nothing() {
        let origin = Some(GeoPoint::new(10.0, 10.0));
        let result = calculate_distance_score(origin, origin, 0, 0.3);
        assert_eq!(result.value(), 0.0);
        assert!(result.excludes());
    }

    #[test]
    fn test_compatibility_score_worked_example() {
        let weights = ScoringWeights { interest: 0.4, age: 0.3, distance: 0.3 };
        let factors = FactorScores { interest: 1.0 / 3.0, age: 0.9, distance: 0.0 };

        let score = compatibility_score(&weights, &factors);
        assert!((score - 0.4033).abs() < 1e-3, "got {}", score);
    }

    #[test]
    fn test_compatibility_bounded_by_weight_sum() {
        let weights = ScoringWeights { interest: 0.8, age: 0.6, distance: 0.4 };
        let perfect = FactorScores { interest: 1.0, age: 1.0, distance: 1.0 };
        assert!((compatibility_score(&weights, &perfect) - weights.total()).abs() < 1e-12);
    }

    #[test]
    fn test_calculate_match_worked_example_fields() {
        let mut requester = create_test_profile(1, 30, "M", Some(GeoPoint::new(0.0, 0.0)));
        requester.min_age_pref = Some(25);
        requester.max_age_pref = Some(35);

        let mut candidate = create_test_profile(2, 28, "F", Some(GeoPoint::new(0.0, 0.2)));
        candidate.interests = set(&["hiking", "reading"]);

        let result = calculate_match(&requester, &candidate).unwrap();
        let distance = result.distance_km.unwrap();
        let expected = 0.4 / 3.0 + 0.3 * 0.9 + 0.3 * (1.0 - distance / 50.0);

        assert_eq!(result.user_id, 2);
        assert_eq!(result.common_interests, vec!["hiking"]);
        assert!((result.compatibility_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_match_gates() {
        let mut requester = create_test_profile(1, 30, "M", Some(GeoPoint::new(0.0, 0.0)));
        requester.gender_pref = Some("f".to_string());

        let wrong_gender = create_test_profile(2, 30, "M", Some(GeoPoint::new(0.0, 0.0)));
        assert!(calculate_match(&requester, &wrong_gender).is_none());

        let too_old = create_test_profile(3, 55, "F", Some(GeoPoint::new(0.0, 0.0)));
        assert!(calculate_match(&requester, &too_old).is_none());

        let no_location = create_test_profile(4, 30, "F", None);
        assert!(calculate_match(&requester, &no_location).is_none());

        requester.weights.distance = 0.0;
        let result = calculate_match(&requester, &no_location).unwrap();
        assert_eq!(result.distance_km, Some(0.0));
    }
}
