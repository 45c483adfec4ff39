// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use distance::{distance_between, haversine_distance};
pub use filters::{matches_gender_preference, GENDER_WILDCARD};
pub use matcher::{Matcher, DEFAULT_MATCH_LIMIT, MAX_MATCH_LIMIT};
pub use scoring::{
    calculate_age_score, calculate_distance_score, calculate_interest_similarity, calculate_match,
    compatibility_score, AgeScore, DistanceScore, FactorScores, InterestSimilarity,
};
