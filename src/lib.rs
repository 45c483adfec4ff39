//! Kindred - compatibility matching service
//!
//! Stores user profiles (demographics, location, interests and preference
//! weights) and ranks candidates for a user by a weighted, multi-factor
//! compatibility score with hard gates on gender, age and distance.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, distance::haversine_distance};
pub use models::{GeoPoint, MatchResult, ScoringWeights, UserId, UserPatch, UserProfile};
pub use services::{InMemoryStore, PostgresStore, StoreError, UserStore};
