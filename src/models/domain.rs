use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque user identifier
pub type UserId = i64;

/// Default maximum distance preference in kilometers
pub const DEFAULT_MAX_DISTANCE_KM: u32 = 50;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build a point only when both coordinates are present
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self { latitude, longitude }),
            _ => None,
        }
    }
}

/// Per-user factor weights
///
/// Intended to sum to 1.0, which is not enforced: the compatibility score
/// is bounded by the sum of the three weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    pub interest: f64,
    pub age: f64,
    pub distance: f64,
}

impl ScoringWeights {
    /// A zero distance weight means the user is indifferent to location
    #[inline]
    pub fn ignores_distance(&self) -> bool {
        self.distance == 0.0
    }

    pub fn total(&self) -> f64 {
        self.interest + self.age + self.distance
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            interest: 0.4,
            age: 0.3,
            distance: 0.3,
        }
    }
}

/// User profile with demographics, location, interests and match preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub age: u8,
    pub gender: String,
    pub city: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(default)]
    pub min_age_pref: Option<u8>,
    #[serde(default)]
    pub max_age_pref: Option<u8>,
    #[serde(default)]
    pub gender_pref: Option<String>,
    #[serde(default = "default_max_distance")]
    pub max_distance_pref: u32,
    #[serde(default)]
    pub weights: ScoringWeights,
}

fn default_max_distance() -> u32 {
    DEFAULT_MAX_DISTANCE_KM
}

/// A profile as submitted for creation, before the store assigns an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: u8,
    pub gender: String,
    pub city: String,
    pub location: Option<GeoPoint>,
    pub interests: BTreeSet<String>,
    pub min_age_pref: Option<u8>,
    pub max_age_pref: Option<u8>,
    pub gender_pref: Option<String>,
    pub max_distance_pref: u32,
    pub weights: ScoringWeights,
}

impl NewUser {
    pub fn into_profile(self, id: UserId) -> UserProfile {
        UserProfile {
            id,
            name: self.name,
            email: self.email,
            age: self.age,
            gender: self.gender,
            city: self.city,
            location: self.location,
            interests: self.interests,
            min_age_pref: self.min_age_pref,
            max_age_pref: self.max_age_pref,
            gender_pref: self.gender_pref,
            max_distance_pref: self.max_distance_pref,
            weights: self.weights,
        }
    }
}

/// Partial update of a stored profile
///
/// Absent fields leave the stored value untouched. Interests are merged:
/// names not yet on the profile are added, existing ones are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<String>,
    pub city: Option<String>,
    pub location: Option<GeoPoint>,
    pub interests: Option<Vec<String>>,
    pub min_age_pref: Option<u8>,
    pub max_age_pref: Option<u8>,
    pub gender_pref: Option<String>,
    pub max_distance_pref: Option<u32>,
    pub interest_weight: Option<f64>,
    pub age_weight: Option<f64>,
    pub distance_weight: Option<f64>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply every present field onto `profile`
    pub fn apply(&self, profile: &mut UserProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(email) = &self.email {
            profile.email = email.clone();
        }
        if let Some(age) = self.age {
            profile.age = age;
        }
        if let Some(gender) = &self.gender {
            profile.gender = gender.clone();
        }
        if let Some(city) = &self.city {
            profile.city = city.clone();
        }
        if let Some(location) = self.location {
            profile.location = Some(location);
        }
        if let Some(interests) = &self.interests {
            profile.interests.extend(interests.iter().cloned());
        }
        if let Some(min_age) = self.min_age_pref {
            profile.min_age_pref = Some(min_age);
        }
        if let Some(max_age) = self.max_age_pref {
            profile.max_age_pref = Some(max_age);
        }
        if let Some(gender_pref) = &self.gender_pref {
            profile.gender_pref = Some(gender_pref.clone());
        }
        if let Some(max_distance) = self.max_distance_pref {
            profile.max_distance_pref = max_distance;
        }
        if let Some(weight) = self.interest_weight {
            profile.weights.interest = weight;
        }
        if let Some(weight) = self.age_weight {
            profile.weights.age = weight;
        }
        if let Some(weight) = self.distance_weight {
            profile.weights.distance = weight;
        }
    }
}

/// A scored candidate for a requesting user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub user_id: UserId,
    pub name: String,
    pub age: u8,
    pub gender: String,
    pub city: String,
    /// `None` when the distance could not be computed
    pub distance_km: Option<f64>,
    pub common_interests: Vec<String>,
    pub compatibility_score: f64,
}
