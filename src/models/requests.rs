use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{GeoPoint, NewUser, ScoringWeights, UserPatch};

/// Request to create a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(range(max = 150))]
    pub age: u8,
    #[validate(length(min = 1, max = 16))]
    pub gender: String,
    #[validate(length(min = 1, max = 200))]
    pub city: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[validate(range(max = 150))]
    pub min_age_pref: Option<u8>,
    #[validate(range(max = 150))]
    pub max_age_pref: Option<u8>,
    #[validate(length(min = 1, max = 16))]
    pub gender_pref: Option<String>,
    pub max_distance_pref: Option<u32>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub interest_weight: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub age_weight: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub distance_weight: Option<f64>,
}

impl CreateUserRequest {
    /// Fill unset preferences from the configured defaults
    pub fn into_new_user(self, default_weights: ScoringWeights, default_max_distance_km: u32) -> NewUser {
        let location = GeoPoint::from_parts(self.latitude, self.longitude);
        NewUser {
            name: self.name,
            email: self.email,
            age: self.age,
            gender: self.gender,
            city: self.city,
            location,
            interests: self.interests.into_iter().collect(),
            min_age_pref: self.min_age_pref,
            max_age_pref: self.max_age_pref,
            gender_pref: self.gender_pref,
            max_distance_pref: self.max_distance_pref.unwrap_or(default_max_distance_km),
            weights: ScoringWeights {
                interest: self.interest_weight.unwrap_or(default_weights.interest),
                age: self.age_weight.unwrap_or(default_weights.age),
                distance: self.distance_weight.unwrap_or(default_weights.distance),
            },
        }
    }

    pub fn has_paired_coordinates(&self) -> bool {
        self.latitude.is_some() == self.longitude.is_some()
    }
}

/// Request to update a user; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(range(max = 150))]
    pub age: Option<u8>,
    #[validate(length(min = 1, max = 16))]
    pub gender: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub city: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub interests: Option<Vec<String>>,
    #[validate(range(max = 150))]
    pub min_age_pref: Option<u8>,
    #[validate(range(max = 150))]
    pub max_age_pref: Option<u8>,
    #[validate(length(min = 1, max = 16))]
    pub gender_pref: Option<String>,
    pub max_distance_pref: Option<u32>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub interest_weight: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub age_weight: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub distance_weight: Option<f64>,
}

impl UpdateUserRequest {
    pub fn has_paired_coordinates(&self) -> bool {
        self.latitude.is_some() == self.longitude.is_some()
    }
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        UserPatch {
            location: GeoPoint::from_parts(req.latitude, req.longitude),
            name: req.name,
            email: req.email,
            age: req.age,
            gender: req.gender,
            city: req.city,
            interests: req.interests,
            min_age_pref: req.min_age_pref,
            max_age_pref: req.max_age_pref,
            gender_pref: req.gender_pref,
            max_distance_pref: req.max_distance_pref,
            interest_weight: req.interest_weight,
            age_weight: req.age_weight,
            distance_weight: req.distance_weight,
        }
    }
}

/// Query parameters for listing users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_list_limit")]
    pub limit: u32,
}

fn default_list_limit() -> u32 {
    10
}

/// Query parameters for finding matches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindMatchesQuery {
    pub limit: Option<usize>,
}
