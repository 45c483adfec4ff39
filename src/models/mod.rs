// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{GeoPoint, MatchResult, NewUser, ScoringWeights, UserId, UserPatch, UserProfile, DEFAULT_MAX_DISTANCE_KM};
pub use requests::{CreateUserRequest, FindMatchesQuery, ListUsersQuery, UpdateUserRequest};
pub use responses::{DeleteUserResponse, ErrorResponse, FindMatchesResponse, HealthResponse};
