/// Gender preference value that accepts every candidate
pub const GENDER_WILDCARD: &str = "any";

/// Check a candidate's gender against the requester's preference
///
/// This gate runs before any scoring. An unset preference or the
/// `"any"` wildcard accepts everyone; otherwise codes must match,
/// ignoring case.
#[inline]
pub fn matches_gender_preference(candidate_gender: &str, gender_pref: Option<&str>) -> bool {
    let Some(pref) = gender_pref else {
        return true;
    };

    if pref.to_lowercase() == GENDER_WILDCARD {
        return true;
    }

    candidate_gender.to_lowercase() == pref.to_lowercase()
}
