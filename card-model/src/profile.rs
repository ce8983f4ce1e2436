use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user context. At most one profile is active at a time; the
/// active profile's `id` scopes which collection bucket is read and
/// written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    /// Already-compressed JPEG bytes, stored as supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_jpeg: Option<Vec<u8>>,
}

impl ProfileRecord {
    pub fn new(email: String, username: String, avatar_jpeg: Option<Vec<u8>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            avatar_jpeg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_round_trips_through_json() {
        let profile = ProfileRecord::new(
            "player@example.com".to_string(),
            "Planeswalker".to_string(),
            Some(vec![0xff, 0xd8, 0xff]),
        );
        let encoded = serde_json::to_string(&profile).unwrap();
        let decoded: ProfileRecord = serde_json::from_str(&encoded).unwrap();
        assert_eq!(profile, decoded);
    }

    #[test]
    fn absent_avatar_is_omitted_from_the_wire() {
        let profile = ProfileRecord::new(
            "player@example.com".to_string(),
            "Planeswalker".to_string(),
            None,
        );
        let encoded = serde_json::to_string(&profile).unwrap();
        assert!(!encoded.contains("avatar_jpeg"));
    }
}
