use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::items::models::Item;

/// Identity supplied by the request gate. The core trusts these fields
/// and never re-validates credentials itself.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub name: String,
}

impl AuthenticatedUser {
    /// Single ownership predicate used before every mutation.
    pub fn owns(&self, item: &Item) -> bool {
        self.uid == item.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::items::models::Item;
    use chrono::Utc;

    fn item_owned_by(uid: &str) -> Item {
        Item {
            id: "abc123defg".to_string(),
            user_id: uid.to_string(),
            user_name: "Alice".to_string(),
            title: "Blue backpack".to_string(),
            description: None,
            location: None,
            lost_date: None,
            contact_email: None,
            contact_phone: "0123456789".to_string(),
            image: None,
            found: false,
            created: Utc::now(),
        }
    }

    #[test]
    fn owner_matches_exact_uid() {
        let user = AuthenticatedUser {
            uid: "u1".to_string(),
            name: "Alice".to_string(),
        };
        assert!(user.owns(&item_owned_by("u1")));
        assert!(!user.owns(&item_owned_by("u2")));
        // Ownership checks are case-sensitive, unlike the by-user listing
        assert!(!user.owns(&item_owned_by("U1")));
    }
}
