use chrono::{DateTime, Utc};
use rand::{distr::Alphanumeric, Rng};
use sqlx::FromRow;

/// Length of the store-assigned item identifier
pub const ITEM_ID_LEN: usize = 10;

/// One lost-item report row.
#[derive(Debug, Clone, FromRow)]
pub struct Item {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub lost_date: Option<DateTime<Utc>>,
    pub contact_email: Option<String>,
    pub contact_phone: String,
    pub image: Option<String>,
    pub found: bool,
    pub created: DateTime<Utc>,
}

/// Reduced projection used by the public latest-listing (no contact info, no owner).
#[derive(Debug, Clone, FromRow)]
pub struct ItemSummaryRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub lost_date: Option<DateTime<Utc>>,
    pub image: Option<String>,
}

/// Full projection with the aggregated tag column (ids or names depending on
/// the query).
#[derive(Debug, Clone, FromRow)]
pub struct ItemWithTagsRow {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub lost_date: Option<DateTime<Utc>>,
    pub contact_email: Option<String>,
    pub contact_phone: String,
    pub image: Option<String>,
    pub found: bool,
    pub created: DateTime<Utc>,
    pub tag: Vec<String>,
}

/// Generate a fresh store-assigned item id. Never client-supplied.
pub fn new_item_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ITEM_ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_short_and_url_safe() {
        let id = new_item_id();
        assert_eq!(id.len(), ITEM_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn ids_are_effectively_unique() {
        let a = new_item_id();
        let b = new_item_id();
        assert_ne!(a, b);
    }
}
