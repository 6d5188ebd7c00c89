use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::items::models::{ItemSummaryRow, ItemWithTagsRow};

/// Form fields for item creation, collected from the multipart request.
///
/// Optional text fields arrive as `None` when absent or empty; `lost_date`
/// stays raw here and is parsed through [`NewItemForm::parsed_lost_date`].
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct NewItemForm {
    #[validate(length(min = 1, max = 50, message = "title must be 1-50 characters"))]
    pub title: String,

    #[validate(length(max = 300, message = "description must be at most 300 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 100, message = "location must be at most 100 characters"))]
    pub location: Option<String>,

    /// Raw timestamp text, e.g. "2022-11-09T07:14:00Z" or "2022-11-09"
    pub lost_date: Option<String>,

    #[validate(email(message = "contactEmail must be a valid email address"))]
    pub contact_email: Option<String>,

    #[validate(length(min = 1, max = 10, message = "contactPhone must be 1-10 characters"))]
    pub contact_phone: String,

    /// Semicolon-separated tag ids
    #[validate(length(max = 300, message = "tagIds must be at most 300 characters"))]
    pub tag_ids: Option<String>,
}

impl NewItemForm {
    /// Split the semicolon-joined tag id field into non-empty ids.
    pub fn tag_id_list(&self) -> Vec<String> {
        self.tag_ids
            .as_deref()
            .unwrap_or("")
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Parse the optional lost date. Accepts RFC 3339, a bare datetime, or a
    /// bare date; anything else is a form error.
    pub fn parsed_lost_date(&self) -> Result<Option<DateTime<Utc>>, String> {
        let raw = match self.lost_date.as_deref() {
            Some(s) if !s.trim().is_empty() => s.trim(),
            _ => return Ok(None),
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(dt.with_timezone(&Utc)));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
            return Ok(Some(naive.and_utc()));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Ok(Some(naive.and_utc()));
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(Some(date.and_time(chrono::NaiveTime::MIN).and_utc()));
        }

        Err(format!("Invalid lostDate: {}", raw))
    }
}

/// JSON body for `POST /api/lost/markFound`
#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkFoundDto {
    pub id: String,
}

/// Lenient page-parameter parse: non-numeric text reads as absent, so the
/// listing falls back to its defaults instead of rejecting the request.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

/// Query parameters for the latest listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct LatestQuery {
    /// Items per page (default 20)
    #[serde(default, deserialize_with = "lenient_i64")]
    pub pagesize: Option<i64>,
    /// 1-indexed page number (default 1)
    #[serde(default, deserialize_with = "lenient_i64")]
    pub pagenumber: Option<i64>,
    /// "ascending" for oldest-first, anything else newest-first
    pub order: Option<String>,
    /// Case-insensitive substring over title/description/location
    pub q: Option<String>,
    /// Semicolon-separated tag ids, any-match
    pub tag: Option<String>,
}

/// Query parameters for search
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub pagesize: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub pagenumber: Option<i64>,
    /// Required search text
    pub q: Option<String>,
}

/// Query parameters for the by-tag listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TagPageQuery {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub pagesize: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub pagenumber: Option<i64>,
}

/// Reduced projection returned by the latest listing: no contact info, no owner.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemSummaryDto {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "lostDate")]
    pub lost_date: Option<DateTime<Utc>>,
    pub image: Option<String>,
}

impl From<ItemSummaryRow> for ItemSummaryDto {
    fn from(r: ItemSummaryRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            location: r.location,
            lost_date: r.lost_date,
            image: r.image,
        }
    }
}

/// Full projection with the aggregated `tag` list (ids or names depending on
/// the endpoint).
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemDetailDto {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub title: String,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
    pub location: Option<String>,
    #[serde(rename = "lostDate")]
    pub lost_date: Option<DateTime<Utc>>,
    #[serde(rename = "contactPhone")]
    pub contact_phone: String,
    #[serde(rename = "contactEmail")]
    pub contact_email: Option<String>,
    pub image: Option<String>,
    pub found: bool,
    pub tag: Vec<String>,
}

impl From<ItemWithTagsRow> for ItemDetailDto {
    fn from(r: ItemWithTagsRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            user_name: r.user_name,
            title: r.title,
            description: r.description,
            created: r.created,
            location: r.location,
            lost_date: r.lost_date,
            contact_phone: r.contact_phone,
            contact_email: r.contact_email,
            image: r.image,
            found: r.found,
            tag: r.tag,
        }
    }
}

/// Response payload for item creation
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedItemDto {
    #[serde(rename = "itemId")]
    pub item_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> NewItemForm {
        NewItemForm {
            title: "Blue backpack".to_string(),
            contact_phone: "0123456789".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn minimal_form_is_valid() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn empty_title_is_rejected() {
        let form = NewItemForm {
            title: String::new(),
            ..valid_form()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn long_title_is_rejected() {
        let form = NewItemForm {
            title: "x".repeat(51),
            ..valid_form()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn missing_phone_is_rejected() {
        let form = NewItemForm {
            contact_phone: String::new(),
            ..valid_form()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn eleven_digit_phone_is_rejected() {
        let form = NewItemForm {
            contact_phone: "01234567890".to_string(),
            ..valid_form()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn bad_email_is_rejected() {
        let form = NewItemForm {
            contact_email: Some("not-an-email".to_string()),
            ..valid_form()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn tag_ids_split_on_semicolons() {
        let form = NewItemForm {
            tag_ids: Some("t1;t2;;t3; ".to_string()),
            ..valid_form()
        };
        assert_eq!(form.tag_id_list(), vec!["t1", "t2", "t3"]);
        assert!(valid_form().tag_id_list().is_empty());
    }

    #[test]
    fn lost_date_formats() {
        let mut form = valid_form();

        form.lost_date = Some("2022-11-09T07:14:00Z".to_string());
        assert!(form.parsed_lost_date().unwrap().is_some());

        form.lost_date = Some("2022-11-09".to_string());
        assert!(form.parsed_lost_date().unwrap().is_some());

        form.lost_date = Some("  ".to_string());
        assert!(form.parsed_lost_date().unwrap().is_none());

        form.lost_date = Some("next tuesday".to_string());
        assert!(form.parsed_lost_date().is_err());
    }

    #[test]
    fn non_numeric_paging_falls_back_to_defaults() {
        use axum::extract::Query;

        let uri: axum::http::Uri = "/api/lost?pagenumber=abc&pagesize=def&order=ascending"
            .parse()
            .unwrap();
        let Query(q) = Query::<LatestQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(q.pagenumber, None);
        assert_eq!(q.pagesize, None);
        assert_eq!(q.order.as_deref(), Some("ascending"));

        let uri: axum::http::Uri = "/api/lost?pagenumber=2&pagesize=5".parse().unwrap();
        let Query(q) = Query::<LatestQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(q.pagenumber, Some(2));
        assert_eq!(q.pagesize, Some(5));

        let uri: axum::http::Uri = "/api/lost/search?q=bag&pagenumber=x".parse().unwrap();
        let Query(q) = Query::<SearchQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(q.pagenumber, None);
        assert_eq!(q.q.as_deref(), Some("bag"));

        let uri: axum::http::Uri = "/api/lost/tag/t1?pagesize=%20".parse().unwrap();
        let Query(q) = Query::<TagPageQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(q.pagesize, None);
    }

    #[test]
    fn detail_dto_uses_original_field_names() {
        use chrono::Utc;
        let row = ItemWithTagsRow {
            id: "abc123defg".to_string(),
            user_id: "u1".to_string(),
            user_name: "Alice".to_string(),
            title: "Blue backpack".to_string(),
            description: None,
            location: None,
            lost_date: None,
            contact_email: Some("a@example.com".to_string()),
            contact_phone: "012345".to_string(),
            image: None,
            found: false,
            created: Utc::now(),
            tag: vec!["t1".to_string()],
        };
        let json = serde_json::to_value(ItemDetailDto::from(row)).unwrap();
        assert!(json.get("contactPhone").is_some());
        assert!(json.get("contactEmail").is_some());
        assert!(json.get("lostDate").is_some());
        assert_eq!(json["tag"][0], "t1");
    }
}
