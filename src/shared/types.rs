use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

use crate::shared::pagination::Page;

/// Response envelope used by every endpoint:
/// `{status, class?, data?, error?, message?}` with `status: false` on failures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(class: Option<&str>, data: Option<T>, message: Option<String>) -> Self {
        Self {
            status: true,
            class: class.map(String::from),
            data,
            error: None,
            message,
        }
    }

    pub fn error(error: String) -> ApiResponse<()> {
        ApiResponse {
            status: false,
            class: None,
            data: None,
            error: Some(error),
            message: None,
        }
    }
}

/// Envelope for paginated listings. Same `status`/`class`/`data` head as
/// [`ApiResponse`] plus the page position metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct PageResponse<T> {
    pub status: bool,
    pub class: String,
    pub data: Vec<T>,
    /// Number of items on this page, not the requested page size
    pub page_size: usize,
    pub has_next_page: bool,
    /// The next page number, or literal `false` when this is the last page
    #[schema(value_type = Option<i64>)]
    pub next_page_number: NextPage,
    pub total_pages: i64,
    pub total_items: i64,
}

impl<T> PageResponse<T> {
    pub fn new(class: &str, data: Vec<T>, page: &Page) -> Self {
        Self {
            status: true,
            class: class.to_string(),
            page_size: data.len(),
            data,
            has_next_page: page.has_next(),
            next_page_number: page.next_page_number(),
            total_pages: page.total_pages,
            total_items: page.total_items,
        }
    }
}

/// Next page indicator: a page number mid-list, JSON `false` on the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    Page(i64),
    End,
}

impl Serialize for NextPage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NextPage::Page(n) => serializer.serialize_i64(*n),
            NextPage::End => serializer.serialize_bool(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::pagination::Paginator;

    #[test]
    fn next_page_serializes_as_number_or_false() {
        assert_eq!(
            serde_json::to_string(&NextPage::Page(2)).unwrap(),
            "2".to_string()
        );
        assert_eq!(
            serde_json::to_string(&NextPage::End).unwrap(),
            "false".to_string()
        );
    }

    #[test]
    fn error_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::<()>::error("Item not found".into())).unwrap();
        assert_eq!(json["status"], false);
        assert_eq!(json["error"], "Item not found");
        assert!(json.get("data").is_none());
        assert!(json.get("class").is_none());
    }

    #[test]
    fn page_response_carries_metadata() {
        let page = Paginator::new(3, 1).get_page(1);
        let res = PageResponse::new("lost", vec!["a"], &page);
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["status"], true);
        assert_eq!(json["class"], "lost");
        assert_eq!(json["page_size"], 1);
        assert_eq!(json["has_next_page"], true);
        assert_eq!(json["next_page_number"], 2);
        assert_eq!(json["total_pages"], 3);
        assert_eq!(json["total_items"], 3);
    }

    #[test]
    fn last_page_reports_false_next() {
        let page = Paginator::new(3, 1).get_page(3);
        let res = PageResponse::new("lost", vec!["c"], &page);
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["has_next_page"], false);
        assert_eq!(json["next_page_number"], false);
    }
}
