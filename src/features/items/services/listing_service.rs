use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::items::dtos::{LatestQuery, SearchQuery, TagPageQuery};
use crate::features::items::models::{ItemSummaryRow, ItemWithTagsRow};
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::pagination::{Page, Paginator};

const FULL_COLS: &str = "i.id, i.user_id, i.user_name, i.title, i.description, i.location, \
     i.lost_date, i.contact_email, i.contact_phone, i.image, i.found, i.created";

/// Both filters are optional; NULL binds disable the corresponding predicate.
const LATEST_WHERE: &str = r#"
    WHERE i.found = FALSE
      AND ($1::text IS NULL
           OR i.title ILIKE $1 OR i.description ILIKE $1 OR i.location ILIKE $1)
      AND ($2::text[] IS NULL
           OR EXISTS (SELECT 1 FROM item_tags it
                      WHERE it.item_id = i.id AND it.tag_id = ANY($2)))
"#;

/// Listing Service: filtered, ordered, paginated views over the Item Store.
pub struct ListingService {
    pool: PgPool,
}

impl ListingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Latest unresolved items: optional text query over
    /// title/description/location, optional any-of tag filter, creation-time
    /// ordering, reduced projection.
    pub async fn list_latest(&self, params: &LatestQuery) -> Result<(Vec<ItemSummaryRow>, Page)> {
        let pattern = params
            .q
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(like_pattern);
        let tag_ids: Option<Vec<String>> = params
            .tag
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(split_tag_ids);

        let count_sql = format!("SELECT COUNT(*) FROM items i {}", LATEST_WHERE);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&pattern)
            .bind(&tag_ids)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count latest items: {:?}", e);
                AppError::Database(e)
            })?;

        let page_size = params.pagesize.unwrap_or(DEFAULT_PAGE_SIZE);
        let page = Paginator::new(total, page_size).get_page(params.pagenumber.unwrap_or(1));

        let direction = match params.order.as_deref() {
            Some("ascending") => "ASC",
            _ => "DESC",
        };
        let list_sql = format!(
            r#"
            SELECT i.id, i.title, i.description, i.location, i.lost_date, i.image
            FROM items i
            {}
            ORDER BY i.created {}
            LIMIT $3 OFFSET $4
            "#,
            LATEST_WHERE, direction
        );

        let items = sqlx::query_as::<_, ItemSummaryRow>(&list_sql)
            .bind(&pattern)
            .bind(&tag_ids)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list latest items: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((items, page))
    }

    /// Search over title/description across all items, resolved or not.
    /// A missing query is the caller's error, raised before this is reached.
    pub async fn search(
        &self,
        params: &SearchQuery,
        query: &str,
    ) -> Result<(Vec<ItemWithTagsRow>, Page)> {
        let pattern = like_pattern(query);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM items i WHERE i.title ILIKE $1 OR i.description ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count search results: {:?}", e);
            AppError::Database(e)
        })?;

        let page_size = params.pagesize.unwrap_or(DEFAULT_PAGE_SIZE);
        let page = Paginator::new(total, page_size).get_page(params.pagenumber.unwrap_or(1));

        let sql = format!(
            r#"
            SELECT {FULL_COLS},
                COALESCE(ARRAY_AGG(it.tag_id) FILTER (WHERE it.tag_id IS NOT NULL), '{{}}') AS tag
            FROM items i
            LEFT JOIN item_tags it ON it.item_id = i.id
            WHERE i.title ILIKE $1 OR i.description ILIKE $1
            GROUP BY i.id
            ORDER BY i.created DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let items = sqlx::query_as::<_, ItemWithTagsRow>(&sql)
            .bind(&pattern)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search items: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((items, page))
    }

    /// Unresolved items linked to one tag, newest-first. The aggregated `tag`
    /// column carries the matched tag id, mirroring the join the filter rides on.
    pub async fn list_by_tag(
        &self,
        tag_id: &str,
        params: &TagPageQuery,
    ) -> Result<(Vec<ItemWithTagsRow>, Page)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM items i
            JOIN item_tags it ON it.item_id = i.id
            WHERE i.found = FALSE AND it.tag_id = $1
            "#,
        )
        .bind(tag_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count items for tag {}: {:?}", tag_id, e);
            AppError::Database(e)
        })?;

        let page_size = params.pagesize.unwrap_or(DEFAULT_PAGE_SIZE);
        let page = Paginator::new(total, page_size).get_page(params.pagenumber.unwrap_or(1));

        let sql = format!(
            r#"
            SELECT {FULL_COLS}, ARRAY_AGG(it.tag_id) AS tag
            FROM items i
            JOIN item_tags it ON it.item_id = i.id
            WHERE i.found = FALSE AND it.tag_id = $1
            GROUP BY i.id
            ORDER BY i.created DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let items = sqlx::query_as::<_, ItemWithTagsRow>(&sql)
            .bind(tag_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list items for tag {}: {:?}", tag_id, e);
                AppError::Database(e)
            })?;

        Ok((items, page))
    }

    /// Every item a user owns, found or not, newest-first, unpaginated.
    /// The user id match is case-insensitive.
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<ItemWithTagsRow>> {
        let sql = format!(
            r#"
            SELECT {FULL_COLS},
                COALESCE(ARRAY_AGG(it.tag_id) FILTER (WHERE it.tag_id IS NOT NULL), '{{}}') AS tag
            FROM items i
            LEFT JOIN item_tags it ON it.item_id = i.id
            WHERE LOWER(i.user_id) = LOWER($1)
            GROUP BY i.id
            ORDER BY i.created DESC
            "#
        );

        sqlx::query_as::<_, ItemWithTagsRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list items for user {}: {:?}", user_id, e);
                AppError::Database(e)
            })
    }
}

/// Escape LIKE metacharacters and wrap in `%...%` for substring matching.
fn like_pattern(q: &str) -> String {
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn split_tag_ids(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("bag"), "%bag%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn tag_ids_split_and_skip_blanks() {
        assert_eq!(split_tag_ids("t1;t2"), vec!["t1", "t2"]);
        assert_eq!(split_tag_ids("t1;;t2; "), vec!["t1", "t2"]);
        assert!(split_tag_ids(";").is_empty());
    }
}
