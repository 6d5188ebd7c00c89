use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::items::dtos::NewItemForm;
use crate::features::items::models::{new_item_id, Item, ItemWithTagsRow};

/// Item Store: row-level CRUD over lost-item reports.
pub struct ItemService {
    pool: PgPool,
}

impl ItemService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get one item with its aggregated tag names.
    pub async fn get(&self, id: &str) -> Result<ItemWithTagsRow> {
        sqlx::query_as::<_, ItemWithTagsRow>(
            r#"
            SELECT
                i.id, i.user_id, i.user_name, i.title, i.description, i.location,
                i.lost_date, i.contact_email, i.contact_phone, i.image, i.found, i.created,
                COALESCE(ARRAY_AGG(t.name) FILTER (WHERE t.name IS NOT NULL), '{}') AS tag
            FROM items i
            LEFT JOIN item_tags it ON it.item_id = i.id
            LEFT JOIN tags t ON t.id = it.tag_id
            WHERE i.id = $1
            GROUP BY i.id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get item {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
    }

    /// Create an item and attach its tag links in one transaction. Tag ids
    /// that match no existing tag are dropped by the link insert, so a stale
    /// id can never fail the creation.
    pub async fn create(
        &self,
        form: &NewItemForm,
        lost_date: Option<DateTime<Utc>>,
        image_url: Option<String>,
        tag_ids: &[String],
        owner: &AuthenticatedUser,
    ) -> Result<String> {
        let id = new_item_id();

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            r#"
            INSERT INTO items
                (id, user_id, user_name, title, description, location,
                 lost_date, contact_email, contact_phone, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&id)
        .bind(&owner.uid)
        .bind(&owner.name)
        .bind(&form.title)
        .bind(&form.description)
        .bind(&form.location)
        .bind(lost_date)
        .bind(&form.contact_email)
        .bind(&form.contact_phone)
        .bind(&image_url)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert item: {:?}", e);
            AppError::Database(e)
        })?;

        if !tag_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO item_tags (item_id, tag_id)
                SELECT $1, t.id FROM tags t WHERE t.id = ANY($2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(&id)
            .bind(tag_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to link tags for item {}: {:?}", id, e);
                AppError::Database(e)
            })?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Created item {} for user {}", id, owner.uid);
        Ok(id)
    }

    /// Delete an item and its tag links. Only the owner may delete; a
    /// non-owner attempt is a 400 ("Unable to delete"), matching the
    /// long-standing API contract.
    pub async fn delete(&self, id: &str, caller: &AuthenticatedUser) -> Result<()> {
        let item = self.fetch_row(id).await?;

        if !caller.owns(&item) {
            return Err(AppError::BadRequest("Unable to delete".to_string()));
        }

        // item_tags links go with the row via ON DELETE CASCADE
        sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete item {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        tracing::info!("Deleted item {} for user {}", id, caller.uid);
        Ok(())
    }

    /// Flip `found` to true for an item owned by the caller. The lookup is
    /// owner-scoped, so someone else's item id reads as not-found. No
    /// `found = FALSE` predicate: repeated calls succeed.
    pub async fn mark_found(&self, id: &str, caller: &AuthenticatedUser) -> Result<()> {
        let result = sqlx::query("UPDATE items SET found = TRUE WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(&caller.uid)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to mark item {} found: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item not found".to_string()));
        }

        tracing::info!("Item {} marked found by {}", id, caller.uid);
        Ok(())
    }

    async fn fetch_row(&self, id: &str) -> Result<Item> {
        sqlx::query_as::<_, Item>(
            r#"
            SELECT id, user_id, user_name, title, description, location,
                   lost_date, contact_email, contact_phone, image, found, created
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch item {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
    }
}
