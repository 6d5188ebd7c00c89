use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, warn};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::items::dtos::{
    CreatedItemDto, ItemDetailDto, ItemSummaryDto, LatestQuery, MarkFoundDto, NewItemForm,
    SearchQuery, TagPageQuery,
};
use crate::features::items::services::{ItemService, ListingService};
use crate::features::tags::TagService;
use crate::modules::storage::{MediaStore, UploadOutcome};
use crate::shared::constants::CLASS_LOST;
use crate::shared::types::{ApiResponse, PageResponse};

/// State for item handlers
#[derive(Clone)]
pub struct ItemState {
    pub items: Arc<ItemService>,
    pub listing: Arc<ListingService>,
    pub tags: Arc<TagService>,
    pub media: Arc<MediaStore>,
}

/// Latest unresolved items, filtered and paginated
#[utoipa::path(
    get,
    path = "/api/lost",
    params(LatestQuery),
    responses(
        (status = 200, description = "Page of items", body = PageResponse<ItemSummaryDto>)
    ),
    tag = "lost"
)]
pub async fn latest_items(
    State(state): State<ItemState>,
    Query(params): Query<LatestQuery>,
) -> Result<Json<PageResponse<ItemSummaryDto>>> {
    let (items, page) = state.listing.list_latest(&params).await?;
    let data: Vec<ItemSummaryDto> = items.into_iter().map(Into::into).collect();
    Ok(Json(PageResponse::new(CLASS_LOST, data, &page)))
}

/// Get one item with its tag names
#[utoipa::path(
    get,
    path = "/api/lost/{id}",
    params(("id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item found", body = ApiResponse<ItemDetailDto>),
        (status = 404, description = "Item not found")
    ),
    tag = "lost"
)]
pub async fn get_item(
    State(state): State<ItemState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ItemDetailDto>>> {
    let item = state.items.get(&id).await?;
    Ok(Json(ApiResponse::success(
        Some(CLASS_LOST),
        Some(item.into()),
        None,
    )))
}

/// Delete an item (owner only)
#[utoipa::path(
    delete,
    path = "/api/lost/{id}",
    params(("id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item deleted"),
        (status = 400, description = "Caller does not own the item"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "lost"
)]
pub async fn delete_item(
    user: AuthenticatedUser,
    State(state): State<ItemState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state.items.delete(&id, &user).await?;
    Ok(Json(ApiResponse::success(
        Some(CLASS_LOST),
        None,
        Some("Item Deleted".to_string()),
    )))
}

/// Create an item from a multipart form, optionally with one photo
///
/// The photo is best-effort: oversized files, unexpected extensions and
/// broken images are skipped and the item is created without one.
#[utoipa::path(
    post,
    path = "/api/lost",
    request_body(
        content = NewItemForm,
        content_type = "multipart/form-data",
        description = "Item fields plus an optional `image` file part",
    ),
    responses(
        (status = 201, description = "Item created", body = ApiResponse<CreatedItemDto>),
        (status = 400, description = "Invalid form data"),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "lost"
)]
pub async fn new_item(
    user: AuthenticatedUser,
    State(state): State<ItemState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<CreatedItemDto>>)> {
    let mut form = NewItemForm::default();
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "image" {
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unnamed".to_string());
            let data = field.bytes().await.map_err(|e| {
                debug!("Failed to read image bytes: {}", e);
                AppError::BadRequest(format!("Failed to read image data: {}", e))
            })?;
            image = Some((filename, data.to_vec()));
            continue;
        }

        let text = field.text().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read field {}: {}", field_name, e))
        })?;
        let value = clean_field(text);

        match field_name.as_str() {
            "title" => form.title = value.unwrap_or_default(),
            "description" => form.description = value,
            "location" => form.location = value,
            "lostDate" => form.lost_date = value,
            "contactEmail" => form.contact_email = value,
            "contactPhone" => form.contact_phone = value.unwrap_or_default(),
            "tagIds" => form.tag_ids = value,
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    form.validate()
        .map_err(|_| AppError::Validation("Invalid Form Data".to_string()))?;
    let lost_date = form
        .parsed_lost_date()
        .map_err(|_| AppError::Validation("Invalid Form Data".to_string()))?;

    // Unknown tag ids are dropped, not errors
    let tag_ids = state.tags.resolve_existing(&form.tag_id_list()).await?;

    // A failed image never blocks a text-only creation
    let image_url = match image {
        Some((filename, data)) => {
            match state.media.store_image(&user.uid, &filename, data).await {
                Ok(UploadOutcome::Stored { url }) => Some(url),
                Ok(UploadOutcome::Skipped) => None,
                Err(e) => {
                    warn!("Image upload failed, creating item without photo: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    let id = state
        .items
        .create(&form, lost_date, image_url, &tag_ids, &user)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(CLASS_LOST),
            Some(CreatedItemDto { item_id: id }),
            None,
        )),
    ))
}

/// Mark an item found (owner only, idempotent)
#[utoipa::path(
    post,
    path = "/api/lost/markFound",
    request_body = MarkFoundDto,
    responses(
        (status = 200, description = "Item marked found"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "No such item owned by the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "lost"
)]
pub async fn mark_found(
    user: AuthenticatedUser,
    State(state): State<ItemState>,
    AppJson(dto): AppJson<MarkFoundDto>,
) -> Result<Json<ApiResponse<()>>> {
    state.items.mark_found(&dto.id, &user).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}

/// All items reported by one user, found or not
#[utoipa::path(
    get,
    path = "/api/lost/user/{user_id}",
    params(("user_id" = String, Path, description = "Owner user id, matched case-insensitively")),
    responses(
        (status = 200, description = "The user's items", body = ApiResponse<Vec<ItemDetailDto>>),
        (status = 404, description = "User has no items")
    ),
    tag = "lost"
)]
pub async fn items_of_user(
    State(state): State<ItemState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ItemDetailDto>>>> {
    let items = state.listing.list_by_user(&user_id).await?;
    if items.is_empty() {
        return Err(AppError::NotFound("Items doesnt exist".to_string()));
    }

    let data: Vec<ItemDetailDto> = items.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(None, Some(data), None)))
}

/// Search items by title or description, resolved or not
#[utoipa::path(
    get,
    path = "/api/lost/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Page of matches", body = PageResponse<ItemDetailDto>),
        (status = 400, description = "Missing search query")
    ),
    tag = "lost"
)]
pub async fn search_items(
    State(state): State<ItemState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<PageResponse<ItemDetailDto>>> {
    let query = params
        .q
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Invalid Search Query".to_string()))?
        .to_string();

    let (items, page) = state.listing.search(&params, &query).await?;
    let data: Vec<ItemDetailDto> = items.into_iter().map(Into::into).collect();
    Ok(Json(PageResponse::new(CLASS_LOST, data, &page)))
}

/// Unresolved items carrying one tag
#[utoipa::path(
    get,
    path = "/api/lost/tag/{tag_id}",
    params(
        ("tag_id" = String, Path, description = "Tag ID"),
        TagPageQuery
    ),
    responses(
        (status = 200, description = "Page of items", body = PageResponse<ItemDetailDto>)
    ),
    tag = "lost"
)]
pub async fn items_by_tag(
    State(state): State<ItemState>,
    Path(tag_id): Path<String>,
    Query(params): Query<TagPageQuery>,
) -> Result<Json<PageResponse<ItemDetailDto>>> {
    let (items, page) = state.listing.list_by_tag(&tag_id, &params).await?;
    let data: Vec<ItemDetailDto> = items.into_iter().map(Into::into).collect();
    Ok(Json(PageResponse::new(CLASS_LOST, data, &page)))
}

/// Trim a multipart text field; whitespace-only collapses to absent.
fn clean_field(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_fields_are_trimmed() {
        assert_eq!(clean_field("  park  ".to_string()), Some("park".to_string()));
        assert_eq!(clean_field("park".to_string()), Some("park".to_string()));
    }

    #[test]
    fn whitespace_only_fields_read_as_absent() {
        assert_eq!(clean_field("   ".to_string()), None);
        assert_eq!(clean_field(String::new()), None);
    }
}
