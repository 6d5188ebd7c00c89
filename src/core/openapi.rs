use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::model::AuthenticatedUser;
use crate::features::items::{dtos as items_dtos, handlers::item_handler};
use crate::shared::types::{ApiResponse, PageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        item_handler::latest_items,
        item_handler::new_item,
        item_handler::get_item,
        item_handler::delete_item,
        item_handler::mark_found,
        item_handler::search_items,
        item_handler::items_of_user,
        item_handler::items_by_tag,
    ),
    components(
        schemas(
            AuthenticatedUser,
            items_dtos::NewItemForm,
            items_dtos::MarkFoundDto,
            items_dtos::ItemSummaryDto,
            items_dtos::ItemDetailDto,
            items_dtos::CreatedItemDto,
            ApiResponse<items_dtos::ItemDetailDto>,
            ApiResponse<items_dtos::CreatedItemDto>,
            ApiResponse<Vec<items_dtos::ItemDetailDto>>,
            PageResponse<items_dtos::ItemSummaryDto>,
            PageResponse<items_dtos::ItemDetailDto>,
        )
    ),
    tags(
        (name = "lost", description = "Lost item listings"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Lost & Found API",
        version = "0.1.0",
        description = "API documentation for the lost and found listing service",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
