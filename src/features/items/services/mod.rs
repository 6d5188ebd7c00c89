mod item_service;
mod listing_service;

pub use item_service::ItemService;
pub use listing_service::ListingService;
