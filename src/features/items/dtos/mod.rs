mod item_dto;

pub use item_dto::{
    CreatedItemDto, ItemDetailDto, ItemSummaryDto, LatestQuery, MarkFoundDto, NewItemForm,
    SearchQuery, TagPageQuery,
};
