mod item;

pub use item::{new_item_id, Item, ItemSummaryRow, ItemWithTagsRow, ITEM_ID_LEN};
