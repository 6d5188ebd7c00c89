/// Default page size for listings
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Envelope `class` value for item responses
pub const CLASS_LOST: &str = "lost";

// =============================================================================
// UPLOAD LIMITS
// =============================================================================

/// Images at or above this size are silently skipped (10 MiB)
pub const MAX_IMAGE_BYTES: usize = 10_485_760;

/// Neither image dimension may exceed this after downsizing
pub const MAX_IMAGE_DIMENSION: u32 = 1024;

/// Accepted image file extensions, matched case-sensitively
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".png", ".jpeg"];
