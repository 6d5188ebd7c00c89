//! Storage module for uploaded item photos
//!
//! Provides the local-filesystem media store that downsizes and persists
//! images and hands back their public URLs.

mod media_store;

pub use media_store::{MediaStore, UploadOutcome};
