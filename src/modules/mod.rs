//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for external concerns like media storage.

pub mod storage;
