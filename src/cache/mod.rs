//! Cache module for storing downloaded images on disk
//!
//! This module provides an image cache that maps each remote URL to a file in a
//! single cache folder. Downloads are de-duplicated per URL, written through a
//! temporary file and an atomic rename, and any failure degrades to returning
//! the original URL so the caller can load the image remotely instead.

mod key;
mod manager;

pub use key::cache_file_name;
pub use manager::{is_local_source, CacheError, CacheStats, ImageCache, LOCAL_SCHEME};
