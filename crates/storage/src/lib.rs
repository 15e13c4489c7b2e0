//! Storage layer for Newsdeck
//!
//! This crate provides the persisted preference document and the key-value
//! backends it is stored in.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod preferences;

pub use kv::{KeyValueBackend, KvConfig, KvError, KvStore, MemoryStore};
pub use preferences::{
    normalize_country, ArticleLength, Preferences, PreferencesUpdate, DEFAULT_COUNTRY,
    PREFERENCES_KEY,
};
