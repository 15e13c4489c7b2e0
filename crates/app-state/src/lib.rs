//! Application state management for Newsdeck
//!
//! This crate holds the client-side browsing state: observable preferences,
//! the story cursor, and the browsing controller that reconciles preference
//! changes with headline fetches.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod browsing;
pub mod cursor;
pub mod preferences;

pub use browsing::{
    follow_preferences, BrowseFailure, BrowsingController, BrowsingPhase, BrowsingSnapshot,
    PreferenceFollower, RequestOutcome,
};
pub use cursor::{StoryCursor, SwipeGesture};
pub use preferences::{PreferenceError, PreferenceStore, Subscription};
