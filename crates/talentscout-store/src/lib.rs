//! # talentscout-store
//!
//! Saves the whole screening [`Session`](talentscout_core::Session) as one
//! JSON snapshot and restores it on the next start.

mod store;

pub use store::{SessionStore, StoreError, SESSION_FILE_NAME};
