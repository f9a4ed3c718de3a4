//! User Profile Service
//!
//! Fetches and updates user profiles from the remote profile API, maps
//! transport failures onto a small domain error taxonomy, and batches
//! reads through a keyed loader.

mod client;
mod errors;
mod loader;
mod service;
mod types;


pub use client::UserProfileClient;
pub use errors::{USER_PROFILE_SYSTEM, UserProfileError};
pub use loader::{Loader, LoaderKey, LoaderWork, MemoLoader};
pub use service::{RequestContext, UserProfileService};
pub use types::{UserProfile, UserProfileConfig, UserProfileLoaderInput, UserProfileUpdateInput};
