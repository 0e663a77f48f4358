//! In-process implementation of the collaborator traits
//!
//! Backs the tests and the `realtalk` demo binary. Accounts are kept in
//! memory with Argon2id hashes; posts are kept per collection and pushed to
//! live queries as full snapshots on every change.

mod auth;
pub mod password;
mod registry;
mod store;

pub use auth::MemoryAuth;
pub use registry::{SubscriberId, SubscriberRegistry};
pub use store::MemoryPostStore;
