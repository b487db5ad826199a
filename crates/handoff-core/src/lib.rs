//! # handoff-core
//!
//! Domain services for the handoff share-delivery state machine: identity
//! directory, per-token coordination, single-use share channel, recipient
//! inbox, session registry, and access requests. Everything is generic over
//! the `handoff-storage` KV trait, and cipher bundles pass through this crate
//! opaquely; plaintext never enters the server.

#![warn(clippy::all)]

pub mod coordinator;
pub mod errors;
pub mod identity;
pub mod inbox;
pub mod requests;
pub mod sessions;
pub mod shares;
pub mod tokens;
pub mod types;

#[cfg(test)]
mod tests;

pub use coordinator::{TokenCoordinator, TokenStatus};
pub use errors::{Result, ServiceError};
pub use identity::{validate_username, AdminAllowlist, DirectoryService, Registration};
pub use inbox::{Delivered, InboxService, PolledItem};
pub use requests::RequestService;
pub use sessions::SessionRegistry;
pub use shares::{CreatedShare, SharePayload, ShareService};
pub use types::*;
