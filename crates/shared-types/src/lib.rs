//! # Shared Types Crate
//!
//! Single Source of Truth for all cross-crate types in Fireside.
//!
//! ## Design Principles
//!
//! - **One table, one key scheme**: every entity maps to an [`ItemKey`]
//!   through the derivation functions in [`keys`]; no crate invents its
//!   own key strings.
//! - **Tagged records, not duck typing**: rows carry a `kind` discriminator
//!   and deserialize into the [`entities::Record`] sum type.
//! - **Typed identity**: the authenticated subject is carried as an
//!   [`Identity`] capability, produced once and never re-derived.

pub mod attr;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod keys;

pub use attr::{AttrValue, Item};
pub use entities::*;
pub use errors::*;
pub use identity::Identity;
pub use keys::ItemKey;

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

/// Generates a fresh v4 UUID string for entity ids and join tokens.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
