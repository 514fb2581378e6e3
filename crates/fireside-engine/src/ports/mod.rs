//! Outbound ports: external collaborators the engine consumes.

pub mod blob;
pub mod clock;
pub mod defaults;

pub use blob::BlobStore;
pub use clock::Clock;
pub use defaults::{DefaultsProvider, GamePreset};
