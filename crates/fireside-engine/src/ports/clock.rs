//! Wall-clock port.
//!
//! The request timestamp is taken once per request and threaded through
//! the context, so every row in a write set carries the same
//! `updated_at` and tests can pin time exactly.

use shared_types::Timestamp;

pub trait Clock: Send + Sync {
    /// Milliseconds since UNIX epoch.
    fn now(&self) -> Timestamp;
}
