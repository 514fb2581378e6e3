//! Typed identity capability.
//!
//! The identity provider (external) authenticates the request and hands
//! the core a subject id. The core wraps it once in [`Identity`] and
//! threads that through the pipeline context; nothing downstream re-parses
//! identity payloads.

use serde::{Deserialize, Serialize};

/// The authenticated actor behind one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable subject id from the identity provider.
    pub sub: String,
    /// True for trusted service callers (sweepers, pipeline internals)
    /// that act outside normal membership rules.
    pub service: bool,
}

impl Identity {
    /// An ordinary authenticated user.
    pub fn user(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            service: false,
        }
    }

    /// A trusted service principal (asset sweeper, image pipeline).
    pub fn service(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            service: true,
        }
    }

    pub fn is_service(&self) -> bool {
        self.service
    }
}
