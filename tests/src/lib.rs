//! # Fireside Test Suite
//!
//! Unified test crate: cross-crate choreography and the concurrency
//! properties the core guarantees.
//!
//! ## Structure
//!
//! ```text
//! tests/src/integration/
//! ├── quota.rs      # Exactly-once quota consumption under concurrency
//! ├── game_flow.rs  # Create/join/rename/membership choreography
//! ├── assets.rs     # Upload tickets and the lifecycle state machine
//! ├── dice.rs       # Grading table end to end
//! └── e2e.rs        # The full worked session example
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fireside-tests
//! cargo test -p fireside-tests integration::quota::
//! ```

#![allow(dead_code)]

pub mod integration;

/// Installs a tracing subscriber honoring `RUST_LOG` (once per binary).
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}
