//! # Fireside Engine
//!
//! The request-facing core. Every operation follows the same shape:
//!
//! 1. the pipeline executor threads one mutable [`domain::RequestContext`]
//!    through an ordered list of stages;
//! 2. access-gate stages resolve the caller's [`domain::Role`] against
//!    the loaded entities and write it into the context;
//! 3. one business stage builds a write set and submits it through the
//!    transactional store in a single atomic call.
//!
//! A denied gate aborts before any mutation; a failed precondition rolls
//! the whole write set back. There is no other mutation path.

pub mod adapters;
pub mod assets;
pub mod config;
pub mod domain;
pub mod operations;
pub mod pipeline;
pub mod ports;
pub mod subscription;
pub mod testkit;

pub use config::{EngineConfig, RejoinPolicy};
pub use operations::SessionService;
