//! Port adapters: system clock, static reference data, stub blob store.

pub mod fixed_clock;
pub mod static_defaults;
pub mod stub_blob;
pub mod system_clock;

pub use fixed_clock::FixedClock;
pub use static_defaults::StaticDefaults;
pub use stub_blob::StubBlobStore;
pub use system_clock::SystemClock;
