//! Lifecycle of placed virtual objects.
//!
//! ## Record lifecycle
//!
//! ```text
//! request_placement ──> Pending ──on_load_complete──> Ready ──attach──> Ready + anchor/pose
//!         │                │                            │
//!         │                └────────── remove / remove_all / anchor lost ──> released
//!         └─ background load on AsyncComputeTaskPool ─> completion channel ─> drain_completions
//! ```
//!
//! The registry is the only owner of records. Loads run on the async compute
//! pool and report back through a channel; the frame systems drain it, so
//! completions are applied in the same serialized order as attach, pose sync
//! and removal. A completion for an object removed in the meantime is dropped.

/// Registry error kinds surfaced to callers.
pub mod error;

/// Content loader contract and the catalog-backed loader.
pub mod loader;

/// Per-object record, handle and loaded content types.
pub mod record;

/// The object registry resource.
pub mod registry;

pub use error::RegistryError;
pub use loader::{CatalogLoader, ContentLoader, LoadCompletion, LoadError, ObjectTemplate};
pub use record::{LoadStatus, ObjectContent, ObjectHandle, VirtualObjectRecord};
pub use registry::{CompletionOutcome, DuplicateCompletionPolicy, ObjectRegistry};
