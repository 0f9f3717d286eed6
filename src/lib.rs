//! # Checkpoint Keeper
//!
//! Bounded checkpoint retention for training loops. A loop offers each new
//! checkpoint to one or both retainers, which decide what stays on disk and
//! call back into the loop to save or delete.
//!
//! ## Modules
//!
//! - [`checkpoint`] — `KBest` and `KLatest` retainers, hooks, snapshots
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod checkpoint;
pub mod config;
pub mod error;

pub use checkpoint::{
    read_manifest, write_manifest, ArtifactHook, BestSnapshot, Capacity, KBest, KLatest,
    LatestSnapshot, Offer, RemovePath, ScoredRecord,
};
pub use error::{HookError, HookKind, RetentionError};
