mod best;
mod capacity;
mod hook;
mod latest;
pub mod metadata;

pub use best::KBest;
pub use capacity::Capacity;
pub use hook::{ArtifactHook, RemovePath};
pub use latest::KLatest;
pub use metadata::{
    read_manifest, write_manifest, BestSnapshot, LatestSnapshot, Offer, ScoredRecord,
};
