use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::path::Path;

use crate::checkpoint::hook::{ArtifactHook, RemovePath};
use crate::checkpoint::metadata::{BestSnapshot, Offer, ScoredRecord};
use crate::checkpoint::Capacity;
use crate::error::{HookError, HookKind, RetentionError};

#[derive(Debug, Clone, Copy)]
struct Entry {
    score: f64,
    // insertion order, used to break ties between equal scores
    seq: u64,
}

/// Keeps the K checkpoints with the lowest score seen so far.
///
/// Every accepted checkpoint is persisted through the save hook. When the
/// retainer is full and a better checkpoint arrives, the worst retained one is
/// removed through the delete hook first. Among equally bad scores the one
/// inserted earliest is evicted.
///
/// Selection is online: a checkpoint that is not competitive when offered is
/// dropped for good, even if later evictions would have made room for it.
pub struct KBest<K> {
    capacity: Capacity,
    records: HashMap<K, Entry>,
    next_seq: u64,
    save_fn: Option<Box<dyn ArtifactHook<K>>>,
    del_fn: Option<Box<dyn ArtifactHook<K>>>,
}

impl<K> KBest<K>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    /// Create a retainer with no hooks installed.
    pub fn new(capacity: impl Into<Capacity>) -> Self {
        KBest {
            capacity: capacity.into(),
            records: HashMap::new(),
            next_seq: 0,
            save_fn: None,
            del_fn: None,
        }
    }

    pub fn with_save_fn<F>(self, f: F) -> Self
    where
        F: FnMut(&K) -> Result<(), HookError> + 'static,
    {
        self.with_save_hook(f)
    }

    pub fn with_del_fn<F>(self, f: F) -> Self
    where
        F: FnMut(&K) -> Result<(), HookError> + 'static,
    {
        self.with_del_hook(f)
    }

    pub fn with_save_hook<H: ArtifactHook<K> + 'static>(mut self, hook: H) -> Self {
        self.save_fn = Some(Box::new(hook));
        self
    }

    pub fn with_del_hook<H: ArtifactHook<K> + 'static>(mut self, hook: H) -> Self {
        self.del_fn = Some(Box::new(hook));
        self
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity.is_full(self.records.len())
    }

    pub fn contains(&self, id: &K) -> bool {
        self.records.contains_key(id)
    }

    pub fn score_of(&self, id: &K) -> Option<f64> {
        self.records.get(id).map(|e| e.score)
    }

    /// Whether a checkpoint with this score would be kept right now.
    pub fn should_accept(&self, score: f64) -> bool {
        if score.is_nan() {
            return false;
        }
        if !self.is_full() {
            return true;
        }
        match self.worst_entry() {
            Some((_, worst)) => score < worst.score,
            // full with nothing retained: capacity is zero
            None => false,
        }
    }

    /// Offer a checkpoint. It is saved if it is among the K best so far,
    /// evicting the current worst when the retainer is full.
    pub fn offer(&mut self, score: f64, id: K) -> Result<Offer<K>, RetentionError> {
        if score.is_nan() {
            return Err(RetentionError::NanScore {
                id: format!("{id:?}"),
            });
        }
        if self.records.contains_key(&id) {
            return Err(RetentionError::DuplicateIdentifier(format!("{id:?}")));
        }
        if !self.should_accept(score) {
            tracing::debug!(?id, score, "checkpoint not among best, skipped");
            return Ok(Offer::Rejected);
        }

        let needs_eviction = self.is_full();
        if self.save_fn.is_none() {
            return Err(RetentionError::MissingHook(HookKind::Save));
        }
        if needs_eviction && self.del_fn.is_none() {
            return Err(RetentionError::MissingHook(HookKind::Delete));
        }

        let worst = if needs_eviction {
            self.worst_entry().map(|(k, _)| k.clone())
        } else {
            None
        };
        if let Some(worst) = &worst {
            self.evict(worst)?;
        }

        if let Some(save_fn) = self.save_fn.as_mut() {
            if let Err(source) = save_fn.call(&id) {
                tracing::warn!(?id, error = %source, "save hook failed");
                return Err(RetentionError::Save {
                    id: format!("{id:?}"),
                    source,
                });
            }
        }
        tracing::debug!(?id, score, retained = self.records.len() + 1, "kept checkpoint");
        self.records.insert(
            id,
            Entry {
                score,
                seq: self.next_seq,
            },
        );
        self.next_seq += 1;

        Ok(Offer::Saved { evicted: worst })
    }

    /// Lowest-scoring retained checkpoint.
    pub fn best(&self) -> Option<(&K, f64)> {
        self.records
            .iter()
            .min_by(|(_, a), (_, b)| rank(a, b))
            .map(|(k, e)| (k, e.score))
    }

    /// The checkpoint that would be evicted next.
    pub fn worst(&self) -> Option<(&K, f64)> {
        self.worst_entry().map(|(k, e)| (k, e.score))
    }

    /// Retained checkpoints, best first. Among equal scores the most recent
    /// comes first, since the oldest of them is the next to go.
    pub fn records(&self) -> Vec<(&K, f64)> {
        let mut entries: Vec<(&K, &Entry)> = self.records.iter().collect();
        entries.sort_by(|(_, a), (_, b)| rank(a, b));
        entries.into_iter().map(|(k, e)| (k, e.score)).collect()
    }

    pub fn snapshot(&self) -> BestSnapshot<K> {
        BestSnapshot {
            max_size: self.capacity,
            records: self
                .records()
                .into_iter()
                .map(|(id, score)| ScoredRecord {
                    id: id.clone(),
                    score,
                })
                .collect(),
        }
    }

    fn worst_entry(&self) -> Option<(&K, &Entry)> {
        self.records.iter().max_by(|(_, a), (_, b)| rank(a, b))
    }

    fn evict(&mut self, worst: &K) -> Result<(), RetentionError> {
        if let Some(del_fn) = self.del_fn.as_mut() {
            if let Err(source) = del_fn.call(worst) {
                tracing::warn!(id = ?worst, error = %source, "delete hook failed, keeping entry");
                return Err(RetentionError::Delete {
                    id: format!("{worst:?}"),
                    source,
                });
            }
        }
        let removed = self.records.remove(worst);
        tracing::info!(
            id = ?worst,
            score = removed.map(|e| e.score),
            "evicted checkpoint"
        );
        Ok(())
    }
}

impl<K> KBest<K>
where
    K: AsRef<Path> + Clone + Eq + Hash + fmt::Debug,
{
    /// Create a retainer over filesystem paths whose delete hook removes the
    /// evicted file or directory.
    pub fn for_paths(capacity: impl Into<Capacity>) -> Self {
        Self::new(capacity).with_del_hook(RemovePath)
    }
}

impl<K: fmt::Debug> fmt::Debug for KBest<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KBest")
            .field("capacity", &self.capacity)
            .field("records", &self.records)
            .field("has_save_fn", &self.save_fn.is_some())
            .field("has_del_fn", &self.del_fn.is_some())
            .finish()
    }
}

/// Orders entries from best to worst: lower score first, then later
/// insertion first.
fn rank(a: &Entry, b: &Entry) -> Ordering {
    a.score
        .partial_cmp(&b.score)
        .unwrap_or(Ordering::Equal)
        .then(b.seq.cmp(&a.seq))
}
