use std::collections::VecDeque;
use std::fmt;
use std::path::Path;

use crate::checkpoint::hook::{ArtifactHook, RemovePath};
use crate::checkpoint::metadata::{LatestSnapshot, Offer};
use crate::checkpoint::Capacity;
use crate::error::{HookError, HookKind, RetentionError};

/// Keeps the K most recently offered checkpoints, oldest evicted first.
pub struct KLatest<K> {
    capacity: Capacity,
    records: VecDeque<K>,
    save_fn: Option<Box<dyn ArtifactHook<K>>>,
    del_fn: Option<Box<dyn ArtifactHook<K>>>,
}

impl<K> KLatest<K>
where
    K: Clone + PartialEq + fmt::Debug,
{
    pub fn new(capacity: impl Into<Capacity>) -> Self {
        let capacity = capacity.into();
        KLatest {
            capacity,
            records: VecDeque::with_capacity(capacity.limit().unwrap_or(0)),
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

    // Linear scan; retained sets are a handful of checkpoints.
    pub fn contains(&self, id: &K) -> bool {
        self.records.contains(id)
    }

    /// Most recently saved checkpoint.
    pub fn latest(&self) -> Option<&K> {
        self.records.back()
    }

    /// The checkpoint that would be evicted next.
    pub fn oldest(&self) -> Option<&K> {
        self.records.front()
    }

    /// Retained checkpoints, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.records.iter()
    }

    /// Offer a checkpoint. It is always saved, after evicting the oldest one
    /// if the retainer is full. A zero-capacity retainer rejects everything.
    pub fn offer(&mut self, id: K) -> Result<Offer<K>, RetentionError> {
        if self.contains(&id) {
            return Err(RetentionError::DuplicateIdentifier(format!("{id:?}")));
        }
        if self.capacity.limit() == Some(0) {
            tracing::debug!(?id, "zero capacity, checkpoint skipped");
            return Ok(Offer::Rejected);
        }

        let needs_eviction = self.is_full();
        if self.save_fn.is_none() {
            return Err(RetentionError::MissingHook(HookKind::Save));
        }
        if needs_eviction && self.del_fn.is_none() {
            return Err(RetentionError::MissingHook(HookKind::Delete));
        }

        let evicted = if needs_eviction {
            self.evict_oldest()?
        } else {
            None
        };

        if let Some(save_fn) = self.save_fn.as_mut() {
            if let Err(source) = save_fn.call(&id) {
                tracing::warn!(?id, error = %source, "save hook failed");
                return Err(RetentionError::Save {
                    id: format!("{id:?}"),
                    source,
                });
            }
        }
        tracing::debug!(?id, retained = self.records.len() + 1, "kept checkpoint");
        self.records.push_back(id);

        Ok(Offer::Saved { evicted })
    }

    pub fn snapshot(&self) -> LatestSnapshot<K> {
        LatestSnapshot {
            max_size: self.capacity,
            records: self.records.iter().cloned().collect(),
        }
    }

    /// Delete the oldest checkpoint, dropping it from tracking only once the
    /// delete hook succeeded.
    fn evict_oldest(&mut self) -> Result<Option<K>, RetentionError> {
        let Some(oldest) = self.records.front() else {
            return Ok(None);
        };
        if let Some(del_fn) = self.del_fn.as_mut() {
            if let Err(source) = del_fn.call(oldest) {
                tracing::warn!(id = ?oldest, error = %source, "delete hook failed, keeping entry");
                return Err(RetentionError::Delete {
                    id: format!("{oldest:?}"),
                    source,
                });
            }
        }
        let oldest = self.records.pop_front();
        tracing::info!(id = ?oldest, "evicted checkpoint");
        Ok(oldest)
    }
}

impl<K> KLatest<K>
where
    K: AsRef<Path> + Clone + PartialEq + fmt::Debug,
{
    /// Create a retainer over filesystem paths whose delete hook removes the
    /// evicted file or directory.
    pub fn for_paths(capacity: impl Into<Capacity>) -> Self {
        Self::new(capacity).with_del_hook(RemovePath)
    }
}

impl<K: fmt::Debug> fmt::Debug for KLatest<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KLatest")
            .field("capacity", &self.capacity)
            .field("records", &self.records)
            .field("has_save_fn", &self.save_fn.is_some())
            .field("has_del_fn", &self.del_fn.is_some())
            .finish()
    }
}
