use std::fs;
use std::path::Path;

use crate::error::HookError;

/// A side effect run against a checkpoint identifier.
///
/// Retainers call one hook to persist a newly accepted checkpoint and another
/// to remove an evicted one. Any `FnMut(&K) -> Result<(), HookError>` closure
/// is a hook.
pub trait ArtifactHook<K: ?Sized> {
    fn call(&mut self, id: &K) -> Result<(), HookError>;
}

impl<K: ?Sized, F> ArtifactHook<K> for F
where
    F: FnMut(&K) -> Result<(), HookError>,
{
    fn call(&mut self, id: &K) -> Result<(), HookError> {
        self(id)
    }
}

/// Delete hook that removes the file or directory tree a path points at.
///
/// A missing path is reported as an error rather than ignored, so the
/// retainer never silently loses track of what is on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemovePath;

impl<K: AsRef<Path> + ?Sized> ArtifactHook<K> for RemovePath {
    fn call(&mut self, id: &K) -> Result<(), HookError> {
        let path = id.as_ref();
        if path.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
