use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ConfigError;

/// How many checkpoints a retainer may hold.
///
/// Serialized as a plain integer where `-1` means unbounded, so config files
/// can write `keep_best_n = -1` to keep everything. A bounded capacity too
/// large for an `i64` refuses to serialize rather than being clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "i64")]
pub enum Capacity {
    Bounded(usize),
    Unbounded,
}

impl Capacity {
    /// Integer value standing for [`Capacity::Unbounded`].
    pub const UNBOUNDED_SENTINEL: i64 = -1;

    /// Maximum number of retained checkpoints, `None` when unbounded.
    pub fn limit(self) -> Option<usize> {
        match self {
            Capacity::Bounded(n) => Some(n),
            Capacity::Unbounded => None,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Capacity::Unbounded)
    }

    /// Whether `len` retained entries exhaust this capacity.
    pub fn is_full(self, len: usize) -> bool {
        match self {
            Capacity::Bounded(n) => len >= n,
            Capacity::Unbounded => false,
        }
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Capacity::Bounded(5)
    }
}

impl From<usize> for Capacity {
    fn from(n: usize) -> Self {
        Capacity::Bounded(n)
    }
}

impl TryFrom<i64> for Capacity {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == Self::UNBOUNDED_SENTINEL {
            return Ok(Capacity::Unbounded);
        }
        usize::try_from(value)
            .map(Capacity::Bounded)
            .map_err(|_| ConfigError::InvalidMaxSize(value))
    }
}

impl TryFrom<Capacity> for i64 {
    type Error = ConfigError;

    fn try_from(capacity: Capacity) -> Result<Self, Self::Error> {
        match capacity {
            Capacity::Bounded(n) => {
                i64::try_from(n).map_err(|_| ConfigError::MaxSizeOverflow(n))
            }
            Capacity::Unbounded => Ok(Capacity::UNBOUNDED_SENTINEL),
        }
    }
}

impl Serialize for Capacity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = i64::try_from(*self).map_err(serde::ser::Error::custom)?;
        serializer.serialize_i64(value)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Bounded(n) => write!(f, "{n}"),
            Capacity::Unbounded => write!(f, "unbounded"),
        }
    }
}
