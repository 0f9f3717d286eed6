use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::checkpoint::Capacity;
use crate::error::ManifestError;

/// What a single offer did to the retained set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Offer<K> {
    /// The checkpoint was not competitive; no hook ran.
    Rejected,
    /// The checkpoint was saved, possibly after evicting another one.
    Saved { evicted: Option<K> },
}

impl<K> Offer<K> {
    pub fn is_saved(&self) -> bool {
        matches!(self, Offer::Saved { .. })
    }

    pub fn evicted(&self) -> Option<&K> {
        match self {
            Offer::Saved { evicted } => evicted.as_ref(),
            Offer::Rejected => None,
        }
    }
}

/// A retained checkpoint together with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord<K> {
    pub id: K,
    #[serde(with = "score_format")]
    pub score: f64,
}

/// JSON has no infinities, so non-finite scores (a diverged run) are written
/// as the strings `"inf"` and `"-inf"`.
mod score_format {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if *score == f64::INFINITY {
            serializer.serialize_str("inf")
        } else if *score == f64::NEG_INFINITY {
            serializer.serialize_str("-inf")
        } else {
            serializer.serialize_f64(*score)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(score) => Ok(score),
            Repr::Text(text) => match text.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!("invalid score {other:?}"))),
            },
        }
    }
}

/// State of a best-K retainer, best checkpoint first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestSnapshot<K> {
    pub max_size: Capacity,
    pub records: Vec<ScoredRecord<K>>,
}

/// State of a latest-K retainer, oldest checkpoint first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestSnapshot<K> {
    pub max_size: Capacity,
    pub records: Vec<K>,
}

/// Write a snapshot as pretty JSON, going through a temporary file so a
/// crash never leaves a half-written manifest behind.
pub fn write_manifest<T: Serialize>(path: &Path, value: &T) -> Result<(), ManifestError> {
    let json = serde_json::to_string_pretty(value)?;
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    fs::write(tmp_path, json).map_err(|e| ManifestError::Write {
        path: tmp_path.to_path_buf(),
        source: e,
    })?;
    if let Err(e) = fs::rename(tmp_path, path) {
        let _ = fs::remove_file(tmp_path);
        return Err(ManifestError::Write {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

/// Read a snapshot previously written with [`write_manifest`].
pub fn read_manifest<T: DeserializeOwned>(path: &Path) -> Result<T, ManifestError> {
    let json = fs::read_to_string(path).map_err(|e| ManifestError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&json).map_err(|e| ManifestError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}
