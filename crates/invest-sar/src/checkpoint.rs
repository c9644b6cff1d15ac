//! Investigation checkpointing: `bincode` serialization wrapped with a
//! 20-byte integrity header under magic `"ICHK"` (§4.F).
//!
//! [`Checkpointer`] is the storage seam; [`InMemoryCheckpointer`] is the
//! reference implementation for tests, and [`FileCheckpointer`] lays
//! checkpoints out as `{investigation_id}/{seq}.ckpt` under a base
//! directory for single-process, restart-surviving deployments.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use invest_core::Id;

use crate::error::{Result, SarError};

/// Magic bytes identifying an `invest-sar` checkpoint blob.
pub const CHECKPOINT_MAGIC: [u8; 4] = *b"ICHK";
/// Current on-disk checkpoint format version.
pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;
/// `magic(4) + version(4) + crc32(4) + length(8)`.
pub const CHECKPOINT_HEADER_SIZE: usize = 20;

/// A checkpoint blob failed its integrity check on read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckpointIntegrityError {
    /// The blob is smaller than the header alone.
    #[error("checkpoint blob too small: {size} bytes, minimum {minimum}")]
    FileTooSmall {
        /// The blob's actual size.
        size: usize,
        /// The minimum possible size (the header).
        minimum: usize,
    },
    /// The magic bytes did not match `"ICHK"`.
    #[error("invalid checkpoint magic: expected {expected:?}, found {found:?}")]
    InvalidMagic {
        /// The magic this reader expects.
        expected: [u8; 4],
        /// The magic actually present.
        found: [u8; 4],
    },
    /// The format version is newer than this reader supports.
    #[error("unsupported checkpoint format version {found}, supported up to {supported}")]
    UnsupportedVersion {
        /// The version found in the header.
        found: u32,
        /// The highest version this reader supports.
        supported: u32,
    },
    /// The CRC32 recorded in the header does not match the payload.
    #[error("checkpoint checksum mismatch: expected {expected:x}, computed {computed:x}")]
    ChecksumMismatch {
        /// The checksum recorded in the header.
        expected: u32,
        /// The checksum computed over the payload actually present.
        computed: u32,
    },
    /// The length recorded in the header does not match the payload
    /// actually present.
    #[error("checkpoint length mismatch: header declared {declared}, found {actual}")]
    LengthMismatch {
        /// The length recorded in the header.
        declared: u64,
        /// The length of the payload actually present.
        actual: u64,
    },
}

/// Wraps and unwraps checkpoint payloads with the `"ICHK"` integrity
/// header.
pub struct CheckpointWithIntegrity;

impl CheckpointWithIntegrity {
    /// Prepend the 20-byte integrity header to `data`.
    pub fn wrap(data: &[u8]) -> Vec<u8> {
        let checksum = crc32fast::hash(data);
        let mut out = Vec::with_capacity(CHECKPOINT_HEADER_SIZE + data.len());
        out.extend_from_slice(&CHECKPOINT_MAGIC);
        out.extend_from_slice(&CHECKPOINT_FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&checksum.to_le_bytes());
        out.extend_from_slice(&(data.len() as u64).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    /// Validate the header and return the payload slice, or the specific
    /// integrity failure.
    pub fn unwrap(data: &[u8]) -> std::result::Result<&[u8], CheckpointIntegrityError> {
        if data.len() < CHECKPOINT_HEADER_SIZE {
            return Err(CheckpointIntegrityError::FileTooSmall {
                size: data.len(),
                minimum: CHECKPOINT_HEADER_SIZE,
            });
        }

        let mut found_magic = [0u8; 4];
        found_magic.copy_from_slice(&data[0..4]);
        if found_magic != CHECKPOINT_MAGIC {
            return Err(CheckpointIntegrityError::InvalidMagic {
                expected: CHECKPOINT_MAGIC,
                found: found_magic,
            });
        }

        let version = u32::from_le_bytes(data[4..8].try_into().expect("4 bytes"));
        if version > CHECKPOINT_FORMAT_VERSION {
            return Err(CheckpointIntegrityError::UnsupportedVersion {
                found: version,
                supported: CHECKPOINT_FORMAT_VERSION,
            });
        }

        let expected_checksum = u32::from_le_bytes(data[8..12].try_into().expect("4 bytes"));
        let declared_length = u64::from_le_bytes(data[12..20].try_into().expect("8 bytes"));
        let payload = &data[CHECKPOINT_HEADER_SIZE..];

        if payload.len() as u64 != declared_length {
            return Err(CheckpointIntegrityError::LengthMismatch {
                declared: declared_length,
                actual: payload.len() as u64,
            });
        }

        let computed_checksum = crc32fast::hash(payload);
        if computed_checksum != expected_checksum {
            return Err(CheckpointIntegrityError::ChecksumMismatch {
                expected: expected_checksum,
                computed: computed_checksum,
            });
        }

        Ok(payload)
    }

    /// Whether `data` begins with the `"ICHK"` magic.
    pub fn is_wrapped(data: &[u8]) -> bool {
        data.len() >= 4 && data[0..4] == CHECKPOINT_MAGIC
    }
}

/// Metadata about a stored checkpoint, without the (potentially large)
/// state payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// This checkpoint's own id.
    pub id: Id,
    /// The investigation this checkpoint belongs to.
    pub investigation_id: String,
    /// Monotone sequence number within the investigation.
    pub sequence: u64,
    /// The phase handler that produced this checkpoint.
    pub node: String,
    /// When this checkpoint was written.
    pub timestamp: DateTime<Utc>,
    /// The checkpoint this one was branched from, if any.
    pub parent_id: Option<Id>,
    /// Freeform metadata (e.g. which info types were in flight).
    pub metadata: HashMap<String, String>,
}

/// A checkpoint: metadata plus the serialized investigation state `S`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint<S> {
    /// This checkpoint's metadata.
    pub metadata: CheckpointMetadata,
    /// The investigation state captured at this point.
    pub state: S,
}

/// Storage seam for investigation checkpoints, generic over the
/// checkpointed state type.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Serialize + for<'de> Deserialize<'de> + Send + Sync,
{
    /// Persist a checkpoint.
    async fn save(&self, checkpoint: Checkpoint<S>) -> Result<()>;

    /// Load a specific checkpoint by id.
    async fn load(&self, investigation_id: &str, checkpoint_id: Id) -> Result<Option<Checkpoint<S>>>;

    /// List checkpoint metadata for an investigation, oldest first.
    async fn list(&self, investigation_id: &str) -> Result<Vec<CheckpointMetadata>>;

    /// Delete a specific checkpoint.
    async fn delete(&self, investigation_id: &str, checkpoint_id: Id) -> Result<()>;

    /// Delete every checkpoint for an investigation.
    async fn delete_all(&self, investigation_id: &str) -> Result<()> {
        for metadata in self.list(investigation_id).await? {
            self.delete(investigation_id, metadata.id).await?;
        }
        Ok(())
    }

    /// The most recent checkpoint for an investigation, if any.
    async fn get_latest(&self, investigation_id: &str) -> Result<Option<Checkpoint<S>>> {
        let mut metadatas = self.list(investigation_id).await?;
        metadatas.sort_by_key(|m| m.sequence);
        match metadatas.pop() {
            Some(latest) => self.load(investigation_id, latest.id).await,
            None => Ok(None),
        }
    }
}

/// An in-memory [`Checkpointer`], the reference implementation for tests.
#[derive(Default)]
pub struct InMemoryCheckpointer<S> {
    checkpoints: RwLock<HashMap<String, Vec<Checkpoint<S>>>>,
}

impl<S> InMemoryCheckpointer<S> {
    /// An empty checkpointer.
    pub fn new() -> Self {
        Self {
            checkpoints: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<S> Checkpointer<S> for InMemoryCheckpointer<S>
where
    S: Clone + Serialize + for<'de> Deserialize<'de> + Send + Sync,
{
    async fn save(&self, checkpoint: Checkpoint<S>) -> Result<()> {
        let mut checkpoints = self.checkpoints.write();
        checkpoints
            .entry(checkpoint.metadata.investigation_id.clone())
            .or_default()
            .push(checkpoint);
        Ok(())
    }

    async fn load(&self, investigation_id: &str, checkpoint_id: Id) -> Result<Option<Checkpoint<S>>> {
        let checkpoints = self.checkpoints.read();
        Ok(checkpoints
            .get(investigation_id)
            .and_then(|entries| entries.iter().find(|c| c.metadata.id == checkpoint_id))
            .cloned())
    }

    async fn list(&self, investigation_id: &str) -> Result<Vec<CheckpointMetadata>> {
        let checkpoints = self.checkpoints.read();
        Ok(checkpoints
            .get(investigation_id)
            .map(|entries| entries.iter().map(|c| c.metadata.clone()).collect())
            .unwrap_or_default())
    }

    async fn delete(&self, investigation_id: &str, checkpoint_id: Id) -> Result<()> {
        let mut checkpoints = self.checkpoints.write();
        if let Some(entries) = checkpoints.get_mut(investigation_id) {
            entries.retain(|c| c.metadata.id != checkpoint_id);
        }
        Ok(())
    }
}

/// A [`Checkpointer`] that lays checkpoints out as
/// `{base_dir}/{investigation_id}/{sequence}.ckpt` files, each wrapped
/// with [`CheckpointWithIntegrity`] around a `bincode`-serialized
/// [`Checkpoint`].
pub struct FileCheckpointer {
    base_dir: PathBuf,
}

impl FileCheckpointer {
    /// A file checkpointer rooted at `base_dir`. The directory is created
    /// lazily on first write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    fn investigation_dir(&self, investigation_id: &str) -> PathBuf {
        self.base_dir.join(investigation_id)
    }

    /// The wrapped-`bincode` state blob for this sequence.
    fn state_path(&self, investigation_id: &str, sequence: u64) -> PathBuf {
        self.investigation_dir(investigation_id).join(format!("{sequence}.ckpt"))
    }

    /// The plain-JSON metadata sidecar for this sequence. Kept separate
    /// from the state blob so `list` never needs to know `S` to decode it.
    fn metadata_path(&self, investigation_id: &str, sequence: u64) -> PathBuf {
        self.investigation_dir(investigation_id).join(format!("{sequence}.meta.json"))
    }

    fn io_error(investigation_id: &str, err: impl std::fmt::Display) -> SarError {
        SarError::CheckpointIo {
            investigation_id: investigation_id.to_string(),
            message: err.to_string(),
        }
    }

    fn read_metadata(path: &Path, investigation_id: &str) -> Result<CheckpointMetadata> {
        let raw = std::fs::read(path).map_err(|e| Self::io_error(investigation_id, e))?;
        serde_json::from_slice(&raw).map_err(|e| Self::io_error(investigation_id, e))
    }

    fn read_state<S>(path: &Path, investigation_id: &str) -> Result<S>
    where
        S: for<'de> Deserialize<'de>,
    {
        let raw = std::fs::read(path).map_err(|e| Self::io_error(investigation_id, e))?;
        let payload = CheckpointWithIntegrity::unwrap(&raw)?;
        bincode::deserialize(payload).map_err(|e| Self::io_error(investigation_id, e))
    }
}

#[async_trait]
impl<S> Checkpointer<S> for FileCheckpointer
where
    S: Serialize + for<'de> Deserialize<'de> + Send + Sync,
{
    async fn save(&self, checkpoint: Checkpoint<S>) -> Result<()> {
        let investigation_id = checkpoint.metadata.investigation_id.clone();
        let sequence = checkpoint.metadata.sequence;
        let dir = self.investigation_dir(&investigation_id);
        std::fs::create_dir_all(&dir).map_err(|e| Self::io_error(&investigation_id, e))?;

        let state_payload = bincode::serialize(&checkpoint.state).map_err(|e| Self::io_error(&investigation_id, e))?;
        let wrapped = CheckpointWithIntegrity::wrap(&state_payload);
        std::fs::write(self.state_path(&investigation_id, sequence), wrapped)
            .map_err(|e| Self::io_error(&investigation_id, e))?;

        let metadata_json = serde_json::to_vec(&checkpoint.metadata).map_err(|e| Self::io_error(&investigation_id, e))?;
        std::fs::write(self.metadata_path(&investigation_id, sequence), metadata_json)
            .map_err(|e| Self::io_error(&investigation_id, e))?;
        Ok(())
    }

    async fn load(&self, investigation_id: &str, checkpoint_id: Id) -> Result<Option<Checkpoint<S>>> {
        for metadata in self.list(investigation_id).await? {
            if metadata.id == checkpoint_id {
                let state = Self::read_state(&self.state_path(investigation_id, metadata.sequence), investigation_id)?;
                return Ok(Some(Checkpoint { metadata, state }));
            }
        }
        Ok(None)
    }

    async fn list(&self, investigation_id: &str) -> Result<Vec<CheckpointMetadata>> {
        let dir = self.investigation_dir(investigation_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&dir).map_err(|e| Self::io_error(investigation_id, e))?;
        let mut metadatas = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::io_error(investigation_id, e))?;
            let path = entry.path();
            if path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with(".meta.json")) {
                metadatas.push(Self::read_metadata(&path, investigation_id)?);
            }
        }
        metadatas.sort_by_key(|m| m.sequence);
        Ok(metadatas)
    }

    async fn delete(&self, investigation_id: &str, checkpoint_id: Id) -> Result<()> {
        for metadata in self.list(investigation_id).await? {
            if metadata.id == checkpoint_id {
                let _ = std::fs::remove_file(self.state_path(investigation_id, metadata.sequence));
                let _ = std::fs::remove_file(self.metadata_path(investigation_id, metadata.sequence));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample_metadata(investigation_id: &str, sequence: u64) -> CheckpointMetadata {
        CheckpointMetadata {
            id: Id::new(),
            investigation_id: investigation_id.to_string(),
            sequence,
            node: "records".to_string(),
            timestamp: Utc::now(),
            parent_id: None,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn wrap_then_unwrap_round_trips() {
        let payload = b"hello checkpoint".to_vec();
        let wrapped = CheckpointWithIntegrity::wrap(&payload);
        assert!(CheckpointWithIntegrity::is_wrapped(&wrapped));
        let unwrapped = CheckpointWithIntegrity::unwrap(&wrapped).unwrap();
        assert_eq!(unwrapped, payload.as_slice());
    }

    #[test]
    fn unwrap_rejects_bad_magic() {
        let mut wrapped = CheckpointWithIntegrity::wrap(b"data");
        wrapped[0] = b'X';
        let err = CheckpointWithIntegrity::unwrap(&wrapped).unwrap_err();
        assert!(matches!(err, CheckpointIntegrityError::InvalidMagic { .. }));
    }

    #[test]
    fn unwrap_rejects_corrupted_payload() {
        let mut wrapped = CheckpointWithIntegrity::wrap(b"data");
        let last = wrapped.len() - 1;
        wrapped[last] ^= 0xFF;
        let err = CheckpointWithIntegrity::unwrap(&wrapped).unwrap_err();
        assert!(matches!(err, CheckpointIntegrityError::ChecksumMismatch { .. }));
    }

    #[test]
    fn unwrap_rejects_truncated_blob() {
        let err = CheckpointWithIntegrity::unwrap(b"short").unwrap_err();
        assert!(matches!(err, CheckpointIntegrityError::FileTooSmall { .. }));
    }

    #[tokio::test]
    async fn in_memory_checkpointer_tracks_latest_by_sequence() {
        let checkpointer: InMemoryCheckpointer<u32> = InMemoryCheckpointer::new();
        checkpointer
            .save(Checkpoint { metadata: sample_metadata("inv-1", 1), state: 10 })
            .await
            .unwrap();
        checkpointer
            .save(Checkpoint { metadata: sample_metadata("inv-1", 2), state: 20 })
            .await
            .unwrap();

        let latest = checkpointer.get_latest("inv-1").await.unwrap().unwrap();
        assert_eq!(latest.state, 20);
    }

    #[tokio::test]
    async fn file_checkpointer_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let checkpointer = FileCheckpointer::new(dir.path());
        checkpointer
            .save(Checkpoint { metadata: sample_metadata("inv-7", 1), state: "phase-records".to_string() })
            .await
            .unwrap();

        let latest = checkpointer.get_latest("inv-7").await.unwrap().unwrap();
        assert_eq!(latest.state, "phase-records");
    }

    #[tokio::test]
    async fn file_checkpointer_delete_all_clears_investigation() {
        let dir = tempfile::tempdir().unwrap();
        let checkpointer = FileCheckpointer::new(dir.path());
        checkpointer
            .save(Checkpoint { metadata: sample_metadata("inv-9", 1), state: 1u32 })
            .await
            .unwrap();
        checkpointer.delete_all("inv-9").await.unwrap();
        assert!(checkpointer.list("inv-9").await.unwrap().is_empty());
    }
}
