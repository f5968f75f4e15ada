//! Model snapshot encoding.
//!
//! Layout:
//!
//! ```text
//! ┌──────────┬─────────┬──────────────────────────────────────────┐
//! │ "CMSM"   │ version │ postcard(SnapshotBody)                   │
//! │ 4 bytes  │ 1 byte  │ feature names + fitted forest            │
//! └──────────┴─────────┴──────────────────────────────────────────┘
//! ```
//!
//! The feature names are checked on decode, so a snapshot only loads
//! against the schema it was trained with.

use crate::forest::RandomForest;
use crate::schema::FeatureSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Leading magic bytes of every snapshot.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"CMSM";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u8 = 1;

const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + 1;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("not a model snapshot (bad magic)")]
    BadMagic,

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u8),

    #[error("snapshot features {found:?} do not match schema {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("snapshot encoding failed: {0}")]
    Encode(postcard::Error),

    #[error("snapshot decoding failed: {0}")]
    Decode(postcard::Error),
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    features: Vec<String>,
    forest: &'a RandomForest,
}

#[derive(Deserialize)]
struct SnapshotBody {
    features: Vec<String>,
    forest: RandomForest,
}

/// Serialize `forest` together with the schema's feature names.
pub fn encode_snapshot(schema: &FeatureSchema, forest: &RandomForest) -> Result<Vec<u8>, FormatError> {
    let body = SnapshotRef {
        features: schema.fingerprint(),
        forest,
    };
    let encoded = postcard::to_allocvec(&body).map_err(FormatError::Encode)?;

    let mut out = Vec::with_capacity(HEADER_LEN + encoded.len());
    out.extend_from_slice(&SNAPSHOT_MAGIC);
    out.push(SNAPSHOT_VERSION);
    out.extend_from_slice(&encoded);
    Ok(out)
}

/// Restore a forest, rejecting snapshots built for a different schema.
pub fn decode_snapshot(schema: &FeatureSchema, bytes: &[u8]) -> Result<RandomForest, FormatError> {
    if bytes.len() < HEADER_LEN || bytes[..SNAPSHOT_MAGIC.len()] != SNAPSHOT_MAGIC {
        return Err(FormatError::BadMagic);
    }
    let version = bytes[SNAPSHOT_MAGIC.len()];
    if version != SNAPSHOT_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }

    let body: SnapshotBody = postcard::from_bytes(&bytes[HEADER_LEN..]).map_err(FormatError::Decode)?;

    let expected = schema.fingerprint();
    if body.features != expected {
        return Err(FormatError::SchemaMismatch {
            expected,
            found: body.features,
        });
    }
    Ok(body.forest)
}

// =============================================================================
// TESTS
// =============================================================================
