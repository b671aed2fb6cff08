use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::Digest;

/// How leaf strings on the wire map to bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafEncoding {
    /// The UTF-8 bytes of the string, as-is.
    #[default]
    Utf8,
    /// Standard base64 with padding.
    Base64,
    /// Lowercase or uppercase hex.
    Hex,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("leaf {index}: invalid base64: {source}")]
    Base64 {
        index: usize,
        source: base64::DecodeError,
    },

    #[error("leaf {index}: invalid hex: {source}")]
    Hex {
        index: usize,
        source: hex::FromHexError,
    },
}

impl LeafEncoding {
    /// Decode one leaf string. `index` is only used for error reporting.
    pub fn decode(self, index: usize, leaf: &str) -> Result<Vec<u8>, DecodeError> {
        match self {
            LeafEncoding::Utf8 => Ok(leaf.as_bytes().to_vec()),
            LeafEncoding::Base64 => base64::engine::general_purpose::STANDARD
                .decode(leaf)
                .map_err(|source| DecodeError::Base64 { index, source }),
            LeafEncoding::Hex => {
                hex::decode(leaf).map_err(|source| DecodeError::Hex { index, source })
            }
        }
    }
}

/// Request payload for POST /merkle.
///
/// Either a bare JSON array of UTF-8 strings, or an object naming the encoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MerkleRequest {
    Messages(Vec<String>),
    Encoded {
        leaves: Vec<String>,
        #[serde(default)]
        encoding: LeafEncoding,
    },
}

impl MerkleRequest {
    pub fn len(&self) -> usize {
        match self {
            MerkleRequest::Messages(m) => m.len(),
            MerkleRequest::Encoded { leaves, .. } => leaves.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode every leaf to raw bytes, preserving order.
    pub fn into_leaves(self) -> Result<Vec<Vec<u8>>, DecodeError> {
        match self {
            MerkleRequest::Messages(m) => Ok(m.into_iter().map(String::into_bytes).collect()),
            MerkleRequest::Encoded { leaves, encoding } => leaves
                .iter()
                .enumerate()
                .map(|(i, leaf)| encoding.decode(i, leaf))
                .collect(),
        }
    }
}

/// Response payload for POST /merkle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MerkleResponse {
    /// Hex-encoded 32-byte root.
    pub merkle_root: String,
    pub leaf_count: usize,
}

impl MerkleResponse {
    pub fn new(root: &Digest, leaf_count: usize) -> Self {
        Self {
            merkle_root: hex::encode(root),
            leaf_count,
        }
    }

    /// Parse `merkle_root` back into a digest.
    pub fn root(&self) -> Result<Digest, hex::FromHexError> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(&self.merkle_root, &mut out)?;
        Ok(out)
    }
}
