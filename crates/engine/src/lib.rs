//! SHA-256 Merkle root engine.
//!
//! Leaves are hashed with `H(bytes)`, adjacent nodes with `H(left || right)`,
//! and a lone trailing node at any level is paired with itself.

pub mod crypto;
pub mod error;
pub mod ffi;
pub mod merkle;
pub mod types;

pub use crypto::{Digest, DIGEST_LEN};
pub use error::{MerkleError, Status};
pub use merkle::merkle_root;
