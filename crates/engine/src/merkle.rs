use crate::crypto::{sha256, sha256_concat, Digest};
use crate::error::{MerkleError, Result};
use tracing::trace;

/// Merkle leaf hash: H(bytes).
pub fn leaf_hash(leaf_bytes: &[u8]) -> Digest {
    sha256(leaf_bytes)
}

/// Hash two nodes: H(left || right).
pub fn hash_node(left: &Digest, right: &Digest) -> Digest {
    sha256_concat(left, right)
}

fn with_capacity(len: usize) -> Result<Vec<Digest>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| MerkleError::AllocationFailure)?;
    Ok(v)
}

/// Build the next level from `level`, pairing left to right.
/// A trailing unpaired node is hashed with itself.
pub fn next_level(level: &[Digest]) -> Result<Vec<Digest>> {
    let mut next = with_capacity(level.len().div_ceil(2))?;
    for pair in level.chunks(2) {
        let left = &pair[0];
        let right = pair.get(1).unwrap_or(left);
        next.push(hash_node(left, right));
    }
    Ok(next)
}

/// Reduce already-hashed leaves down to the root.
/// A single leaf is the root as-is.
pub fn root_from_leaves(mut level: Vec<Digest>) -> Result<Digest> {
    if level.is_empty() {
        return Err(MerkleError::EmptyInput);
    }
    let mut depth = 0usize;
    while level.len() > 1 {
        level = next_level(&level)?;
        depth += 1;
    }
    trace!(depth, "merkle reduction finished");
    Ok(level[0])
}

/// Compute the Merkle root over `inputs` in order.
///
/// - No inputs: `MerkleError::EmptyInput`.
/// - One input `x`: root = H(x).
/// - Odd number at a level: the last node is duplicated.
pub fn merkle_root<I, B>(inputs: I) -> Result<Digest>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let inputs = inputs.into_iter();
    let mut leaves = with_capacity(inputs.size_hint().0)?;
    for input in inputs {
        // size_hint is only a lower bound; grow fallibly past it.
        leaves
            .try_reserve(1)
            .map_err(|_| MerkleError::AllocationFailure)?;
        leaves.push(leaf_hash(input.as_ref()));
    }
    if leaves.is_empty() {
        return Err(MerkleError::EmptyInput);
    }
    root_from_leaves(leaves)
}
