use sha2::{Digest as _, Sha256};

/// Length of a SHA-256 digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// A SHA-256 output.
pub type Digest = [u8; DIGEST_LEN];

/// Hash bytes with SHA-256.
pub fn sha256(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 over the raw concatenation `a || b`.
pub fn sha256_concat(a: &Digest, b: &Digest) -> Digest {
    let mut buf = [0u8; 2 * DIGEST_LEN];
    buf[..DIGEST_LEN].copy_from_slice(a);
    buf[DIGEST_LEN..].copy_from_slice(b);
    sha256(&buf)
}
