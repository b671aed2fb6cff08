//! C ABI: `merkle_root` / `free_root`, declared in `include/engine.h`.
//!
//! The root is returned in a 32-byte heap buffer owned by the caller, who must
//! release it exactly once with `free_root`. On failure `*out_root` is left
//! untouched and a NUL-terminated message is written into `errbuf`, truncated
//! to `errbuf_len` bytes.

use crate::crypto::{Digest, DIGEST_LEN};
use crate::error::{MerkleError, Status};
use crate::merkle::{leaf_hash, root_from_leaves};
use std::alloc::{alloc, dealloc, Layout};
use std::os::raw::{c_char, c_int, c_uchar};
use std::{ptr, slice};
use tracing::debug;

/// Capacity callers are expected to provide for `errbuf`.
pub const ENGINE_ERRBUF_SIZE: usize = 256;

/// Size of the root buffer handed out by `merkle_root`.
pub const SHA256_SIZE: usize = DIGEST_LEN;

fn root_layout() -> Layout {
    Layout::new::<Digest>()
}

/// Copy `msg` into `errbuf`, never touching more than `errbuf_len` bytes.
///
/// # Safety
/// `errbuf` must be null or valid for writes of `errbuf_len` bytes.
unsafe fn write_error(errbuf: *mut c_char, errbuf_len: c_int, msg: &str) {
    if errbuf.is_null() || errbuf_len <= 0 {
        return;
    }
    let cap = errbuf_len as usize;
    let n = msg.len().min(cap - 1);
    ptr::copy_nonoverlapping(msg.as_ptr(), errbuf as *mut u8, n);
    *errbuf.add(n) = 0;
}

unsafe fn fail(errbuf: *mut c_char, errbuf_len: c_int, status: Status, msg: &str) -> c_int {
    debug!(code = status.code(), "merkle_root failed: {msg}");
    write_error(errbuf, errbuf_len, msg);
    status.code()
}

/// Collect the leaf digests for `n` caller buffers.
///
/// # Safety
/// `inputs` and `lengths` must each point to `n` readable elements.
unsafe fn hash_inputs(
    inputs: *const *const c_char,
    lengths: *const usize,
    n: usize,
) -> Result<Vec<Digest>, (Status, String)> {
    let mut leaves = Vec::new();
    leaves
        .try_reserve_exact(n)
        .map_err(|_| (Status::AllocationFailure, MerkleError::AllocationFailure.to_string()))?;
    for i in 0..n {
        let data = *inputs.add(i);
        let len = *lengths.add(i);
        let bytes: &[u8] = if len == 0 {
            &[]
        } else if data.is_null() {
            return Err((
                Status::InvalidArgument,
                format!("invalid argument: input {i} is null with length {len}"),
            ));
        } else {
            slice::from_raw_parts(data as *const u8, len)
        };
        leaves.push(leaf_hash(bytes));
    }
    Ok(leaves)
}

/// Compute the Merkle root of `n` byte strings.
///
/// Returns `0` on success, otherwise a non-zero [`Status`] code.
///
/// # Safety
/// - `inputs` and `lengths` must point to `n` readable elements when `n > 0`.
/// - `inputs[i]` must be readable for `lengths[i]` bytes (may be null when the
///   length is zero).
/// - `out_root` must be valid for a pointer write.
/// - `errbuf` must be null or writable for `errbuf_len` bytes.
#[no_mangle]
pub unsafe extern "C" fn merkle_root(
    inputs: *const *const c_char,
    lengths: *const usize,
    n: usize,
    out_root: *mut *mut c_uchar,
    errbuf: *mut c_char,
    errbuf_len: c_int,
) -> c_int {
    if n == 0 {
        let e = MerkleError::EmptyInput;
        return fail(errbuf, errbuf_len, e.status(), &e.to_string());
    }
    if inputs.is_null() || lengths.is_null() {
        return fail(
            errbuf,
            errbuf_len,
            Status::InvalidArgument,
            "invalid argument: inputs or lengths is null",
        );
    }
    if out_root.is_null() {
        return fail(
            errbuf,
            errbuf_len,
            Status::InvalidArgument,
            "invalid argument: out_root is null",
        );
    }

    let leaves = match hash_inputs(inputs, lengths, n) {
        Ok(leaves) => leaves,
        Err((status, msg)) => return fail(errbuf, errbuf_len, status, &msg),
    };
    let root = match root_from_leaves(leaves) {
        Ok(root) => root,
        Err(e) => return fail(errbuf, errbuf_len, e.status(), &e.to_string()),
    };

    let buf = alloc(root_layout());
    if buf.is_null() {
        let e = MerkleError::AllocationFailure;
        return fail(errbuf, errbuf_len, e.status(), &e.to_string());
    }
    ptr::copy_nonoverlapping(root.as_ptr(), buf, DIGEST_LEN);
    *out_root = buf;
    Status::Ok.code()
}

/// Release a root returned by [`merkle_root`]. Null is ignored.
///
/// # Safety
/// `root` must be null or a pointer obtained from `merkle_root` that has not
/// been released yet.
#[no_mangle]
pub unsafe extern "C" fn free_root(root: *mut c_uchar) {
    if root.is_null() {
        return;
    }
    dealloc(root, root_layout());
}
