use thiserror::Error;

/// Errors produced while computing a Merkle root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// The input list had no elements.
    #[error("empty input")]
    EmptyInput,

    /// Memory for a level or the output buffer could not be obtained.
    #[error("allocation failure")]
    AllocationFailure,
}

impl MerkleError {
    /// Status code reported across the C boundary.
    pub fn status(&self) -> Status {
        match self {
            MerkleError::EmptyInput => Status::EmptyInput,
            MerkleError::AllocationFailure => Status::AllocationFailure,
        }
    }
}

/// Return status of the C entry points. New kinds are appended, never renumbered.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok = 0,
    EmptyInput = 1,
    AllocationFailure = 2,
    InvalidArgument = 3,
}

impl Status {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<MerkleError> for Status {
    fn from(e: MerkleError) -> Self {
        e.status()
    }
}

pub type Result<T> = std::result::Result<T, MerkleError>;
