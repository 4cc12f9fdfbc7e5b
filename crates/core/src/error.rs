use thiserror::Error;

/// Broad class of an [`EscrowError`].
///
/// Callers map `Validation` to a client error and `NotFound` to a missing
/// resource. A proof that does not verify is not an error at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    #[error("Duplicate account: {0}")]
    DuplicateAccount(String),

    #[error("Invalid index: {0}")]
    InvalidIndex(i64),

    #[error("Index {index} out of range for {count} records")]
    IndexOutOfRange { index: u64, count: usize },

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid message hash: {0}")]
    InvalidMessageHash(String),

    #[error("Invalid merkle root: {0}")]
    InvalidMerkleRoot(String),

    #[error("Invalid contract address: {0}")]
    InvalidContractAddress(String),

    #[error("Total overflow while summing {0}")]
    TotalOverflow(&'static str),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),
}

impl EscrowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Validation,
        }
    }
}

pub type Result<T> = std::result::Result<T, EscrowError>;
