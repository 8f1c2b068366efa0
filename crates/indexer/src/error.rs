use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Chunker error: {0}")]
    ChunkerError(#[from] codechunk_code_chunker::ChunkerError),

    #[error("Chunk store error: {0}")]
    StoreError(#[from] codechunk_store::StoreError),

    #[error("Invalid project path: {0}")]
    InvalidPath(String),
}
