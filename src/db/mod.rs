use thiserror::Error;

pub mod metadata;
pub mod photos;

#[derive(Error, Debug)]
pub enum Error {
    #[error("filesystem error")]
    Io(#[from] std::io::Error),
    #[error("metadata serialization error")]
    Json(#[from] serde_json::Error),
}
