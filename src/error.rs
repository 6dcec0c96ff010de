use thiserror::Error;

pub type Result<T> = std::result::Result<T, DialogError>;

#[derive(Error, Debug)]
pub enum DialogError {
    #[error("invalid dialog description: {0}")]
    Json(#[from] json5::Error),

    #[error("{role} node at position {index} has an empty id")]
    EmptyId { role: &'static str, index: usize },

    #[error("duplicate node id: {0}")]
    DuplicateId(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
