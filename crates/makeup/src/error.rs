use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MakeupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("Unknown color: {0}")]
    UnknownColor(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, MakeupError>;
