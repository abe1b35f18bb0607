use thiserror::Error;

use crate::input::InputError;
use crate::pipeline::stage5_significance::SignificanceError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Significance(#[from] SignificanceError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
