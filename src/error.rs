use thiserror::Error;

use crate::models::ListError;
use crate::render::RenderError;
use crate::storage::StorageError;

/// 控制器操作错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    List(#[from] ListError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
