use thiserror::Error;

use crate::digest::DispatchError;
use crate::utils::AppError;

/// 启动/运行期错误 (HTTP 错误见 [`AppError`])
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("工作目录错误: {0}")]
    WorkDir(#[source] std::io::Error),

    #[error("数据库初始化失败: {0}")]
    Database(#[from] AppError),

    #[error("消息通道初始化失败: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("HTTP 服务错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
