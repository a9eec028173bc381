//! 训练错误类型定义

use std::path::PathBuf;
use thiserror::Error;

use crate::data::DataError;

/// 训练过程中的错误
#[derive(Debug, Error)]
pub enum TrainError {
    /// 取样失败，训练随之中止
    #[error("取样失败: {0}")]
    Data(#[from] DataError),

    /// 模型前向/反向或优化器内部的错误
    #[error("模型错误: {0}")]
    Model(String),

    /// 保存检查点失败
    #[error("保存检查点 {path} 失败: {message}")]
    Checkpoint { path: PathBuf, message: String },

    /// 训练配置不合法
    #[error("训练配置错误: {0}")]
    Config(String),
}
