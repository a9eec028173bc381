//! 数据加载错误类型定义
//!
//! 按调用方的处理方式大致分三类：
//! - IO 类（文件缺失、图片无法解码）：`FileNotFound`、`IoError`、`ImageError`
//! - 索引类：`IndexOutOfBounds`
//! - 配置类（构造时即失败）：`Config`、`SampleCountExceeded`、`ChannelMismatch`

use std::path::PathBuf;
use thiserror::Error;

use crate::errors::TensorError;

/// 数据加载相关错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 文件未找到
    #[error("文件未找到: {0}")]
    FileNotFound(PathBuf),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 图片读取/解码失败
    #[error("读取图片 {path} 失败: {source}")]
    ImageError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// 配置文件格式错误
    #[error("配置解析失败: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// 配置不合法
    #[error("配置错误: {0}")]
    Config(String),

    /// 子采样数超过可用样本数
    #[error("配置错误: 请求采样 {requested} 个样本，但只找到 {available} 个")]
    SampleCountExceeded { requested: usize, available: usize },

    /// 通道数与归一化统计量（或颜色表）不匹配
    #[error("配置错误: 期望 {expected} 个通道，实际为 {got} 个")]
    ChannelMismatch { expected: usize, got: usize },

    /// 索引越界
    #[error("索引越界: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// 形状不匹配
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// 组装批次时没有任何变体
    #[error("批次为空：没有可堆叠的增强变体")]
    EmptyBatch,

    /// 底层张量错误
    #[error("张量错误: {0}")]
    Tensor(#[from] TensorError),
}

impl DataError {
    /// 是否属于配置类错误（应在构造阶段暴露，而不是推迟到取样时）
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DataError::Config(_)
                | DataError::ConfigParse(_)
                | DataError::SampleCountExceeded { .. }
                | DataError::ChannelMismatch { .. }
        )
    }
}
