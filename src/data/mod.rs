//! 数据加载模块
//!
//! 提供语义分割数据集的索引、标签解码、归一化、几何增强和批处理功能。
//!
//! # 主要组件
//!
//! - [`SegmentationDataset`]: 按索引取样并展开为增强小批次的数据集
//! - [`DatasetIndexer`]: 枚举图像并配对标签路径，支持可复现的子采样
//! - [`ClassTable`]: 颜色编码标签 -> trainId 的解码表
//! - [`Augmentor`]: 缩放/旋转等几何增强
//! - [`transforms`]: 数据变换函数（归一化、通道顺序、类别权重）
//! - [`SegmentationConfig`]: 数据集配置（JSON）
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use only_seg::data::{SegmentationConfig, SegmentationDataset};
//!
//! let config = SegmentationConfig::from_json_file("visda.json")?.with_seed(42);
//! let dataset = SegmentationDataset::new(config)?;
//!
//! for i in 0..dataset.len() {
//!     let batch = dataset.get_item(i)?;
//!     model.train_step(&batch.images, &batch.labels, dataset.class_weights())?;
//! }
//! ```

pub mod augment;
mod batch;
pub mod class_table;
mod config;
mod dataset;
pub mod error;
pub mod indexer;
pub mod transforms;

#[cfg(test)]
mod tests;

pub use augment::{AugmentConfig, AugmentedVariant, Augmentor, Transform};
pub use batch::{SegmentationBatch, assemble};
pub use class_table::{ClassEntry, ClassTable};
pub use config::SegmentationConfig;
pub use dataset::SegmentationDataset;
pub use error::DataError;
pub use indexer::{DatasetIndexer, PathPairing, SamplePaths, SiblingDirPairing};
pub use transforms::{ChannelOrder, NormalizationStats};
