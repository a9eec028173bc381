//! # Only Seg
//!
//! `only_seg`项目用纯rust实现语义分割训练所需的数据管线：
//! 颜色编码标签的解码、标准尺寸缩放、均值/标准差归一化、缩放与旋转等几何增强，
//! 以及把同一样本的全部增强变体堆叠成一个训练小批次。
//! 网络与损失函数通过[`train::SegmentationModel`]接入，不在本库内实现。
//!

pub mod data;
pub mod errors;
pub mod tensor;
pub mod train;
pub mod utils;
pub mod vision;
