//! # 常用接口模块
//!
//! 本模块提供一些常用的操作接口

pub mod logger;

pub mod traits {
    pub mod dynamic_image;
}
