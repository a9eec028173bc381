/*
 * @Author       : 老董
 * @Date         : 2023-08-30 19:16:48
 * @LastEditors  : 老董
 * @LastEditTime : 2025-03-02 16:40:12
 * @Description  : 本模块提供计算机视觉相关的功能。
 *                 在本模块中，不严谨地说：
 *                 1. 所谓的image/图像是指`[H, W, C]`布局的RGB浮点张量；
 *                 2. 所谓的label/标签图是指`[H, W]`的整型类别图（或`[H, W, 3]`的原始颜色编码图）；
 *                 3. 所有几何变换都以“目标像素反查源像素”的方式实现，图像与标签共用同一套坐标映射。
 */

use crate::tensor::Tensor;
use crate::utils::traits::dynamic_image::TraitForDynamicImage;
use ndarray::Array3;
use std::path::Path;

pub mod geometry;
mod process;


pub struct Vision;

impl Vision {
    /// 将本地的图像加载为`[H, W, 3]`的RGB张量，像素值范围为[0, 255]
    pub fn load_image(path: &Path) -> Result<Tensor, image::ImageError> {
        let image = image::open(path)?;
        Ok(image.to_rgb_tensor())
    }

    /// 将本地的颜色编码标签图加载为`[H, W, 3]`的RGB整型数组
    pub fn load_color_label(path: &Path) -> Result<Array3<u8>, image::ImageError> {
        let image = image::open(path)?;
        Ok(image.to_rgb_array())
    }
}
