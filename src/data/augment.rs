/*
 * @Author       : 老董
 * @Date         : 2025-03-04
 * @Description  : 几何增强：由一张标准尺寸的图像及其类别图生成一组确定顺序的增强变体
 *
 * 变体按以下顺序产出（每一族都可单独开关）：
 * 1. 原图（Identity）；
 * 2. 缩放族：按各缩放系数缩放后，缩小的居中补0、放大的随机裁剪回标准尺寸；
 * 3. 旋转族：绕中心按各角度旋转，画布尺寸不变，越界补0。
 * 图像与标签在同一变体下使用同一几何映射；图像用区域平均/双线性插值，
 * 标签一律用最近邻，保证不会出现原本不存在的类别编号。
 */

use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::DataError;
use crate::tensor::Tensor;
use crate::vision::Vision;

/// 缩放后单张图像允许的最大像素数
pub const MAX_SCALED_PIXELS: usize = 1 << 28;

/// 单个增强变体所用的变换
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Transform {
    Identity,
    /// 缩放系数
    Scale(f64),
    /// 旋转角度（度，正值为逆时针）
    Rotation(f64),
}

/// 一个增强变体：图像`[H, W, C]`与类别图`[H, W]`，二者空间尺寸一致
#[derive(Debug, Clone)]
pub struct AugmentedVariant {
    pub transform: Transform,
    pub image: Tensor,
    pub label: Array2<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub enabled: bool,
    pub factors: Vec<f64>,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            factors: vec![0.80, 1.00, 1.20, 1.40, 1.60],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub enabled: bool,
    pub angles: Vec<f64>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            angles: vec![-16., -8., 0., 8., 16.],
        }
    }
}

/// 各增强族的开关与参数
///
/// 默认只开启旋转族（5个角度），即每个样本产出5个变体。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    pub identity: bool,
    pub scale: ScaleConfig,
    pub rotation: RotationConfig,
}

impl AugmentConfig {
    /// 设置是否产出原图变体
    pub fn identity(mut self, enabled: bool) -> Self {
        self.identity = enabled;
        self
    }

    /// 开启缩放族并设置缩放系数
    pub fn scale(mut self, factors: &[f64]) -> Self {
        self.scale = ScaleConfig {
            enabled: true,
            factors: factors.to_vec(),
        };
        self
    }

    /// 关闭缩放族
    pub fn no_scale(mut self) -> Self {
        self.scale.enabled = false;
        self
    }

    /// 开启旋转族并设置角度
    pub fn rotation(mut self, angles: &[f64]) -> Self {
        self.rotation = RotationConfig {
            enabled: true,
            angles: angles.to_vec(),
        };
        self
    }

    /// 关闭旋转族
    pub fn no_rotation(mut self) -> Self {
        self.rotation.enabled = false;
        self
    }

    /// 按产出顺序列出所有变换
    ///
    /// 已产出原图时，缩放系数1.0与原图重复，不再计入。
    pub fn plan(&self) -> Vec<Transform> {
        let mut plan = Vec::new();
        if self.identity {
            plan.push(Transform::Identity);
        }
        if self.scale.enabled {
            plan.extend(
                self.scale
                    .factors
                    .iter()
                    .filter(|&&f| !(self.identity && f == 1.0))
                    .map(|&f| Transform::Scale(f)),
            );
        }
        if self.rotation.enabled {
            plan.extend(self.rotation.angles.iter().map(|&a| Transform::Rotation(a)));
        }
        plan
    }

    /// 每个样本产出的变体个数（即批次大小）
    pub fn variant_count(&self) -> usize {
        self.plan().len()
    }

    /// 检查配置在给定标准尺寸`(height, width)`下是否可用
    pub fn validate(&self, height: usize, width: usize) -> Result<(), DataError> {
        if self.scale.enabled {
            if self.scale.factors.is_empty() {
                return Err(DataError::Config("缩放族已开启，但未给出缩放系数".to_string()));
            }
            for &factor in &self.scale.factors {
                if !(factor.is_finite() && factor > 0.) {
                    return Err(DataError::Config(format!(
                        "缩放系数必须为有限正数，实际为{factor}"
                    )));
                }
                if scaled_len(factor, height) == 0 || scaled_len(factor, width) == 0 {
                    return Err(DataError::Config(format!(
                        "缩放系数{factor}会把{height}x{width}缩成空图"
                    )));
                }
                let scaled_pixels =
                    (factor * height as f64).floor() * (factor * width as f64).floor();
                if scaled_pixels > MAX_SCALED_PIXELS as f64 {
                    return Err(DataError::Config(format!(
                        "缩放系数{factor}会把{height}x{width}放大到{scaled_pixels}个像素，超过上限{MAX_SCALED_PIXELS}"
                    )));
                }
            }
        }
        if self.rotation.enabled {
            if self.rotation.angles.is_empty() {
                return Err(DataError::Config("旋转族已开启，但未给出角度".to_string()));
            }
            if let Some(angle) = self.rotation.angles.iter().find(|a| !a.is_finite()) {
                return Err(DataError::Config(format!("旋转角度必须为有限数，实际为{angle}")));
            }
        }
        if self.variant_count() == 0 {
            return Err(DataError::Config("未启用任何增强变体".to_string()));
        }
        Ok(())
    }
}

/// `floor(factor * len)`，与把浮点尺寸截断为整数的做法一致
pub fn scaled_len(factor: f64, len: usize) -> usize {
    (factor * len as f64).floor() as usize
}

/// 几何增强器：除配置外不持有任何状态，随机性由调用方传入的`rng`提供
#[derive(Debug, Clone)]
pub struct Augmentor {
    config: AugmentConfig,
    height: usize,
    width: usize,
}

impl Augmentor {
    /// # 参数
    /// - `config`: 各增强族的配置
    /// - `image_size`: 标准尺寸`(height, width)`
    pub fn new(config: AugmentConfig, image_size: (usize, usize)) -> Result<Self, DataError> {
        let (height, width) = image_size;
        config.validate(height, width)?;
        Ok(Self {
            config,
            height,
            width,
        })
    }

    pub fn config(&self) -> &AugmentConfig {
        &self.config
    }

    pub fn variant_count(&self) -> usize {
        self.config.variant_count()
    }

    /// 产出全部增强变体
    ///
    /// # 参数
    /// - `image`: 标准尺寸、已归一化的图像`[H, W, C]`
    /// - `label`: 同尺寸的类别图`[H, W]`
    /// - `rng`: 仅放大裁剪时用于选取裁剪位置
    pub fn augment<R: Rng + ?Sized>(
        &self,
        image: &Tensor,
        label: &Array2<u8>,
        rng: &mut R,
    ) -> Result<Vec<AugmentedVariant>, DataError> {
        let (h, w, _) = image.view3()?.dim();
        if (h, w) != (self.height, self.width) {
            return Err(DataError::ShapeMismatch {
                expected: vec![self.height, self.width],
                got: vec![h, w],
            });
        }
        if label.dim() != (h, w) {
            return Err(DataError::ShapeMismatch {
                expected: vec![h, w],
                got: label.shape().to_vec(),
            });
        }

        self.config
            .plan()
            .into_iter()
            .map(|transform| self.apply(transform, image, label, rng))
            .collect()
    }

    /// 对图像与类别图施加同一个变换
    pub fn apply<R: Rng + ?Sized>(
        &self,
        transform: Transform,
        image: &Tensor,
        label: &Array2<u8>,
        rng: &mut R,
    ) -> Result<AugmentedVariant, DataError> {
        let (image, label) = match transform {
            Transform::Identity => (image.clone(), label.clone()),
            Transform::Scale(factor) => self.scale_pair(factor, image, label, rng)?,
            Transform::Rotation(angle) => (
                Vision::rotate_image(image, angle)?,
                Vision::rotate_label(label, angle),
            ),
        };
        Ok(AugmentedVariant {
            transform,
            image,
            label,
        })
    }

    fn scale_pair<R: Rng + ?Sized>(
        &self,
        factor: f64,
        image: &Tensor,
        label: &Array2<u8>,
        rng: &mut R,
    ) -> Result<(Tensor, Array2<u8>), DataError> {
        if factor == 1.0 {
            return Ok((image.clone(), label.clone()));
        }

        let (h, w) = (self.height, self.width);
        let (sh, sw) = (scaled_len(factor, h), scaled_len(factor, w));
        let scaled_image = Vision::resize_area(image, sh, sw)?;
        let scaled_label = Vision::resize_label(label, sh, sw);

        if factor < 1.0 {
            Ok((
                Vision::pad_image(&scaled_image, h, w)?,
                Vision::pad_label(&scaled_label, h, w),
            ))
        } else {
            // 上界取闭区间：`sh - h`正好是窗口不越界的最大偏移
            let top = rng.gen_range(0..=sh - h);
            let left = rng.gen_range(0..=sw - w);
            Ok((
                Vision::crop_image(&scaled_image, top, left, h, w)?,
                Vision::crop_label(&scaled_label, top, left, h, w),
            ))
        }
    }
}
