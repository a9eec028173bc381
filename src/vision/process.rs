use super::Vision;
use super::geometry;
use crate::errors::TensorError;
use crate::tensor::Tensor;
use ndarray::{Array2, Array3, ArrayView2, Axis};

// 图像张量（`[H, W, C]`）上的几何变换
impl Vision {
    /// 区域平均插值缩放图像
    pub fn resize_area(image: &Tensor, height: usize, width: usize) -> Result<Tensor, TensorError> {
        let view = image.view3()?;
        Ok(Tensor::from_array(geometry::resize_area(view, height, width)))
    }

    /// 居中填充0到指定尺寸
    pub fn pad_image(image: &Tensor, height: usize, width: usize) -> Result<Tensor, TensorError> {
        let view = image.view3()?;
        Ok(Tensor::from_array(geometry::pad_to(view, height, width)))
    }

    /// 从`(top, left)`处裁剪出指定尺寸
    pub fn crop_image(
        image: &Tensor,
        top: usize,
        left: usize,
        height: usize,
        width: usize,
    ) -> Result<Tensor, TensorError> {
        let view = image.view3()?;
        Ok(Tensor::from_array(geometry::crop(view, top, left, height, width)))
    }

    /// 绕中心双线性旋转图像（角度单位为度，正值为逆时针）
    pub fn rotate_image(image: &Tensor, angle_deg: f64) -> Result<Tensor, TensorError> {
        let view = image.view3()?;
        Ok(Tensor::from_array(geometry::rotate_bilinear(view, angle_deg)))
    }

    /// 交换通道顺序（RGB <-> BGR），即把通道轴倒序
    pub fn reverse_channels(image: &Tensor) -> Result<Tensor, TensorError> {
        let mut view = image.view3()?;
        view.invert_axis(Axis(2));
        Ok(Tensor::from_array(view.as_standard_layout().into_owned()))
    }
}

// 类别标签图（`[H, W]`）上的几何变换，一律使用最近邻，保证不会产生新的类别值
impl Vision {
    pub fn resize_label(label: &Array2<u8>, height: usize, width: usize) -> Array2<u8> {
        from_single_channel(geometry::resize_nearest(
            as_single_channel(label.view()),
            height,
            width,
        ))
    }

    /// 对原始颜色编码的标签图（`[H, W, 3]`）做最近邻缩放，缩放后再解码
    pub fn resize_color_label(label: &Array3<u8>, height: usize, width: usize) -> Array3<u8> {
        geometry::resize_nearest(label.view(), height, width)
    }

    pub fn pad_label(label: &Array2<u8>, height: usize, width: usize) -> Array2<u8> {
        from_single_channel(geometry::pad_to(as_single_channel(label.view()), height, width))
    }

    pub fn crop_label(
        label: &Array2<u8>,
        top: usize,
        left: usize,
        height: usize,
        width: usize,
    ) -> Array2<u8> {
        from_single_channel(geometry::crop(
            as_single_channel(label.view()),
            top,
            left,
            height,
            width,
        ))
    }

    pub fn rotate_label(label: &Array2<u8>, angle_deg: f64) -> Array2<u8> {
        from_single_channel(geometry::rotate_nearest(
            as_single_channel(label.view()),
            angle_deg,
        ))
    }
}

fn as_single_channel(label: ArrayView2<u8>) -> ndarray::ArrayView3<u8> {
    label.insert_axis(Axis(2))
}

fn from_single_channel(label: Array3<u8>) -> Array2<u8> {
    label.index_axis_move(Axis(2), 0)
}
