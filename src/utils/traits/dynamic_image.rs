use crate::tensor::Tensor;
use image::DynamicImage;
use ndarray::Array3;

pub trait TraitForDynamicImage {
    /// 转为`[H, W, 3]`的RGB浮点张量（像素值保持在[0, 255]）
    fn to_rgb_tensor(&self) -> Tensor;
    /// 转为`[H, W, 3]`的RGB整型数组，用于原始颜色编码的标签图
    fn to_rgb_array(&self) -> Array3<u8>;
}

impl TraitForDynamicImage for DynamicImage {
    fn to_rgb_tensor(&self) -> Tensor {
        let rgb = self.to_rgb8();
        let (width, height) = rgb.dimensions();
        // `RgbImage`的原始缓冲区本身就是行优先的HWC布局
        let data = rgb.as_raw().iter().map(|&p| p as f32).collect::<Vec<_>>();
        Tensor::new(&data, &[height as usize, width as usize, 3])
    }

    fn to_rgb_array(&self) -> Array3<u8> {
        let rgb = self.to_rgb8();
        let (width, height) = rgb.dimensions();
        Array3::from_shape_fn((height as usize, width as usize, 3), |(y, x, c)| {
            rgb.get_pixel(x as u32, y as u32)[c]
        })
    }
}
