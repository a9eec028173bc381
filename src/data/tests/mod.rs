mod augment;

use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};

/// 在`path`处写一张`width x height`的RGB图，像素值由`pixel(x, y)`给出
pub(super) fn write_rgb_png(path: &Path, width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 3]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let image = RgbImage::from_fn(width, height, |x, y| Rgb(pixel(x, y)));
    image.save(path).unwrap();
}
